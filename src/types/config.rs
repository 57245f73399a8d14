//! Pipeline configuration.

use serde::{Deserialize, Serialize};

/// Tunable knobs for the pipeline and its agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Results requested per vector search.
    pub default_top_k: usize,

    /// Minimum chunks for the retrieval to count as sufficient.
    pub min_chunks_for_sufficiency: usize,

    /// Cache entry lifetime in seconds.
    pub cache_ttl_seconds: u64,

    /// Multiplier applied to the cost subtotal.
    pub cost_margin: f64,

    /// Whether to run the verification stage.
    pub verifier_enabled: bool,

    pub planner_model: String,
    pub extractor_model: String,
    pub composer_model: String,
    pub verifier_model: String,

    pub embedding_model: String,
    pub embedding_dimensions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_top_k: 10,
            min_chunks_for_sufficiency: 3,
            cache_ttl_seconds: 3600,
            cost_margin: 0.4,
            verifier_enabled: true,
            planner_model: "gpt-4o-mini".to_string(),
            extractor_model: "gpt-4o".to_string(),
            composer_model: "gpt-4o".to_string(),
            verifier_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
        }
    }
}

impl PipelineConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `AGENT_*` / `EMBEDDING_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("AGENT_PLANNER_MODEL") {
            config.planner_model = v;
        }
        if let Ok(v) = std::env::var("AGENT_EXTRACTOR_MODEL") {
            config.extractor_model = v;
        }
        if let Ok(v) = std::env::var("AGENT_COMPOSER_MODEL") {
            config.composer_model = v;
        }
        if let Ok(v) = std::env::var("AGENT_VERIFIER_MODEL") {
            config.verifier_model = v;
        }
        if let Ok(v) = std::env::var("AGENT_VERIFIER_ENABLED") {
            config.verifier_enabled = v.eq_ignore_ascii_case("true") || v == "1";
        }
        if let Ok(v) = std::env::var("AGENT_DEFAULT_TOP_K") {
            if let Ok(k) = v.parse() {
                config.default_top_k = k;
            }
        }
        if let Ok(v) = std::env::var("AGENT_MIN_CHUNKS") {
            if let Ok(n) = v.parse() {
                config.min_chunks_for_sufficiency = n;
            }
        }
        if let Ok(v) = std::env::var("AGENT_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = v.parse() {
                config.cache_ttl_seconds = ttl;
            }
        }
        if let Ok(v) = std::env::var("AGENT_COST_MARGIN") {
            if let Ok(m) = v.parse() {
                config.cost_margin = m;
            }
        }
        if let Ok(v) = std::env::var("EMBEDDING_MODEL") {
            config.embedding_model = v;
        }
        if let Ok(v) = std::env::var("EMBEDDING_DIMENSIONS") {
            if let Ok(d) = v.parse() {
                config.embedding_dimensions = d;
            }
        }

        config
    }

    /// Set the sufficiency threshold.
    pub fn with_min_chunks(mut self, min: usize) -> Self {
        self.min_chunks_for_sufficiency = min;
        self
    }

    /// Set the per-search result count.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.default_top_k = k;
        self
    }

    /// Enable or disable verification.
    pub fn with_verifier(mut self, enabled: bool) -> Self {
        self.verifier_enabled = enabled;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, seconds: u64) -> Self {
        self.cache_ttl_seconds = seconds;
        self
    }

    /// Set the cost margin.
    pub fn with_cost_margin(mut self, margin: f64) -> Self {
        self.cost_margin = margin;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.min_chunks_for_sufficiency, 3);
        assert_eq!(config.cache_ttl_seconds, 3600);
        assert!((config.cost_margin - 0.4).abs() < f64::EPSILON);
        assert!(config.verifier_enabled);
        assert_eq!(config.planner_model, "gpt-4o-mini");
        assert_eq!(config.extractor_model, "gpt-4o");
    }

    #[test]
    fn test_builders() {
        let config = PipelineConfig::new()
            .with_top_k(20)
            .with_min_chunks(5)
            .with_verifier(false);

        assert_eq!(config.default_top_k, 20);
        assert_eq!(config.min_chunks_for_sufficiency, 5);
        assert!(!config.verifier_enabled);
    }
}
