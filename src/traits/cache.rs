//! Result cache capability and key fingerprinting.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::types::query::Query;
use crate::types::result::RagResult;

/// Version tag baked into every cache key. Bump when prompts, schemas,
/// or the component constraint table change so stale entries expire
/// without an explicit purge.
pub const CACHE_KEY_VERSION: &str = "v1";

/// Compute the cache key for a query.
///
/// Equal `(text, filters)` pairs always produce the same key; different
/// filters produce different keys.
pub fn query_key(query: &Query) -> String {
    let mut key_str = query.text.clone();
    if let Some(filters) = &query.filters {
        key_str.push('|');
        // Struct field order is fixed, so this serialization is stable.
        key_str.push_str(&serde_json::to_string(filters).unwrap_or_default());
    }

    let mut hasher = Sha256::new();
    hasher.update(key_str.as_bytes());
    let digest = hasher.finalize();

    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("rag:{}:{}", CACHE_KEY_VERSION, &hex[..16])
}

/// Result cache capability.
///
/// Values are full `RagResult` records; writes are last-write-wins by key.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a cached result.
    async fn get(&self, key: &str) -> Result<Option<RagResult>>;

    /// Store a result with a TTL.
    async fn set(&self, key: &str, value: &RagResult, ttl_seconds: u64) -> Result<()>;

    /// Remove a cached result.
    async fn delete(&self, key: &str) -> Result<()>;

    /// The fingerprint key for a query.
    fn query_key(&self, query: &Query) -> String {
        query_key(query)
    }
}

#[async_trait]
impl<T: Cache + ?Sized> Cache for std::sync::Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<RagResult>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &RagResult, ttl_seconds: u64) -> Result<()> {
        (**self).set(key, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    fn query_key(&self, query: &Query) -> String {
        (**self).query_key(query)
    }
}
