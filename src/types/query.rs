//! Query input types.

use serde::{Deserialize, Serialize};

use super::chunk::DocumentType;

/// Optional filters constraining retrieval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    /// Restrict to these document types.
    pub document_types: Option<Vec<DocumentType>>,

    /// Earliest document date, inclusive (`YYYY-MM-DD`).
    pub date_from: Option<String>,

    /// Latest document date, inclusive (`YYYY-MM-DD`).
    pub date_to: Option<String>,

    /// Restrict to these source names.
    pub sources: Option<Vec<String>>,

    /// Restrict to these member ids.
    pub member_ids: Option<Vec<String>>,
}

/// A user query. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// Free-text question.
    pub text: String,

    /// Optional session identifier for request correlation.
    pub session_id: Option<String>,

    /// Optional retrieval filters.
    pub filters: Option<QueryFilters>,
}

impl Query {
    /// Create a query with no session or filters.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            session_id: None,
            filters: None,
        }
    }

    /// Attach a session id.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Attach filters.
    pub fn with_filters(mut self, filters: QueryFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}
