//! The query pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Intent classification (planner)
//! - Strategy-driven retrieval with sufficiency gating
//! - Parallel grounded extraction per component type
//! - Validated component composition
//! - Optional claim verification
//! - Cost accounting and result caching

pub mod components;
pub mod composer;
pub mod constraints;
pub mod execute;
pub mod extractor;
pub mod planner;
pub mod prompts;
pub mod retriever;
pub mod schemas;
pub mod verifier;

pub use components::{normalize_type, parse_component};
pub use composer::{ComposeOutput, ResponseComposer};
pub use constraints::{validate_component, ConstraintViolation, ValidationResult};
pub use execute::{ExecuteQueryResult, QueryPipeline};
pub use extractor::DataExtractor;
pub use planner::QueryPlanner;
pub use retriever::IntentRetriever;
pub use schemas::{extraction_schema, planner_schema};
pub use verifier::ResponseVerifier;
