//! Reference LLM and embedder adapters (feature = "openai").

mod factory;
mod openai;

pub use factory::build_pipeline;
pub use openai::OpenAi;
