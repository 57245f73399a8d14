//! OpenAI-compatible implementation of the LLM and embedder capabilities.
//!
//! A reference implementation using the chat completions endpoint with
//! `json_schema` structured outputs and the embeddings endpoint.
//!
//! # Example
//!
//! ```rust,ignore
//! use rag_pipeline::ai::OpenAi;
//!
//! let llm = OpenAi::from_env()?.with_model("gpt-4o").with_temperature(0.3);
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PipelineError, Result};
use crate::traits::embed::Embedder;
use crate::traits::llm::{LlmClient, LlmResponse, StructuredResponse, TokenUsage};

/// OpenAI-compatible client for chat completions and embeddings.
#[derive(Clone)]
pub struct OpenAi {
    client: Client,
    api_key: String,
    model: String,
    embedding_model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAi {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: "gpt-4o".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.1,
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| PipelineError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature (default: 0.1).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// The configured chat model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest) -> Result<(String, TokenUsage)> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| PipelineError::Llm(e.into()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::llm(format!("chat completion error: {error_text}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Llm(e.into()))?;

        let usage = TokenUsage {
            input_tokens: chat.usage.as_ref().map_or(0, |u| u.prompt_tokens),
            output_tokens: chat.usage.as_ref().map_or(0, |u| u.completion_tokens),
            model: chat.model.unwrap_or_else(|| self.model.clone()),
        };

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::llm("no choices in response"))?;

        Ok((content, usage))
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
    model: Option<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

fn messages(system: &str, user: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: system.to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: user.to_string(),
        },
    ]
}

#[async_trait]
impl LlmClient for OpenAi {
    async fn invoke(&self, system: &str, user: &str) -> Result<LlmResponse> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages(system, user),
            temperature: self.temperature,
            response_format: None,
        };

        let (content, usage) = self.chat(&request).await?;
        Ok(LlmResponse { content, usage })
    }

    async fn invoke_structured(
        &self,
        system: &str,
        user: &str,
        schema: Value,
    ) -> Result<StructuredResponse> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: messages(system, user),
            temperature: self.temperature,
            response_format: Some(ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: "structured_response".to_string(),
                    strict: true,
                    schema,
                },
            }),
        };

        let (content, usage) = self.chat(&request).await?;
        let value = serde_json::from_str(&content)?;

        Ok(StructuredResponse { value, usage })
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAi {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text]).await?;
        batch
            .pop()
            .ok_or_else(|| PipelineError::embedding("no embedding in response"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Embedding(e.into()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::embedding(format!("embedding error: {error_text}")));
        }

        let embeddings: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Embedding(e.into()))?;

        Ok(embeddings.data.into_iter().map(|d| d.embedding).collect())
    }
}
