//! Embedding capability.

use async_trait::async_trait;

use crate::error::Result;

/// Text embedding capability.
///
/// Vectors must have a fixed dimension matching the vector store.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed multiple texts.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // Default implementation calls embed_single sequentially
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_single(text).await?);
        }
        Ok(results)
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for std::sync::Arc<T> {
    async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_single(text).await
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts).await
    }
}
