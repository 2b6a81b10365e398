use crate::models::{RetrievedDocument, VectorRecord};
use async_trait::async_trait;
use shared::types::Result;

/// Name and dimensionality of a vector index. The similarity metric is
/// always cosine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
}

/// A prompted text-completion model. One request, one raw text response.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// An embedding service producing fixed-length vectors for text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed many texts in one request, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// A remote vector database: index lifecycle plus upsert and filtered
/// similarity search.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn index_exists(&self, name: &str) -> Result<bool>;

    async fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    /// Delete the named index. Deleting an index that does not exist is not
    /// an error.
    async fn delete_index(&self, name: &str) -> Result<()>;

    async fn upsert(&self, index: &str, records: &[VectorRecord]) -> Result<()>;

    /// Top-`top_k` similarity search, optionally restricted to records whose
    /// metadata `key` equals `value`. Results come back in the store's
    /// ranking order.
    async fn query(
        &self,
        index: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<RetrievedDocument>>;
}
