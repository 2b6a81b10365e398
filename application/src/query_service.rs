use anyhow::Context;
use domain::models::{QueryOutcome, RetrievedDocument};
use domain::ports::{EmbeddingProvider, LanguageModel, VectorStore};
use domain::profile::Domain;
use shared::types::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// Number of nearest documents fetched per similarity search.
pub const TOP_K: usize = 5;

/// Context substituted when retrieval comes back empty.
const EMPTY_CONTEXT: &str = "No specific data available";

/// The query pipeline: classify, retrieve, generate — linear, no retries.
///
/// Classification and retrieval derive their categories independently; the
/// retrieval filter comes from a keyword heuristic on the query text, never
/// from the classifier's output.
pub struct QueryService {
    llm: Arc<dyn LanguageModel>,
    embeddings: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    domain: Domain,
    context_char_limit: usize,
}

impl QueryService {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        embeddings: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        domain: Domain,
        context_char_limit: usize,
    ) -> Self {
        Self {
            llm,
            embeddings,
            store,
            domain,
            context_char_limit,
        }
    }

    pub async fn answer(&self, query: &str) -> Result<QueryOutcome> {
        let raw_label = self.classify(query).await.context("classification stage failed")?;
        let category = self.domain.parse_label(&raw_label);
        info!(%raw_label, %category, "classified query");

        let documents = self.retrieve(query).await.context("retrieval stage failed")?;
        info!(retrieved = documents.len(), "retrieved context documents");

        let answer = self
            .generate(query, &documents)
            .await
            .context("generation stage failed")?;

        Ok(QueryOutcome {
            raw_label,
            category,
            documents,
            answer,
        })
    }

    /// One prompted call; the model's raw text comes back unmodified.
    pub async fn classify(&self, query: &str) -> Result<String> {
        self.llm
            .complete(&self.domain.classification_prompt(query))
            .await
    }

    /// Filtered top-5 search with one unfiltered fallback level.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedDocument>> {
        let vector = self.embeddings.embed(query).await?;
        let filter_value = self.domain.infer_filter(query);
        debug!(filter = %filter_value, "derived retrieval filter");

        let index = self.domain.index_name();
        let filter = Some((self.domain.category_key(), filter_value.as_str()));
        let results = self.store.query(index, &vector, TOP_K, filter).await?;
        if !results.is_empty() {
            return Ok(results);
        }
        debug!("filtered search empty, retrying unfiltered");
        self.store.query(index, &vector, TOP_K, None).await
    }

    /// Ground the answer in the retrieved passages and ask the model once.
    pub async fn generate(&self, query: &str, documents: &[RetrievedDocument]) -> Result<String> {
        let mut context = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if context.is_empty() {
            context = EMPTY_CONTEXT.to_string();
        }
        if let Some((idx, _)) = context.char_indices().nth(self.context_char_limit) {
            debug!(limit = self.context_char_limit, "truncating grounding context");
            context.truncate(idx);
        }

        let prompt = format!("Respond to: {query} using context: {context}");
        self.llm.complete(&prompt).await
    }
}
