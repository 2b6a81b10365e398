use anyhow::{bail, Context};
use domain::models::{Document, IngestReport, VectorRecord};
use domain::ports::{EmbeddingProvider, IndexSpec, VectorStore};
use domain::profile::{Domain, IndexMode};
use domain::validate;
use infrastructure::csv_source;
use shared::types::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Converts one CSV reference file into vector records in the remote store.
///
/// Prefers a single batched embed-and-upsert; any batch failure drops the
/// run into a strictly sequential per-document fallback where individual
/// failures are counted instead of propagated.
pub struct IngestService {
    store: Arc<dyn VectorStore>,
    embeddings: Arc<dyn EmbeddingProvider>,
    domain: Domain,
    index: IndexSpec,
    mode: IndexMode,
    settle: Duration,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embeddings: Arc<dyn EmbeddingProvider>,
        domain: Domain,
        dimension: usize,
        mode: IndexMode,
        settle: Duration,
    ) -> Self {
        Self {
            store,
            embeddings,
            domain,
            index: IndexSpec {
                name: domain.index_name().to_string(),
                dimension,
            },
            mode,
            settle,
        }
    }

    pub async fn ingest(&self, source: &Path) -> Result<IngestReport> {
        let batch = csv_source::read_rows(source)?;
        let mut report = IngestReport {
            seen: batch.seen(),
            rejected: batch.skipped,
            ..IngestReport::default()
        };

        let mut documents = Vec::new();
        for (line, row) in batch.rows.iter().enumerate() {
            match validate::validate(row, self.domain) {
                Ok(document) => documents.push(document),
                Err(reason) => {
                    debug!(line = line + 1, %reason, "rejected row");
                    report.rejected += 1;
                }
            }
        }
        info!(
            seen = report.seen,
            valid = documents.len(),
            rejected = report.rejected,
            "validated source rows"
        );

        // Nothing worth touching the store for; fail before any index reset.
        if documents.is_empty() {
            bail!("no valid documents to ingest from {}", source.display());
        }

        self.reset_index().await.context("index reset failed")?;

        match self.batch_upsert(&documents).await {
            Ok(()) => report.stored = documents.len(),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "batch upsert failed, falling back to per-document path");
                let (stored, failed) = self.manual_upsert(&documents).await;
                report.stored = stored;
                report.failed = failed;
            }
        }

        // The remote index is eventually consistent; give it a moment before
        // anyone reads back what we just wrote.
        tokio::time::sleep(self.settle).await;
        info!(stored = report.stored, failed = report.failed, "ingestion finished");
        Ok(report)
    }

    async fn reset_index(&self) -> Result<()> {
        let exists = self.store.index_exists(&self.index.name).await?;
        match self.mode {
            IndexMode::Rebuild => {
                if exists {
                    info!(index = %self.index.name, "deleting existing index");
                    self.store.delete_index(&self.index.name).await?;
                }
                info!(index = %self.index.name, dimension = self.index.dimension, "creating index");
                self.store.create_index(&self.index).await
            }
            IndexMode::Append => {
                if exists {
                    return Ok(());
                }
                info!(index = %self.index.name, dimension = self.index.dimension, "creating index");
                self.store.create_index(&self.index).await
            }
        }
    }

    /// Single batched call pair: embed everything, upsert everything.
    async fn batch_upsert(&self, documents: &[Document]) -> Result<()> {
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts).await?;
        anyhow::ensure!(
            vectors.len() == documents.len(),
            "embedding batch returned {} vectors for {} documents",
            vectors.len(),
            documents.len()
        );
        let records: Vec<VectorRecord> = documents
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (document, values))| record_for(document, i, values))
            .collect();
        self.store.upsert(&self.index.name, &records).await
    }

    /// One document at a time; a failure is logged and counted, never fatal
    /// to the rest of the run.
    async fn manual_upsert(&self, documents: &[Document]) -> (usize, usize) {
        let mut stored = 0;
        let mut failed = 0;
        for (i, document) in documents.iter().enumerate() {
            match self.upsert_one(document, i).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    warn!(id = %format!("doc_{}", i + 1), error = %format!("{e:#}"), "document failed");
                    failed += 1;
                }
            }
        }
        (stored, failed)
    }

    async fn upsert_one(&self, document: &Document, i: usize) -> Result<()> {
        let values = self.embeddings.embed(&document.content).await?;
        let record = record_for(document, i, values);
        self.store
            .upsert(&self.index.name, std::slice::from_ref(&record))
            .await
    }
}

/// Build the stored record: sequential 1-based id, and the original text
/// carried in metadata next to the category fields.
fn record_for(document: &Document, i: usize, values: Vec<f32>) -> VectorRecord {
    let mut metadata = document.metadata.clone();
    metadata.insert("text".to_string(), document.content.clone());
    VectorRecord {
        id: format!("doc_{}", i + 1),
        values,
        metadata,
    }
}
