use crate::profile::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat string-to-string metadata attached to documents and vector records.
pub type Metadata = BTreeMap<String, String>;

/// A validated unit of reference content, ready for embedding.
///
/// Only the row validator constructs these, so content is never empty and
/// the domain's category key is always present in the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Metadata,
}

/// The stored form of a [`Document`]: sequential id, embedding, and the
/// sanitized metadata including the original text under `"text"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Metadata,
}

/// One similarity-search hit, in the store's ranking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub content: String,
    pub metadata: Metadata,
    pub score: f32,
}

/// Final counts reported by an ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Raw data rows read from the source, including unparsable ones.
    pub seen: usize,
    /// Rows dropped by parsing or validation.
    pub rejected: usize,
    /// Records successfully embedded and upserted.
    pub stored: usize,
    /// Per-document failures in the manual fallback path.
    pub failed: usize,
}

/// Terminal state of a query pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The classifier model's unmodified text output.
    pub raw_label: String,
    /// Strict parse of `raw_label` against the domain's label set.
    pub category: Category,
    pub documents: Vec<RetrievedDocument>,
    pub answer: String,
}
