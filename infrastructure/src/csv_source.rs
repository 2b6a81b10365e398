use anyhow::Context;
use domain::validate::RawRow;
use shared::types::Result;
use std::path::Path;
use tracing::warn;

/// Raw rows read from one CSV source, plus the count of lines the parser
/// had to skip.
pub struct RowBatch {
    pub rows: Vec<RawRow>,
    pub skipped: usize,
}

impl RowBatch {
    /// Every data line the parser saw, parsable or not.
    pub fn seen(&self) -> usize {
        self.rows.len() + self.skipped
    }
}

/// Read a comma-delimited, UTF-8 reference file with a header row.
///
/// Individual malformed lines are skipped and counted; only a missing or
/// unreadable file fails the call.
pub fn read_rows(path: &Path) -> Result<RowBatch> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open source file {}", path.display()))?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (line, record) in reader.deserialize::<RawRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(line = line + 1, error = %e, "skipping malformed row");
                skipped += 1;
            }
        }
    }
    Ok(RowBatch { rows, skipped })
}
