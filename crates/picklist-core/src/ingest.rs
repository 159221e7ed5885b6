use std::collections::BTreeSet;

use thiserror::Error;

use crate::record::PickingTask;
use crate::title_store::TitleStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to fetch titles: {0}")]
    Fetch(String),
    #[error("title export contains duplicate barcode '{barcode}'")]
    DuplicateBarcode { barcode: String },
}

/// Fetches all title records and produces the ordered in-memory task list.
///
/// The result is sorted ascending by shelf coordinate using plain code-point
/// comparison; coordinate strings are expected to be zero-padded at the
/// source so lexicographic order equals shelf order. Barcodes must be unique
/// across the export; duplicates are a data-integrity error, not an
/// ambiguity to resolve by position.
pub fn load_tasks(store: &dyn TitleStore) -> Result<Vec<PickingTask>, IngestError> {
    let records = store
        .fetch_titles()
        .map_err(|error| IngestError::Fetch(format!("{error:#}")))?;

    let mut seen = BTreeSet::new();
    let mut tasks = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.barcode.clone()) {
            return Err(IngestError::DuplicateBarcode {
                barcode: record.barcode,
            });
        }
        tasks.push(PickingTask::from_record(record));
    }

    tasks.sort_by(|left, right| left.coordinate.cmp(&right.coordinate));
    Ok(tasks)
}
