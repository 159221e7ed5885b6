use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::record::TitleRecord;
use crate::time::now_utc_rfc3339;

/// The two operations the picking core consumes from its storage
/// collaborator. Transport, schema, and connection lifecycle belong to the
/// implementation behind this trait.
pub trait TitleStore {
    fn fetch_titles(&self) -> anyhow::Result<Vec<TitleRecord>>;

    fn update_status(&self, barcode: &str, status: i32) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read title store at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse title store at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write title store at {path}: {message}")]
    Write { path: PathBuf, message: String },
    #[error("no title with barcode '{barcode}' exists in the store")]
    UnknownBarcode { barcode: String },
}

/// File-backed [`TitleStore`] over a JSON export of title records.
#[derive(Debug, Clone)]
pub struct JsonTitleStore {
    path: PathBuf,
}

impl JsonTitleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_records(&self) -> Result<Vec<TitleRecord>, StoreError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save_records(&self, records: &[TitleRecord]) -> Result<(), StoreError> {
        let write_error = |message: String| StoreError::Write {
            path: self.path.clone(),
            message,
        };

        let serialized =
            serde_json::to_string_pretty(records).map_err(|error| write_error(error.to_string()))?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let temp =
            tempfile::NamedTempFile::new_in(dir).map_err(|error| write_error(error.to_string()))?;
        fs::write(temp.path(), serialized).map_err(|error| write_error(error.to_string()))?;
        temp.persist(&self.path)
            .map_err(|error| write_error(error.to_string()))?;

        Ok(())
    }
}

impl TitleStore for JsonTitleStore {
    fn fetch_titles(&self) -> anyhow::Result<Vec<TitleRecord>> {
        Ok(self.load_records()?)
    }

    fn update_status(&self, barcode: &str, status: i32) -> anyhow::Result<()> {
        let mut records = self.load_records()?;

        let record = records
            .iter_mut()
            .find(|record| record.barcode == barcode)
            .ok_or_else(|| StoreError::UnknownBarcode {
                barcode: barcode.to_string(),
            })?;

        record.status = status;
        record.updated_at = now_utc_rfc3339().ok();

        self.save_records(&records)?;
        Ok(())
    }
}
