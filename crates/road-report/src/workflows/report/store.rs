use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use super::domain::PersistedReport;

/// Append-only history of submitted reports for one installation.
pub trait ReportStore: Send + Sync {
    fn append(&self, record: PersistedReport) -> Result<(), StoreError>;
    fn read_all(&self) -> Result<Vec<PersistedReport>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("report store unavailable: {0}")]
    Unavailable(String),
    #[error("report history at {path} could not be accessed")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("report history at {path} is corrupt")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    records: Mutex<Vec<PersistedReport>>,
}

impl ReportStore for InMemoryReportStore {
    fn append(&self, record: PersistedReport) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;
        guard.push(record);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<PersistedReport>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;
        Ok(guard.clone())
    }
}

/// Keeps each installation's history as a JSON array in `<dir>/<installation>.json`.
#[derive(Debug)]
pub struct JsonFileReportStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileReportStore {
    pub fn new(data_dir: impl AsRef<Path>, installation_id: &str) -> Self {
        let file_name = format!("{}.json", sanitize(installation_id));
        Self {
            path: data_dir.as_ref().join(file_name),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<PersistedReport>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn sanitize(installation_id: &str) -> String {
    installation_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl ReportStore for JsonFileReportStore {
    fn append(&self, record: PersistedReport) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned lock".to_string()))?;

        let mut records = self.load()?;
        records.push(record);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }
        let body = serde_json::to_vec_pretty(&records).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|source| self.io_error(source))?;
        fs::rename(&staging, &self.path).map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), total = records.len(), "report history updated");
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<PersistedReport>, StoreError> {
        self.load()
    }
}
