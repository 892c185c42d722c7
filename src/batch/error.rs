use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email `{email}` is already stored")]
    DuplicateEmail { email: String },
    #[error("cannot access record file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record data: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures aborting a batch import.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot read input line {line}: {source}")]
    Read {
        line: u64,
        #[source]
        source: csv::Error,
    },
}
