//! Errors of the load pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can stop (or, under the skip policy, discard) the load of a file.
///
/// A song/artist lookup that finds nothing is not an error: it surfaces as
/// `None` ids on the songplay row.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Cannot open warehouse: {0:#}")]
    Connection(#[source] anyhow::Error),

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record in {path} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid event in {path} line {line}: {message}")]
    Schema {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Warehouse error while loading {path}: {source:#}")]
    Store {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

impl EtlError {
    /// Attach the source file to an error raised before the path was known.
    pub(crate) fn at(self, path: &std::path::Path) -> Self {
        match self {
            EtlError::Io { source, .. } => EtlError::Io {
                path: path.to_path_buf(),
                source,
            },
            EtlError::Parse { line, message, .. } => EtlError::Parse {
                path: path.to_path_buf(),
                line,
                message,
            },
            EtlError::Schema { line, message, .. } => EtlError::Schema {
                path: path.to_path_buf(),
                line,
                message,
            },
            EtlError::Store { source, .. } => EtlError::Store {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        }
    }

    pub(crate) fn store(path: &std::path::Path, source: anyhow::Error) -> Self {
        EtlError::Store {
            path: path.to_path_buf(),
            source,
        }
    }
}
