//! Error taxonomy for the load run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a load run.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Malformed or structurally incomplete input document.
    #[error("Parse error in {path:?} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Store-level constraint violation (duplicate key without an upsert clause).
    #[error("Constraint violation: {0}")]
    Constraint(#[source] rusqlite::Error),

    /// Any other store failure: open, I/O, lost connection.
    #[error("Store error: {0}")]
    Connection(#[source] rusqlite::Error),

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing database does not match the declared schema.
    #[error("Schema mismatch: {0}")]
    Schema(String),
}

impl EtlError {
    pub fn parse<P: Into<PathBuf>, M: Into<String>>(path: P, line: usize, message: M) -> Self {
        EtlError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, EtlError::Constraint(_))
    }
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                EtlError::Constraint(err)
            }
            _ => EtlError::Connection(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
