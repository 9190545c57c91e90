use std::path::PathBuf;

use rusqlite::ErrorCode;

pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors surfaced by the generation cache. Nothing here is retried.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// No home directory to derive a per-user cache location from.
    #[error("could not resolve a user cache directory (no home directory)")]
    NoCacheDirectory,

    #[error("cannot create or read cache directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `connect` names must be a plain file name inside the cache directory.
    #[error("invalid cache database name: {0:?}")]
    InvalidName(String),

    #[error("failed to open cache database {}: {source}", path.display())]
    StorageOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Strict typing or NOT NULL rejected a row.
    #[error("constraint violation: {0}")]
    ConstraintViolation(#[source] rusqlite::Error),

    #[error("failed to delete cache directory {}: {source}", path.display())]
    Deletion {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The handle's backing file was removed (usually by `clear`).
    #[error("cache database {} no longer exists", path.display())]
    StaleHandle { path: PathBuf },

    #[error("cache storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("cache connection lock poisoned")]
    Poisoned,
}

impl CacheError {
    /// Sorts a post-open engine error into `ConstraintViolation` or `Storage`.
    pub(crate) fn from_sqlite(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) | Some(ErrorCode::TypeMismatch) => {
                CacheError::ConstraintViolation(err)
            }
            _ => CacheError::Storage(err),
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, CacheError::ConstraintViolation(_))
    }

    /// True for errors that stem from the filesystem rather than the engine.
    pub fn is_io(&self) -> bool {
        match self {
            CacheError::Directory { .. }
            | CacheError::Deletion { .. }
            | CacheError::StaleHandle { .. }
            | CacheError::NoCacheDirectory => true,
            CacheError::Storage(e) | CacheError::StorageOpen { source: e, .. } => {
                matches!(
                    e.sqlite_error_code(),
                    Some(ErrorCode::SystemIoFailure)
                        | Some(ErrorCode::CannotOpen)
                        | Some(ErrorCode::ReadOnly)
                        | Some(ErrorCode::DiskFull)
                )
            }
            _ => false,
        }
    }
}
