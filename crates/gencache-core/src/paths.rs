//! Per-user cache directory resolution.
//!
//! The location is a pure function of the static application and vendor
//! identity below, so every caller in every process lands in the same place.

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::errors::{CacheError, Result};

pub const APP_NAME: &str = "gencache";
pub const VENDOR: &str = "gencache-dev";

/// Default database file name inside the cache directory.
pub const DEFAULT_DB_NAME: &str = "cache.sqlite3";

/// OS-convention user cache directory for this application, e.g.
/// `~/.cache/gencache` on Linux or `%LOCALAPPDATA%\gencache-dev\gencache\cache`
/// on Windows.
pub fn user_cache_dir() -> Result<PathBuf> {
    ProjectDirs::from("", VENDOR, APP_NAME)
        .map(|p| p.cache_dir().to_path_buf())
        .ok_or(CacheError::NoCacheDirectory)
}

/// SQLite sidecar files that belong to a database and are not databases
/// themselves.
pub(crate) fn is_sidecar(file_name: &str) -> bool {
    file_name.ends_with("-wal") || file_name.ends_with("-shm") || file_name.ends_with("-journal")
}
