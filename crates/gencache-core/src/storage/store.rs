use crate::errors::{CacheError, Result};
use crate::model::{CacheFile, CacheStats, GenerationRecord, NewGeneration};
use crate::paths;
use rusqlite::{params, Connection};
use same_file::Handle;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const INSERT_GENERATION: &str =
    "INSERT INTO generations(run_id, prompt, generated_text, error) VALUES (?1, ?2, ?3, ?4)";

/// A cache directory. Resolving one touches nothing on disk; `connect`
/// creates the directory on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLocation {
    dir: PathBuf,
}

impl CacheLocation {
    /// The per-user cache directory for this application.
    pub fn user_default() -> Result<Self> {
        Ok(Self {
            dir: paths::user_cache_dir()?,
        })
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Opens `<dir>/<name>`, creating the directory and the `generations`
    /// table if needed. Every call returns a fresh handle.
    pub fn connect(&self, name: &str) -> Result<Store> {
        validate_name(name)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Directory {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.dir.join(name);
        let conn = open_connection(&path).map_err(|source| CacheError::StorageOpen {
            path: path.clone(),
            source,
        })?;
        let identity = Handle::from_path(&path).map_err(|source| CacheError::Directory {
            path: path.clone(),
            source,
        })?;

        Ok(Store {
            conn: Arc::new(Mutex::new(conn)),
            identity: Arc::new(identity),
            path,
        })
    }

    /// Removes the whole directory, every database in it included. A missing
    /// directory is not an error.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::info!(event = "gencache.clear", path = %self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(event = "gencache.clear.noop", path = %self.dir.display());
                Ok(())
            }
            Err(source) => Err(CacheError::Deletion {
                path: self.dir.clone(),
                source,
            }),
        }
    }

    /// Database files in the directory, sorted by name. WAL and shared-memory
    /// sidecars are skipped.
    pub fn files(&self) -> Result<Vec<CacheFile>> {
        let dir_err = |source: std::io::Error| CacheError::Directory {
            path: self.dir.clone(),
            source,
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(dir_err(e)),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(dir_err)?;
            let meta = entry.metadata().map_err(dir_err)?;
            if !meta.is_file() {
                continue;
            }
            // A lossy name could not be passed back to `connect`.
            let Ok(name) = entry.file_name().into_string() else {
                tracing::debug!(event = "gencache.files.skip_non_utf8", path = %entry.path().display());
                continue;
            };
            if paths::is_sidecar(&name) {
                continue;
            }
            files.push(CacheFile {
                name,
                bytes: meta.len(),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

/// Connects to `name` in the per-user cache directory
/// (see [`paths::DEFAULT_DB_NAME`] for the conventional name).
pub fn connect(name: &str) -> Result<Store> {
    CacheLocation::user_default()?.connect(name)
}

/// Deletes the per-user cache directory.
pub fn clear() -> Result<()> {
    CacheLocation::user_default()?.clear()
}

fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CacheError::InvalidName(name.to_string())),
    }
}

fn open_connection(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;

    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    ensure_wal(&journal_mode)?;

    // IMMEDIATE takes the write lock up front so concurrent first connects
    // wait on the busy handler instead of failing on a lock upgrade.
    conn.execute_batch(&format!(
        "BEGIN IMMEDIATE;\n{}\nCOMMIT;",
        crate::storage::schema::DDL
    ))?;

    tracing::debug!(
        event = "gencache.connect",
        path = %path.display(),
        journal_mode = %journal_mode,
    );
    Ok(conn)
}

/// SQLite answers a refused `journal_mode=WAL` with the mode it kept.
fn ensure_wal(journal_mode: &str) -> rusqlite::Result<()> {
    if journal_mode.eq_ignore_ascii_case("wal") {
        return Ok(());
    }
    Err(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
        Some(format!(
            "write-ahead logging unavailable (journal_mode is {journal_mode})"
        )),
    ))
}

/// Handle to one cache database file.
///
/// Clones share the same connection and may be sent to other threads; the
/// connection is used by one thread at a time. Rows can be appended and read,
/// never updated or deleted.
#[derive(Clone, Debug)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
    /// The file the connection was opened on, to detect a cleared and
    /// recreated cache.
    identity: Arc<Handle>,
    path: PathBuf,
}

impl Store {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn insert(&self, generation: &NewGeneration) -> Result<i64> {
        let conn = self.lock()?;
        let (generated_text, error) = generation.columns();
        conn.execute(
            INSERT_GENERATION,
            params![generation.run_id, generation.prompt, generated_text, error],
        )
        .map_err(CacheError::from_sqlite)?;

        let id = conn.last_insert_rowid();
        tracing::debug!(event = "gencache.insert", run_id = %generation.run_id, generation_id = id);
        Ok(id)
    }

    /// Appends all rows in one transaction; on error none of them are kept.
    pub fn insert_batch(&self, generations: &[NewGeneration]) -> Result<Vec<i64>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(CacheError::from_sqlite)?;

        let mut ids = Vec::with_capacity(generations.len());
        {
            let mut stmt = tx
                .prepare(INSERT_GENERATION)
                .map_err(CacheError::from_sqlite)?;
            for g in generations {
                let (generated_text, error) = g.columns();
                stmt.execute(params![g.run_id, g.prompt, generated_text, error])
                    .map_err(CacheError::from_sqlite)?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit().map_err(CacheError::from_sqlite)?;

        tracing::debug!(event = "gencache.insert_batch", rows = ids.len());
        Ok(ids)
    }

    /// All rows of a run, oldest first.
    pub fn run(&self, run_id: &str) -> Result<Vec<GenerationRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT generation_id, run_id, prompt, generated_text, error
                 FROM generations
                 WHERE run_id = ?1
                 ORDER BY generation_id ASC",
            )
            .map_err(CacheError::from_sqlite)?;

        let rows = stmt
            .query_map(params![run_id], GenerationRecord::from_row)
            .map_err(CacheError::from_sqlite)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(CacheError::from_sqlite)?);
        }
        Ok(out)
    }

    /// Distinct run ids, in order of first appearance.
    pub fn run_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT run_id FROM generations
                 GROUP BY run_id
                 ORDER BY MIN(generation_id) ASC",
            )
            .map_err(CacheError::from_sqlite)?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(CacheError::from_sqlite)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(CacheError::from_sqlite)?);
        }
        Ok(out)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT
                COUNT(*),
                COUNT(DISTINCT run_id),
                COALESCE(SUM(CASE WHEN generated_text IS NOT NULL AND error IS NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN error IS NOT NULL AND generated_text IS NULL THEN 1 ELSE 0 END), 0)
             FROM generations",
            [],
            |row| {
                Ok(CacheStats {
                    generations: row.get::<_, i64>(0)? as u64,
                    runs: row.get::<_, i64>(1)? as u64,
                    succeeded: row.get::<_, i64>(2)? as u64,
                    failed: row.get::<_, i64>(3)? as u64,
                })
            },
        )
        .map_err(CacheError::from_sqlite)
    }

    /// Runs `f` against the raw connection, for queries this type does not
    /// cover.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        let conn = self.lock()?;
        f(&conn).map_err(CacheError::from_sqlite)
    }

    /// Closes the connection if this is the last clone of the handle.
    /// Dropping the handle closes it as well, but ignores close errors.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex.into_inner().map_err(|_| CacheError::Poisoned)?;
                conn.close().map_err(|(_, e)| CacheError::Storage(e))
            }
            Err(_) => Ok(()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        // SQLite keeps working on an unlinked file, so a cleared cache would
        // otherwise swallow writes silently, even once the path is recreated.
        match Handle::from_path(&self.path) {
            Ok(current) if current == *self.identity => {}
            _ => {
                return Err(CacheError::StaleHandle {
                    path: self.path.clone(),
                })
            }
        }
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }
}
