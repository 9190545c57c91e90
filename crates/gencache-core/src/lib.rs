//! Local disk cache for generation results.
//!
//! Prompt/response pairs are appended to a SQLite file in a per-user cache
//! directory, grouped by run id.
//!
//! ```no_run
//! use gencache_core::{connect, NewGeneration, DEFAULT_DB_NAME};
//!
//! let store = connect(DEFAULT_DB_NAME)?;
//! store.insert(&NewGeneration::generated("run-1", "Say hi", "hi"))?;
//! # Ok::<(), gencache_core::CacheError>(())
//! ```

pub mod errors;
pub mod model;
pub mod paths;
pub mod storage;

pub use errors::{CacheError, Result};
pub use model::{CacheFile, CacheStats, GenerationOutcome, GenerationRecord, NewGeneration};
pub use paths::{user_cache_dir, DEFAULT_DB_NAME};
pub use storage::{clear, connect, CacheLocation, Store};
