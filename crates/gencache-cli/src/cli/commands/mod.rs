use super::args::*;
use anyhow::Context;
use gencache_core::CacheLocation;
use std::path::{Path, PathBuf};

pub mod clear;
pub mod files;
pub mod show;
pub mod stats;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const NOT_FOUND: i32 = 1;
    pub const ERROR: i32 = 2;
}

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let location = match cli.cmd {
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            return Ok(exit_codes::OK);
        }
        _ => resolve_location(cli.cache_dir.as_deref())?,
    };

    match cli.cmd {
        Command::Path => {
            println!("{}", location.dir().display());
            Ok(exit_codes::OK)
        }
        Command::Files(args) => files::run(&location, args),
        Command::Stats(args) => stats::run(&location, args),
        Command::Show(args) => show::run(&location, args),
        Command::Clear => clear::run(&location),
        Command::Version => Ok(exit_codes::OK),
    }
}

fn resolve_location(cache_dir: Option<&Path>) -> anyhow::Result<CacheLocation> {
    match cache_dir {
        Some(dir) => Ok(CacheLocation::at(dir)),
        None => CacheLocation::user_default().context("no cache directory (pass --cache-dir)"),
    }
}

/// `stats` and `show` only read; they must not create a cache as a side effect.
fn require_db(location: &CacheLocation, db: &str) -> Option<PathBuf> {
    let path = location.dir().join(db);
    if path.is_file() {
        Some(path)
    } else {
        eprintln!("no cache database at {}", path.display());
        None
    }
}
