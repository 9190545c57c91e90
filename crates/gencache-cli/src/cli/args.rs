use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "gencache",
    version,
    about = "Inspect and clear the local generation cache"
)]
pub struct Cli {
    /// Cache directory to use instead of the per-user default
    #[arg(long, global = true, env = "GENCACHE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the cache directory
    Path,
    /// List database files in the cache directory
    Files(FilesArgs),
    /// Record counts for one cache database
    Stats(StatsArgs),
    /// List the generations of a run
    Show(ShowArgs),
    /// Delete the cache directory and every database in it
    Clear,
    Version,
}

#[derive(clap::Args, Debug, Clone)]
pub struct FilesArgs {
    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long, default_value = gencache_core::DEFAULT_DB_NAME)]
    pub db: String,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(long, default_value = gencache_core::DEFAULT_DB_NAME)]
    pub db: String,

    #[arg(long)]
    pub run_id: String,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}
