use anyhow::Context;
use gencache_core::CacheLocation;

use super::{exit_codes, require_db};
use crate::cli::args::StatsArgs;

pub fn run(location: &CacheLocation, args: StatsArgs) -> anyhow::Result<i32> {
    let Some(path) = require_db(location, &args.db) else {
        return Ok(exit_codes::NOT_FOUND);
    };

    let store = location
        .connect(&args.db)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let stats = store.stats()?;
    let runs = store.run_ids()?;
    store.close()?;

    if args.format == "json" {
        let out = serde_json::json!({
            "db": path,
            "stats": stats,
            "run_ids": runs,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Cache: {}", path.display());
        println!("Generations: {}", stats.generations);
        println!("  succeeded: {}", stats.succeeded);
        println!("  failed: {}", stats.failed);
        println!("Runs: {}", stats.runs);
        for r in &runs {
            println!("- {}", r);
        }
    }
    Ok(exit_codes::OK)
}
