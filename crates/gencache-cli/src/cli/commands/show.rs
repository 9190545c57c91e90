use anyhow::Context;
use gencache_core::{CacheLocation, GenerationOutcome};

use super::{exit_codes, require_db};
use crate::cli::args::ShowArgs;

const PREVIEW_CHARS: usize = 80;

pub fn run(location: &CacheLocation, args: ShowArgs) -> anyhow::Result<i32> {
    let Some(path) = require_db(location, &args.db) else {
        return Ok(exit_codes::NOT_FOUND);
    };

    let store = location
        .connect(&args.db)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let rows = store.run(&args.run_id)?;
    store.close()?;

    if rows.is_empty() {
        eprintln!("run '{}' has no generations", args.run_id);
        return Ok(exit_codes::NOT_FOUND);
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(exit_codes::OK);
    }

    for r in &rows {
        let status = match r.outcome() {
            Some(GenerationOutcome::Generated(text)) => format!("ok    {}", preview(&text)),
            Some(GenerationOutcome::Failed(err)) => format!("error {}", preview(&err)),
            None => "?".to_string(),
        };
        println!("#{} {} | {}", r.generation_id, preview(&r.prompt), status);
    }
    Ok(exit_codes::OK)
}

fn preview(s: &str) -> String {
    let one_line = s.replace('\n', " ");
    if one_line.chars().count() <= PREVIEW_CHARS {
        return one_line;
    }
    let cut: String = one_line.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}...")
}
