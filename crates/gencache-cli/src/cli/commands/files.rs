use gencache_core::CacheLocation;

use super::exit_codes;
use crate::cli::args::FilesArgs;

pub fn run(location: &CacheLocation, args: FilesArgs) -> anyhow::Result<i32> {
    let files = location.files()?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&files)?);
    } else if files.is_empty() {
        eprintln!("no cache databases in {}", location.dir().display());
    } else {
        for f in &files {
            println!("{}\t{}", f.name, f.bytes);
        }
    }
    Ok(exit_codes::OK)
}
