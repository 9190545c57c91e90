use gencache_core::CacheLocation;

use super::exit_codes;

pub fn run(location: &CacheLocation) -> anyhow::Result<i32> {
    let existed = location.dir().exists();
    location.clear()?;
    if existed {
        eprintln!("removed {}", location.dir().display());
    } else {
        eprintln!("note: {} does not exist (nothing to clear)", location.dir().display());
    }
    Ok(exit_codes::OK)
}
