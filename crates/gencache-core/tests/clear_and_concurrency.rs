use gencache_core::{CacheError, CacheLocation, NewGeneration, DEFAULT_DB_NAME};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::tempdir;

#[test]
fn test_clear_missing_dir_is_noop() {
    let dir = tempdir().unwrap();
    let loc = CacheLocation::at(dir.path().join("never-created"));

    loc.clear().unwrap();
    loc.clear().unwrap();
    assert!(!loc.dir().exists());
}

#[test]
fn test_clear_then_connect_starts_empty() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let loc = CacheLocation::at(dir.path().join("cache"));

    let store = loc.connect(DEFAULT_DB_NAME)?;
    store.insert(&NewGeneration::generated("r", "p", "t"))?;
    let other = loc.connect("other.sqlite3")?;
    other.insert(&NewGeneration::failed("r", "p", "e"))?;
    drop(store);
    drop(other);

    loc.clear()?;
    assert!(!loc.dir().exists());

    let fresh = loc.connect(DEFAULT_DB_NAME)?;
    assert_eq!(fresh.stats()?.generations, 0);
    assert!(fresh.run("r")?.is_empty());
    Ok(())
}

#[test]
fn test_stale_handle_fails_cleanly_after_clear() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let loc = CacheLocation::at(dir.path().join("cache"));

    let store = loc.connect(DEFAULT_DB_NAME)?;
    store.insert(&NewGeneration::generated("r", "p", "t"))?;

    loc.clear()?;

    let err = store
        .insert(&NewGeneration::generated("r", "p", "t"))
        .unwrap_err();
    assert!(matches!(err, CacheError::StaleHandle { .. }), "{err:?}");
    assert!(err.is_io());
    assert!(matches!(store.stats(), Err(CacheError::StaleHandle { .. })));

    // Closing may report an engine error, but must not panic.
    let _ = store.close();
    Ok(())
}

#[test]
fn test_old_handle_is_stale_after_clear_and_reconnect() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let loc = CacheLocation::at(dir.path().join("cache"));

    let old = loc.connect(DEFAULT_DB_NAME)?;
    old.insert(&NewGeneration::generated("r", "p", "t"))?;

    loc.clear()?;
    let fresh = loc.connect(DEFAULT_DB_NAME)?;
    assert_eq!(old.path(), fresh.path());

    let write = old.insert(&NewGeneration::generated("r", "lost", "t"));
    assert!(matches!(write, Err(CacheError::StaleHandle { .. })), "{write:?}");
    assert!(matches!(old.run("r"), Err(CacheError::StaleHandle { .. })));

    fresh.insert(&NewGeneration::generated("r", "kept", "t"))?;
    let rows = fresh.run("r")?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].prompt, "kept");
    Ok(())
}

#[test]
fn test_concurrent_connects_from_threads() -> anyhow::Result<()> {
    for round in 0..5 {
        concurrent_connects_on_cold_dir(round)?;
    }
    Ok(())
}

/// Directory creation, WAL switch and schema creation all race here.
fn concurrent_connects_on_cold_dir(round: usize) -> anyhow::Result<()> {
    let dir = tempdir()?;
    let loc = CacheLocation::at(dir.path().join(format!("cache-{round}")));
    let n = 8;
    let barrier = Arc::new(Barrier::new(n));

    let handles: Vec<_> = (0..n)
        .map(|i| {
            let loc = loc.clone();
            let barrier = barrier.clone();
            thread::spawn(move || -> gencache_core::Result<i64> {
                barrier.wait();
                let store = loc.connect(DEFAULT_DB_NAME)?;
                store.insert(&NewGeneration::generated(
                    "threads",
                    format!("prompt {i}"),
                    "ok",
                ))
            })
        })
        .collect();

    let mut ids = Vec::new();
    for h in handles {
        ids.push(h.join().expect("thread panicked")?);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), n);

    let store = loc.connect(DEFAULT_DB_NAME)?;
    assert_eq!(store.run("threads")?.len(), n);
    Ok(())
}

#[test]
fn test_shared_handle_across_threads() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = CacheLocation::at(dir.path()).connect(DEFAULT_DB_NAME)?;

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    store
                        .insert(&NewGeneration::generated(
                            format!("run-{t}"),
                            format!("p{i}"),
                            "t",
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = store.stats()?;
    assert_eq!(stats.generations, 40);
    assert_eq!(stats.runs, 4);
    Ok(())
}
