//! Install and cache health overview.
//!
//! Reports where the loader looks, whether the install marker and cache file
//! exist, and what snapshot (if any) is held. Used by `mcache status`. This
//! only stats; it never reads or decodes the cache file.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::loader::CacheLoader;

/// Snapshot of the cache's on-disk and in-memory state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub vendor_dir: PathBuf,
    pub installed: bool,
    pub cache_file: PathBuf,
    pub cache_exists: bool,
    pub cache_bytes: Option<u64>,
    /// Epoch milliseconds.
    pub cache_modified_at: Option<i64>,
    pub snapshot: Option<SnapshotStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStatus {
    /// Epoch milliseconds of the file mtime the snapshot was read at.
    pub source_modified_at: i64,
    pub loaded_at: i64,
    pub documents: usize,
    pub transcripts: usize,
    /// False when the file has changed (or vanished) since the snapshot.
    pub current: bool,
}

pub async fn cache_status(loader: &CacheLoader) -> CacheStatus {
    let paths = loader.paths();
    let source = loader.source();

    let installed = source.dir_exists(&paths.vendor_dir).await;
    let stat = if installed {
        source.stat(&paths.cache_file).await.ok()
    } else {
        None
    };

    let snapshot = loader.snapshot_info().map(|info| SnapshotStatus {
        source_modified_at: epoch_millis(info.source_mod_time),
        loaded_at: epoch_millis(info.loaded_at),
        documents: info.documents,
        transcripts: info.transcripts,
        current: stat.is_some_and(|s| s.modified == info.source_mod_time),
    });

    CacheStatus {
        vendor_dir: paths.vendor_dir.clone(),
        installed,
        cache_file: paths.cache_file.clone(),
        cache_exists: stat.is_some(),
        cache_bytes: stat.map(|s| s.len),
        cache_modified_at: stat.map(|s| epoch_millis(s.modified)),
        snapshot,
    }
}

/// Print a human-readable summary to stdout.
pub fn print_status(status: &CacheStatus) {
    println!("Meeting Cache — Status");
    println!("======================");
    println!();
    println!("  Vendor dir:  {}", status.vendor_dir.display());
    println!(
        "  Installed:   {}",
        if status.installed { "yes" } else { "no" }
    );
    println!("  Cache file:  {}", status.cache_file.display());
    match (status.cache_bytes, status.cache_modified_at) {
        (Some(bytes), Some(modified)) => {
            println!("  Size:        {} bytes", bytes);
            println!("  Modified:    {}", format_ts(modified));
        }
        _ => println!("  Size:        (missing)"),
    }
    if let Some(snapshot) = &status.snapshot {
        println!();
        println!("  Snapshot:    {} documents, {} transcripts", snapshot.documents, snapshot.transcripts);
        println!("  Loaded:      {}", format_ts(snapshot.loaded_at));
        println!("  Current:     {}", snapshot.current);
    }
    println!();
}

fn epoch_millis(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp_millis()
}

/// Render epoch milliseconds as an RFC 3339 UTC timestamp.
fn format_ts(ts_millis: i64) -> String {
    DateTime::from_timestamp_millis(ts_millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ts_millis.to_string())
}
