//! Shared fixtures for unit tests.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::config::CachePaths;
use crate::loader::CacheLoader;
use crate::source::{CacheSource, FileStat, FsSource};

/// Filesystem source that counts stats/reads and can slow them down.
pub struct CountingSource {
    delay: Duration,
    stats: AtomicUsize,
    reads: AtomicUsize,
}

impl CountingSource {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            stats: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn stats(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheSource for CountingSource {
    async fn dir_exists(&self, path: &Path) -> bool {
        FsSource.dir_exists(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        FsSource.stat(path).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        FsSource.read(path).await
    }
}

/// Temporary app-data directory with a vendor directory inside.
pub struct Fixture {
    tmp: TempDir,
    pub paths: CachePaths,
}

impl Fixture {
    pub fn new() -> Self {
        let fixture = Self::without_vendor_dir();
        std::fs::create_dir_all(&fixture.paths.vendor_dir).unwrap();
        fixture
    }

    pub fn without_vendor_dir() -> Self {
        let tmp = TempDir::new().unwrap();
        let paths = CachePaths::new(tmp.path(), "Vendor", "cache-v3.json");
        Self { tmp, paths }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn write(&self, state: Value) {
        write_cache(&self.paths.cache_file, state, None);
    }

    pub fn counting_loader(&self, delay: Duration) -> (CacheLoader, Arc<CountingSource>) {
        let source = Arc::new(CountingSource::new(delay));
        let loader = CacheLoader::with_source(self.paths.clone(), source.clone());
        (loader, source)
    }
}

/// Write a double-encoded cache file holding `state`, optionally pinning its mtime.
pub fn write_cache(path: &Path, state: Value, modified: Option<SystemTime>) {
    let inner = json!({ "state": state }).to_string();
    let outer = json!({ "cache": inner }).to_string();
    std::fs::write(path, outer).unwrap();
    if let Some(modified) = modified {
        std::fs::File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }
}
