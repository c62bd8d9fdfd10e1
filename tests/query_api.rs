//! Library-level tests for the query API.
//!
//! These drive [`MeetingCache`] through an instrumented [`CacheSource`] so
//! that file reads can be counted while the real filesystem is used.

use async_trait::async_trait;
use meeting_cache::config::{CachePaths, DocumentsConfig};
use meeting_cache::error::ErrorKind;
use meeting_cache::loader::CacheLoader;
use meeting_cache::query::MeetingCache;
use meeting_cache::source::{CacheSource, FileStat, FsSource};
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

// ─── Instrumented source ────────────────────────────────────────────

struct SlowCountingSource {
    delay: Duration,
    reads: AtomicUsize,
}

#[async_trait]
impl CacheSource for SlowCountingSource {
    async fn dir_exists(&self, path: &Path) -> bool {
        FsSource.dir_exists(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        tokio::time::sleep(self.delay).await;
        FsSource.stat(path).await
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        FsSource.read(path).await
    }
}

struct Env {
    _tmp: TempDir,
    paths: CachePaths,
    source: Arc<SlowCountingSource>,
    cache: MeetingCache,
}

impl Env {
    fn new(delay: Duration) -> Self {
        let tmp = TempDir::new().unwrap();
        let paths = CachePaths::new(tmp.path(), "Granola", "cache-v3.json");
        fs_create(&paths.vendor_dir);
        let source = Arc::new(SlowCountingSource {
            delay,
            reads: AtomicUsize::new(0),
        });
        let loader = CacheLoader::with_source(paths.clone(), source.clone());
        let cache = MeetingCache::new(loader, DocumentsConfig::default());
        Self {
            _tmp: tmp,
            paths,
            source,
            cache,
        }
    }

    fn write(&self, state: Value, modified: SystemTime) {
        let inner = json!({ "state": state }).to_string();
        let outer = json!({ "cache": inner }).to_string();
        std::fs::write(&self.paths.cache_file, outer).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&self.paths.cache_file)
            .unwrap()
            .set_modified(modified)
            .unwrap();
    }

    fn reads(&self) -> usize {
        self.source.reads.load(Ordering::SeqCst)
    }
}

fn fs_create(path: &Path) {
    std::fs::create_dir_all(path).unwrap();
}

fn hours_ago(hours: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(hours * 3600)
}

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_repeated_listing_reads_once_and_is_identical() {
    let env = Env::new(Duration::ZERO);
    env.write(
        json!({ "documents": {
            "a": { "title": "A", "created_at": "2024-01-01T00:00:00Z" },
            "b": { "title": "B", "created_at": "2024-02-01T00:00:00Z" }
        } }),
        hours_ago(1),
    );

    let first = env.cache.list_recent_documents(None).await;
    let second = env.cache.list_recent_documents(None).await;

    assert_eq!(first.data(), second.data());
    assert_eq!(env.reads(), 1);
}

#[tokio::test]
async fn test_concurrent_queries_share_one_read() {
    let env = Env::new(Duration::from_millis(50));
    env.write(
        json!({
            "documents": { "abc": { "title": "Sync" } },
            "transcripts": { "abc": [{ "text": "Hi" }] }
        }),
        hours_ago(1),
    );

    let (docs, transcript, more_docs) = tokio::join!(
        env.cache.list_recent_documents(Some(10)),
        env.cache.get_transcript("abc"),
        env.cache.list_recent_documents(None),
    );

    assert!(docs.is_success());
    assert!(more_docs.is_success());
    assert_eq!(transcript.data().unwrap().plain_text, "Hi");
    assert_eq!(env.reads(), 1);
}

#[tokio::test]
async fn test_file_write_is_picked_up_and_age_resets() {
    let env = Env::new(Duration::ZERO);
    env.write(json!({ "documents": { "a": { "title": "Old" } } }), hours_ago(5));

    let before = env.cache.list_recent_documents(None).await;
    assert_eq!(before.data().unwrap()[0].title, "Old");
    assert!(before.cache_age_millis().unwrap() >= 4 * 3600 * 1000);

    env.write(json!({ "documents": { "a": { "title": "New" } } }), SystemTime::now());

    let after = env.cache.list_recent_documents(None).await;
    assert_eq!(after.data().unwrap()[0].title, "New");
    assert!(after.cache_age_millis().unwrap() < 60_000);
    assert_eq!(env.reads(), 2);
}

#[tokio::test]
async fn test_soft_deleted_document_never_listed() {
    let env = Env::new(Duration::ZERO);
    env.write(
        json!({
            "documents": {
                "kept": { "title": "Kept" },
                "gone": { "title": "Gone", "deleted_at": "2024-01-01T00:00:00Z" }
            },
            "transcripts": { "gone": [{ "text": "still here" }] }
        }),
        hours_ago(1),
    );

    let result = env.cache.list_recent_documents(None).await;
    let docs = result.data().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "kept");
}

#[tokio::test]
async fn test_empty_transcript_id_does_not_read() {
    let env = Env::new(Duration::ZERO);
    env.write(json!({}), hours_ago(1));

    let result = env.cache.get_transcript("").await;
    assert_eq!(result.error_kind(), Some(ErrorKind::CacheNotFound));
    assert_eq!(env.reads(), 0);
}

#[tokio::test]
async fn test_malformed_cache_reports_parse_error() {
    let env = Env::new(Duration::ZERO);
    std::fs::write(&env.paths.cache_file, r#"{"cache": 123}"#).unwrap();

    let result = env.cache.list_recent_documents(None).await;
    assert_eq!(result.error_kind(), Some(ErrorKind::CacheParseError));
    assert!(result.cache_age_millis().is_none());
}
