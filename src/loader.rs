//! Cache snapshot lifecycle and single-flight loading.
//!
//! [`CacheLoader`] owns at most one decoded snapshot of the cache file,
//! tagged with the file modification time it was read at. Every call to
//! [`CacheLoader::ensure_fresh`] re-checks the install marker and the file's
//! mtime; the file is only re-read and re-decoded when the mtime differs from
//! the snapshot's.
//!
//! # Single-flight
//!
//! The cache file can be tens of megabytes, and the UI may refresh while a
//! background poll is running. The stat/read/decode sequence is therefore run
//! as one shared future: the first caller installs it in the in-flight slot,
//! callers arriving before it settles await a clone of the same future, and
//! the future clears the slot when it completes. The next call after that
//! starts a fresh check.
//!
//! ```text
//! ensure_fresh ──▶ install marker? ──no──▶ NotInstalled (snapshot kept)
//!                       │yes
//!                       ▼
//!               in-flight slot ──occupied──▶ await shared outcome
//!                       │empty
//!                       ▼
//!        stat ──missing──▶ clear snapshot, CacheNotFound
//!          │
//!   mtime == snapshot? ──yes──▶ serve snapshot
//!          │no
//!        read + decode ──err──▶ clear snapshot, CacheParseError
//!          │ok
//!     replace snapshot
//! ```

use futures::future::{BoxFuture, FutureExt, Shared};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, warn};

use crate::config::CachePaths;
use crate::decode::{decode, RawState};
use crate::error::ErrorKind;
use crate::source::{CacheSource, FsSource};

/// A usable snapshot handed to the query layer.
#[derive(Debug, Clone)]
pub struct FreshState {
    pub state: Arc<RawState>,
    /// Milliseconds between the file's modification time and now.
    pub cache_age_millis: u64,
}

/// Summary of the held snapshot, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub source_mod_time: SystemTime,
    pub loaded_at: SystemTime,
    pub documents: usize,
    pub transcripts: usize,
}

struct LoadedCache {
    state: Arc<RawState>,
    source_mod_time: SystemTime,
    loaded_at: SystemTime,
}

type LoadOutcome = Result<FreshState, ErrorKind>;
type PendingLoad = Shared<BoxFuture<'static, LoadOutcome>>;

/// Owns the cached snapshot and deduplicates concurrent loads.
///
/// Cheap to clone; clones share the same snapshot and in-flight slot.
#[derive(Clone)]
pub struct CacheLoader {
    inner: Arc<Inner>,
}

struct Inner {
    paths: CachePaths,
    source: Arc<dyn CacheSource>,
    snapshot: Mutex<Option<LoadedCache>>,
    in_flight: Mutex<Option<PendingLoad>>,
}

impl CacheLoader {
    /// Loader reading from the local filesystem.
    pub fn new(paths: CachePaths) -> Self {
        Self::with_source(paths, Arc::new(FsSource))
    }

    pub fn with_source(paths: CachePaths, source: Arc<dyn CacheSource>) -> Self {
        Self {
            inner: Arc::new(Inner {
                paths,
                source,
                snapshot: Mutex::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn paths(&self) -> &CachePaths {
        &self.inner.paths
    }

    pub fn source(&self) -> &Arc<dyn CacheSource> {
        &self.inner.source
    }

    /// Return a snapshot that matches the cache file's current mtime,
    /// reading and decoding the file only when needed.
    pub async fn ensure_fresh(&self) -> LoadOutcome {
        let vendor_dir = &self.inner.paths.vendor_dir;
        if !self.inner.source.dir_exists(vendor_dir).await {
            debug!(path = %vendor_dir.display(), "vendor directory missing");
            return Err(ErrorKind::NotInstalled);
        }

        let pending = {
            let mut slot = lock(&self.inner.in_flight);
            match slot.as_ref() {
                Some(pending) => {
                    debug!("joining in-flight cache load");
                    pending.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let pending = inner.load().boxed().shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Drop the held snapshot so the next call re-reads the file.
    pub fn invalidate(&self) {
        if self.inner.clear_snapshot() {
            debug!("cache snapshot invalidated");
        }
    }

    pub fn snapshot_info(&self) -> Option<SnapshotInfo> {
        lock(&self.inner.snapshot).as_ref().map(|loaded| SnapshotInfo {
            source_mod_time: loaded.source_mod_time,
            loaded_at: loaded.loaded_at,
            documents: loaded.state.documents.len(),
            transcripts: loaded.state.transcripts.len(),
        })
    }
}

impl Inner {
    async fn load(self: Arc<Self>) -> LoadOutcome {
        let outcome = self.refresh().await;
        *lock(&self.in_flight) = None;
        outcome
    }

    async fn refresh(&self) -> LoadOutcome {
        let path = &self.paths.cache_file;

        let stat = match self.source.stat(path).await {
            Ok(stat) => stat,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "cannot stat cache file");
                }
                if self.clear_snapshot() {
                    info!(path = %path.display(), "cache file gone; snapshot dropped");
                }
                return Err(ErrorKind::CacheNotFound);
            }
        };

        if let Some(state) = self.snapshot_at(stat.modified) {
            debug!(path = %path.display(), "cache snapshot is fresh");
            return Ok(FreshState {
                state,
                cache_age_millis: age_millis(stat.modified),
            });
        }

        let started = Instant::now();
        let bytes = match self.source.read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.clear_snapshot();
                if e.kind() == io::ErrorKind::NotFound {
                    debug!(path = %path.display(), "cache file removed before read");
                    return Err(ErrorKind::CacheNotFound);
                }
                warn!(path = %path.display(), error = %e, "cannot read cache file");
                return Err(ErrorKind::CacheParseError);
            }
        };

        match decode(&bytes) {
            Ok(state) => {
                let state = Arc::new(state);
                info!(
                    path = %path.display(),
                    bytes = bytes.len(),
                    documents = state.documents.len(),
                    transcripts = state.transcripts.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "cache file loaded"
                );
                *lock(&self.snapshot) = Some(LoadedCache {
                    state: Arc::clone(&state),
                    source_mod_time: stat.modified,
                    loaded_at: SystemTime::now(),
                });
                Ok(FreshState {
                    state,
                    cache_age_millis: age_millis(stat.modified),
                })
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file is malformed");
                self.clear_snapshot();
                Err(e.into())
            }
        }
    }

    fn snapshot_at(&self, modified: SystemTime) -> Option<Arc<RawState>> {
        lock(&self.snapshot)
            .as_ref()
            .filter(|loaded| loaded.source_mod_time == modified)
            .map(|loaded| Arc::clone(&loaded.state))
    }

    /// Returns `true` if a snapshot was held.
    fn clear_snapshot(&self) -> bool {
        lock(&self.snapshot).take().is_some()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Saturates at zero for modification times in the future.
fn age_millis(modified: SystemTime) -> u64 {
    SystemTime::now()
        .duration_since(modified)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
