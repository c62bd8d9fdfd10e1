//! File access used by the cache loader.
//!
//! The loader never touches the filesystem directly; it goes through a
//! [`CacheSource`]. [`FsSource`] is the real implementation backed by
//! `tokio::fs`. Tests substitute wrappers that count reads or delay I/O.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Metadata of the cache file relevant to freshness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub modified: SystemTime,
    pub len: u64,
}

/// Read-only access to the install marker and the cache file.
#[async_trait]
pub trait CacheSource: Send + Sync {
    /// Returns `true` if `path` exists and is a directory.
    async fn dir_exists(&self, path: &Path) -> bool;

    /// Stat a file. A missing file is reported as [`io::ErrorKind::NotFound`].
    async fn stat(&self, path: &Path) -> io::Result<FileStat>;

    /// Read the whole file.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// [`CacheSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait]
impl CacheSource for FsSource {
    async fn dir_exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(FileStat {
            modified: metadata.modified()?,
            len: metadata.len(),
        })
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
