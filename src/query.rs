//! The two queries the rest of the application calls.
//!
//! Both return a [`QueryResult`]; no error escapes as a panic or `Err`.
//! Failures from the loader pass through unchanged, and successful results
//! carry the loader-reported cache age.

use anyhow::Result;
use tracing::debug;

use crate::config::{Config, DocumentsConfig};
use crate::error::ErrorKind;
use crate::loader::CacheLoader;
use crate::models::{Document, QueryResult, Transcript};
use crate::normalize::{normalize, resolve_limit, NormalizeOptions};
use crate::transcript::extract;

/// Query facade over one [`CacheLoader`].
#[derive(Clone)]
pub struct MeetingCache {
    loader: CacheLoader,
    options: NormalizeOptions,
    default_limit: usize,
}

impl MeetingCache {
    pub fn new(loader: CacheLoader, documents: DocumentsConfig) -> Self {
        let default_limit = documents.default_limit;
        Self {
            loader,
            options: documents.into(),
            default_limit,
        }
    }

    /// Build a filesystem-backed instance from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let loader = CacheLoader::new(config.cache_paths()?);
        Ok(Self::new(loader, config.documents.clone()))
    }

    pub fn loader(&self) -> &CacheLoader {
        &self.loader
    }

    /// Most recent live documents, newest first.
    ///
    /// `limit` must be positive to take effect; otherwise the configured
    /// default applies.
    pub async fn list_recent_documents(&self, limit: Option<i64>) -> QueryResult<Vec<Document>> {
        let fresh = match self.loader.ensure_fresh().await {
            Ok(fresh) => fresh,
            Err(kind) => return kind.into(),
        };

        let limit = resolve_limit(limit, self.default_limit);
        let data = normalize(&fresh.state, limit, &self.options);
        debug!(count = data.len(), limit, "listed documents");

        QueryResult::Success {
            data,
            cache_age_millis: Some(fresh.cache_age_millis),
        }
    }

    /// Plain-text transcript for one document.
    pub async fn get_transcript(&self, document_id: &str) -> QueryResult<Transcript> {
        if document_id.is_empty() {
            return ErrorKind::CacheNotFound.into();
        }

        let fresh = match self.loader.ensure_fresh().await {
            Ok(fresh) => fresh,
            Err(kind) => return kind.into(),
        };

        match extract(&fresh.state, document_id) {
            Ok(data) => QueryResult::Success {
                data,
                cache_age_millis: Some(fresh.cache_age_millis),
            },
            Err(kind) => kind.into(),
        }
    }
}
