//! Error taxonomy surfaced to callers, plus the decoder's internal error.
//!
//! Every failure inside the decoder, loader, or extractor ends up as one of
//! the three [`ErrorKind`] variants. The UI layer maps those to a fixed set of
//! messages, so the variants and their codes must stay stable.

use serde::Serialize;
use thiserror::Error;

/// Closed set of failures a query can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The vendor application-data directory does not exist.
    #[error("meeting app is not installed")]
    NotInstalled,
    /// The cache file (or the requested transcript) is not present.
    #[error("cache not found")]
    CacheNotFound,
    /// The cache file exists but does not match the expected envelope.
    #[error("cache could not be parsed")]
    CacheParseError,
}

impl ErrorKind {
    /// Stable machine-readable code, identical to the serialized form.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotInstalled => "not_installed",
            ErrorKind::CacheNotFound => "cache_not_found",
            ErrorKind::CacheParseError => "cache_parse_error",
        }
    }

    /// Fixed user-facing message for this failure.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::NotInstalled => {
                "The meeting app does not appear to be installed on this machine."
            }
            ErrorKind::CacheNotFound => {
                "No meeting data found yet. Open the meeting app and try again."
            }
            ErrorKind::CacheParseError => {
                "The meeting app's cache file could not be read. It may be from an unsupported version."
            }
        }
    }

    /// Whether calling again later, without user action, may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::CacheNotFound)
    }
}

/// Reasons the raw cache bytes failed to decode.
///
/// Only used for logging; all variants collapse to
/// [`ErrorKind::CacheParseError`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("outer envelope is not valid JSON: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("envelope field `cache` is missing or not a string")]
    PayloadField,
    #[error("inner payload is not valid JSON: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("payload has no `state` object")]
    MissingState,
    #[error("`state` has an unexpected shape: {0}")]
    State(#[source] serde_json::Error),
}

impl From<DecodeError> for ErrorKind {
    fn from(_: DecodeError) -> Self {
        ErrorKind::CacheParseError
    }
}
