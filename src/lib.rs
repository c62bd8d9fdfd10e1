//! # Meeting Cache
//!
//! Read-only access to the meeting documents and transcripts a desktop
//! meeting app keeps in its local cache file.
//!
//! The app writes `<app-data-dir>/<vendor-dir>/cache-v3.json`, a JSON
//! envelope whose `cache` field holds a second, JSON-encoded document. This
//! crate re-reads that file only when its modification time changes, shares
//! one in-flight load among concurrent callers, normalizes the sparse
//! upstream records, and reports every failure as one of three
//! [`ErrorKind`](error::ErrorKind)s.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ MeetingCache │──▶│ CacheLoader  │──▶│ CacheSource  │
//! │   (query)    │   │ single-flight│   │  stat/read   │
//! └──────┬───────┘   └──────┬───────┘   └──────────────┘
//!        │                  ▼
//!        │             ┌─────────┐
//!        │             │ decode  │  envelope → RawState
//!        │             └─────────┘
//!        ▼
//! ┌──────────────┐ ┌──────────────┐
//! │  normalize   │ │  transcript  │
//! │ → Document   │ │ → Transcript │
//! └──────────────┘ └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mcache --data-dir "$HOME/Library/Application Support" documents --limit 10
//! mcache --data-dir "$HOME/Library/Application Support" transcript <id>
//! mcache --data-dir "$HOME/Library/Application Support" status
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Error taxonomy |
//! | [`models`] | Normalized result types |
//! | [`decode`] | Raw cache envelope decoding |
//! | [`source`] | File access abstraction |
//! | [`loader`] | Snapshot lifecycle and single-flight loading |
//! | [`normalize`] | Raw records → documents |
//! | [`transcript`] | Segment lists → plain text |
//! | [`query`] | Query API |
//! | [`status`] | Install/cache health overview |

pub mod config;
pub mod decode;
pub mod error;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod query;
pub mod source;
pub mod status;
pub mod transcript;

#[cfg(test)]
mod testing;
