//! Raw document records → [`Document`].
//!
//! [`to_document`] is the single place where upstream omissions are turned
//! into defaults. [`normalize`] applies the soft-delete filter, ordering and
//! limit on top of it.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::config::{DocumentsConfig, UndatedPolicy};
use crate::decode::{RawDocument, RawPerson, RawState};
use crate::models::Document;

/// Fallback values used while normalizing.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub untitled: String,
    pub unknown_participant: String,
    pub undated: UndatedPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        DocumentsConfig::default().into()
    }
}

impl From<DocumentsConfig> for NormalizeOptions {
    fn from(config: DocumentsConfig) -> Self {
        Self {
            untitled: config.untitled,
            unknown_participant: config.unknown_participant,
            undated: config.undated,
        }
    }
}

/// Resolve a caller-supplied limit: positive values are used as-is, anything
/// else falls back to `default`.
pub fn resolve_limit(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
        _ => default,
    }
}

/// Parse an untyped limit argument. Anything that is not an integer yields
/// `None`, which [`resolve_limit`] then replaces with the default.
pub fn parse_limit(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Normalize every live document, newest first, truncated to `limit`.
pub fn normalize(state: &RawState, limit: usize, options: &NormalizeOptions) -> Vec<Document> {
    let now = Utc::now().timestamp_millis();

    let mut documents: Vec<Document> = state
        .documents
        .iter()
        .filter(|(_, raw)| !raw.is_deleted())
        .map(|(key, raw)| to_document(key, raw, state, options, now))
        .collect();

    // Stable: equal timestamps keep map order.
    documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    documents.truncate(limit);
    documents
}

/// Map one raw record to a [`Document`]. Total: never fails.
///
/// `key` is the record's key in the documents map and stands in for a
/// missing `id`. `now` is the timestamp used for undated records under
/// [`UndatedPolicy::Now`].
pub fn to_document(
    key: &str,
    raw: &RawDocument,
    state: &RawState,
    options: &NormalizeOptions,
    now: i64,
) -> Document {
    let id = non_empty(raw.id.as_deref()).unwrap_or(key).to_string();

    let title = non_empty(raw.title.as_deref())
        .unwrap_or(&options.untitled)
        .to_string();

    let created_at = raw
        .created_at
        .as_ref()
        .and_then(parse_timestamp_millis)
        .unwrap_or(match options.undated {
            UndatedPolicy::Now => now,
            UndatedPolicy::Last => 0,
        });

    let participants = raw
        .people
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|person| participant_name(person, &options.unknown_participant))
        .collect();

    let has_transcript = state.has_transcript(&id);

    Document {
        id,
        title,
        created_at,
        participants,
        has_transcript,
    }
}

fn participant_name(person: &RawPerson, unknown: &str) -> String {
    non_empty(person.name.as_deref())
        .or_else(|| non_empty(person.email.as_deref()))
        .unwrap_or(unknown)
        .to_string()
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

/// Parse an upstream timestamp into epoch milliseconds.
///
/// Accepts RFC 3339 strings, naive `YYYY-MM-DD[ T]HH:MM:SS[.f]` and
/// `YYYY-MM-DD` strings (read as UTC), and numeric epoch milliseconds.
pub fn parse_timestamp_millis(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}
