//! Raw cache decoding.
//!
//! The meeting app stores its state double-encoded: the file is a JSON object
//! whose `cache` field is a *string* holding a second JSON document. That
//! inner document carries a `state` object with the `documents` and
//! `transcripts` maps this crate reads.
//!
//! ```text
//! {"cache": "{\"state\": {\"documents\": {...}, \"transcripts\": {...}}}"}
//! ```
//!
//! The envelope is strict (any deviation fails the whole read), while the
//! individual records are modelled with every field optional. A record field
//! of an unexpected type is treated as absent, and a map entry that is null or
//! not a record is skipped; the normalizer then applies its defaults.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::DecodeError;

/// Decoded upstream state from one successful read of the cache file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawState {
    #[serde(default, deserialize_with = "document_entries")]
    pub documents: BTreeMap<String, RawDocument>,
    #[serde(default, deserialize_with = "transcript_entries")]
    pub transcripts: BTreeMap<String, Vec<RawSegment>>,
}

/// One upstream document record. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    /// Usually an ISO-8601 string; occasionally epoch milliseconds.
    #[serde(default)]
    pub created_at: Option<Value>,
    /// Any non-null value marks the record as soft-deleted.
    #[serde(default)]
    pub deleted_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub people: Option<Vec<RawPerson>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPerson {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
}

/// One transcript segment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSegment {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

impl RawDocument {
    pub fn is_deleted(&self) -> bool {
        matches!(&self.deleted_at, Some(v) if !v.is_null())
    }
}

impl RawState {
    /// True when `transcripts[id]` exists and is non-empty.
    pub fn has_transcript(&self, id: &str) -> bool {
        self.transcripts
            .get(id)
            .is_some_and(|segments| !segments.is_empty())
    }
}

/// Decode the raw bytes of the cache file into [`RawState`].
///
/// All-or-nothing: either both decoding stages succeed and `state` is an
/// object of the expected shape, or an error is returned.
pub fn decode(bytes: &[u8]) -> Result<RawState, DecodeError> {
    let envelope: Value = serde_json::from_slice(bytes).map_err(DecodeError::Envelope)?;

    let payload = envelope
        .get("cache")
        .and_then(Value::as_str)
        .ok_or(DecodeError::PayloadField)?;

    let mut payload: Value = serde_json::from_str(payload).map_err(DecodeError::Payload)?;

    let state = payload
        .get_mut("state")
        .map(Value::take)
        .filter(Value::is_object)
        .ok_or(DecodeError::MissingState)?;

    serde_json::from_value(state).map_err(DecodeError::State)
}

/// Deserialize a field, turning a value of the wrong type into `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Read an optional map of arbitrary values. `null` counts as an empty map;
/// anything other than an object is an error.
fn entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode an object value as `T`, or `None` for null and non-object values.
fn record<T: DeserializeOwned>(value: Value) -> Option<T> {
    value
        .is_object()
        .then(|| serde_json::from_value(value).ok())
        .flatten()
}

/// Documents map; entries that are not objects are skipped.
fn document_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, RawDocument>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(deserializer)?
        .into_iter()
        .filter_map(|(id, value)| record(value).map(|doc| (id, doc)))
        .collect())
}

/// Transcripts map; entries that are not arrays are skipped, as are
/// segments that are not objects.
fn transcript_entries<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<RawSegment>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(deserializer)?
        .into_iter()
        .filter_map(|(id, value)| match value {
            Value::Array(segments) => {
                Some((id, segments.into_iter().filter_map(record).collect()))
            }
            _ => None,
        })
        .collect())
}
