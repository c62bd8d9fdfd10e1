//! Transcript segment lists → plain text.

use crate::decode::RawState;
use crate::error::ErrorKind;
use crate::models::Transcript;

/// Join the non-empty segment texts of `document_id`, one per line.
///
/// A missing or empty segment list is [`ErrorKind::CacheNotFound`]: a
/// document without a transcript looks the same as an unknown document.
pub fn extract(state: &RawState, document_id: &str) -> Result<Transcript, ErrorKind> {
    let segments = state
        .transcripts
        .get(document_id)
        .filter(|segments| !segments.is_empty())
        .ok_or(ErrorKind::CacheNotFound)?;

    let plain_text = segments
        .iter()
        .filter_map(|segment| segment.text.as_deref())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(Transcript {
        document_id: document_id.to_string(),
        plain_text,
    })
}
