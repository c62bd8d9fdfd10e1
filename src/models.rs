//! Normalized data models returned to callers.
//!
//! These are the stable shapes the UI consumes. They are always freshly built
//! from the loader's snapshot, never references into it.

use serde::Serialize;

use crate::error::ErrorKind;

/// A meeting document with every field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub participants: Vec<String>,
    pub has_transcript: bool,
}

/// Plain-text transcript of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub document_id: String,
    pub plain_text: String,
}

/// Outcome of a query: exactly one of data or an error kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult<T> {
    Success {
        data: T,
        /// Age of the cache file, present when the data came from a real read.
        #[serde(rename = "cacheAgeMillis", skip_serializing_if = "Option::is_none")]
        cache_age_millis: Option<u64>,
    },
    Failure {
        kind: ErrorKind,
    },
}

impl<T> QueryResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryResult::Success { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryResult::Success { data, .. } => Some(data),
            QueryResult::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            QueryResult::Success { .. } => None,
            QueryResult::Failure { kind } => Some(*kind),
        }
    }

    pub fn cache_age_millis(&self) -> Option<u64> {
        match self {
            QueryResult::Success {
                cache_age_millis, ..
            } => *cache_age_millis,
            QueryResult::Failure { .. } => None,
        }
    }
}

impl<T> From<ErrorKind> for QueryResult<T> {
    fn from(kind: ErrorKind) -> Self {
        QueryResult::Failure { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_serialization() {
        let result = QueryResult::Success {
            data: Transcript {
                document_id: "abc".to_string(),
                plain_text: "Hello".to_string(),
            },
            cache_age_millis: Some(1200),
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "status": "success",
                "data": { "documentId": "abc", "plainText": "Hello" },
                "cacheAgeMillis": 1200
            })
        );
    }

    #[test]
    fn test_failure_serialization() {
        let result: QueryResult<Vec<Document>> = ErrorKind::NotInstalled.into();
        assert!(!result.is_success());
        assert!(result.data().is_none());
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "status": "failure", "kind": "not_installed" })
        );
    }

    #[test]
    fn test_age_omitted_when_absent() {
        let result = QueryResult::Success {
            data: 1,
            cache_age_millis: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("cacheAgeMillis").is_none());
    }
}
