//! Internal helpers shared by the document-backed services.

use serde_json::{Map, Value};

use crate::domain::Error;
use crate::domain::ports::{AgentError, Document, DocumentData, DocumentStoreError};

pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_agent_error(stage: &str, error: &AgentError) -> Error {
    Error::internal(format!("{stage} failed: {error}"))
}

/// Unwrap a `json!` object literal into a document body.
pub(crate) fn object(value: Value) -> DocumentData {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Stamp `createdAt` and `updatedAt` on a fresh document body.
pub(crate) fn stamped(mut data: DocumentData, now: &str) -> DocumentData {
    data.insert("createdAt".to_owned(), Value::String(now.to_owned()));
    data.insert("updatedAt".to_owned(), Value::String(now.to_owned()));
    data
}

/// `Some(value)` as a JSON string, `None` as `null`.
pub(crate) fn nullable(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::String(text.to_owned()))
}

/// Absent and `null` bodies both count as missing.
pub(crate) fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

pub(crate) fn documents_json(documents: Vec<Document>) -> Vec<Value> {
    documents.into_iter().map(Document::into_json).collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use serde_json::json;

    #[test]
    fn stamped_sets_both_timestamps() {
        let data = stamped(object(json!({"startupId": "s"})), "2024-01-01T00:00:00.000Z");
        assert_eq!(data["createdAt"], data["updatedAt"]);
        assert_eq!(data["startupId"], "s");
    }

    #[test]
    fn null_bodies_are_not_present() {
        assert_eq!(present(Some(Value::Null)), None);
        assert_eq!(present(Some(json!({"a": 1}))), Some(json!({"a": 1})));
    }

    #[test]
    fn agent_errors_carry_their_stage() {
        let err = map_agent_error("Ingestion agent", &AgentError::status("502: bad gateway"));
        assert_eq!(
            err.message(),
            Some("Ingestion agent failed: agent responded with 502: bad gateway")
        );
        assert_eq!(err.code(), "internal_error");
    }
}
