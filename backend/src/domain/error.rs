//! Domain-level error types.
//!
//! These errors are transport agnostic. Inbound adapters map the
//! [`ErrorKind`] to a status code and serialise the payload as
//! `{"error": "<code>", "message": "<text>"}`.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::TraceId;

/// Failure category used by adapters to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The referenced document does not exist.
    NotFound,
    /// A store, agent, or unexpected failure.
    Internal,
}

/// Generic code attached to internal failures.
pub const INTERNAL_ERROR_CODE: &str = "internal_error";

/// Domain error payload.
///
/// `code` is the stable machine-readable identifier clients switch on, for
/// example `pitch_deck_not_found` or `startupId_required`. The trace
/// identifier is captured from the request scope at construction and is only
/// ever emitted as a response header.
///
/// # Examples
/// ```
/// use dealroom::domain::{Error, ErrorKind};
///
/// let err = Error::not_found("user_not_found");
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.code(), "user_not_found");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Error {
    #[serde(skip)]
    kind: ErrorKind,
    #[serde(rename = "error")]
    #[schema(example = "pitch_deck_not_found")]
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip)]
    trace_id: Option<String>,
}

impl Error {
    /// Create an error of the given kind carrying a machine-readable code.
    pub fn new(kind: ErrorKind, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: None,
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Optional human-readable detail.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Trace identifier captured when the error was created.
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the trace identifier.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Convenience constructor for [`ErrorKind::InvalidRequest`].
    pub fn invalid_request(code: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, code)
    }

    /// Convenience constructor for [`ErrorKind::Unauthorized`].
    pub fn unauthorized(code: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, code)
    }

    /// Convenience constructor for [`ErrorKind::Forbidden`].
    pub fn forbidden(code: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, code)
    }

    /// Convenience constructor for [`ErrorKind::NotFound`].
    pub fn not_found(code: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, code)
    }

    /// Internal failure with the generic `internal_error` code.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, INTERNAL_ERROR_CODE).with_message(message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.code),
            None => f.write_str(&self.code),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::with_message(
        Error::internal("store offline"),
        json!({"error": "internal_error", "message": "store offline"})
    )]
    #[case::code_only(
        Error::not_found("deal_note_not_found"),
        json!({"error": "deal_note_not_found"})
    )]
    fn serialises_to_error_envelope(#[case] error: Error, #[case] expected: serde_json::Value) {
        let value = serde_json::to_value(&error).expect("serialise error");
        assert_eq!(value, expected);
    }

    #[test]
    fn trace_id_is_never_serialised() {
        let error = Error::forbidden("forbidden").with_trace_id("abc");
        let value = serde_json::to_value(&error).expect("serialise error");
        assert!(value.get("traceId").is_none());
        assert!(value.get("trace_id").is_none());
        assert_eq!(error.trace_id(), Some("abc"));
    }

    #[tokio::test]
    async fn captures_scoped_trace_id() {
        let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
            .parse()
            .expect("valid UUID");
        let error = TraceId::scope(trace_id, async { Error::invalid_request("bad") }).await;
        assert_eq!(error.trace_id(), Some(trace_id.to_string().as_str()));
    }

    #[test]
    fn display_includes_code_and_message() {
        let error = Error::internal("boom");
        assert_eq!(error.to_string(), "internal_error: boom");
    }
}
