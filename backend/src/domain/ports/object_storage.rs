//! Driven port issuing time-limited signed URLs for binary objects.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::GcsUri;

define_port_error! {
    /// Errors raised while issuing signed URLs.
    pub enum ObjectStorageError {
        /// Signing credentials are absent.
        NotConfigured { message: String } => "object storage not configured: {message}",
        /// The request cannot be signed (bad expiry, key material, ...).
        Signing { message: String } => "failed to sign object URL: {message}",
    }
}

/// HTTP verb the signed URL authorises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedUrlMethod {
    /// Download.
    Get,
    /// Upload.
    Put,
}

impl SignedUrlMethod {
    /// HTTP method name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

/// Parameters for one signed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlRequest {
    /// Object being accessed.
    pub object: GcsUri,
    /// Authorised verb.
    pub method: SignedUrlMethod,
    /// Validity window.
    pub expires_in: Duration,
    /// Content type the uploader must send; signed for uploads only.
    pub content_type: Option<String>,
}

/// A signed URL and its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// Fully qualified URL.
    pub url: String,
    /// Instant after which the URL stops working.
    pub expires_at: DateTime<Utc>,
}

/// Driven port for object storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Issue a signed URL for `request`.
    async fn signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUrl, ObjectStorageError>;
}
