//! Google Cloud Storage V4 signed URLs using HMAC keys.
//!
//! Implements the `GOOG4-HMAC-SHA256` query-string signing scheme: a
//! canonical request is hashed into a string-to-sign, which is signed with a
//! key derived from the HMAC secret, the date and the fixed `auto/storage`
//! scope.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use mockable::Clock;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{
    ObjectStorage, ObjectStorageError, SignedUrl, SignedUrlMethod, SignedUrlRequest,
};

/// Default XML API host.
pub const DEFAULT_STORAGE_HOST: &str = "storage.googleapis.com";

const ALGORITHM: &str = "GOOG4-HMAC-SHA256";
const SCOPE_SUFFIX: &str = "auto/storage/goog4_request";
/// Longest validity GCS accepts, seven days.
const MAX_EXPIRY_SECS: u64 = 604_800;

/// RFC 3986 unreserved characters pass through; everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

type HmacSha256 = Hmac<Sha256>;

/// HMAC credentials and endpoint for signing.
#[derive(Clone, Default)]
pub struct GcsSignerConfig {
    pub access_id: Option<String>,
    pub secret: Option<Zeroizing<String>>,
    pub host: Option<String>,
}

impl std::fmt::Debug for GcsSignerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsSignerConfig")
            .field("access_id", &self.access_id)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .finish()
    }
}

/// [`ObjectStorage`] issuing V4 signed URLs.
pub struct GcsSigner {
    config: GcsSignerConfig,
    clock: Arc<dyn Clock>,
}

impl GcsSigner {
    pub fn new(config: GcsSignerConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn host(&self) -> &str {
        self.config.host.as_deref().unwrap_or(DEFAULT_STORAGE_HOST)
    }

    fn credentials(&self) -> Result<(&str, &str), ObjectStorageError> {
        match (&self.config.access_id, &self.config.secret) {
            (Some(access_id), Some(secret)) if !access_id.is_empty() && !secret.is_empty() => {
                Ok((access_id.as_str(), secret.as_str()))
            }
            _ => Err(ObjectStorageError::not_configured(
                "GCS HMAC access id and secret are required",
            )),
        }
    }

    /// Sign `request` as of `now`.
    fn sign_at(
        &self,
        request: &SignedUrlRequest,
        now: DateTime<Utc>,
    ) -> Result<SignedUrl, ObjectStorageError> {
        let (access_id, secret) = self.credentials()?;
        let expires_secs = request.expires_in.as_secs();
        if expires_secs == 0 || expires_secs > MAX_EXPIRY_SECS {
            return Err(ObjectStorageError::signing(format!(
                "expiry must be between 1 and {MAX_EXPIRY_SECS} seconds, got {expires_secs}"
            )));
        }

        let date = now.format("%Y%m%d").to_string();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{date}/{SCOPE_SUFFIX}");
        let host = self.host();

        let mut headers = vec![("host", host.to_owned())];
        if request.method == SignedUrlMethod::Put {
            if let Some(content_type) = &request.content_type {
                headers.push(("content-type", content_type.trim().to_owned()));
            }
        }
        headers.sort_by(|left, right| left.0.cmp(right.0));
        let signed_headers = headers
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();

        let mut query = vec![
            ("X-Goog-Algorithm", ALGORITHM.to_owned()),
            ("X-Goog-Credential", format!("{access_id}/{scope}")),
            ("X-Goog-Date", timestamp.clone()),
            ("X-Goog-Expires", expires_secs.to_string()),
            ("X-Goog-SignedHeaders", signed_headers.clone()),
        ];
        query.sort_by(|left, right| left.0.cmp(right.0));
        let canonical_query = query
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let canonical_uri = canonical_uri(request.object.bucket(), request.object.object());
        let canonical_request = [
            request.method.as_str(),
            canonical_uri.as_str(),
            canonical_query.as_str(),
            canonical_headers.as_str(),
            signed_headers.as_str(),
            "UNSIGNED-PAYLOAD",
        ]
        .join("\n");

        let string_to_sign = format!(
            "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );
        let key = signing_key(secret, &date)?;
        let signature = hex::encode(hmac(&key, string_to_sign.as_bytes())?);

        let expires_at = now
            + TimeDelta::from_std(request.expires_in)
                .map_err(|err| ObjectStorageError::signing(err.to_string()))?;
        debug!(object = %request.object, method = request.method.as_str(), "signed object url");
        Ok(SignedUrl {
            url: format!("https://{host}{canonical_uri}?{canonical_query}&X-Goog-Signature={signature}"),
            expires_at,
        })
    }
}

#[async_trait]
impl ObjectStorage for GcsSigner {
    async fn signed_url(&self, request: &SignedUrlRequest) -> Result<SignedUrl, ObjectStorageError> {
        self.sign_at(request, self.clock.utc())
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, UNRESERVED).to_string()
}

/// `/bucket/object` with each object path segment escaped.
fn canonical_uri(bucket: &str, object: &str) -> String {
    let path = object.split('/').map(encode).collect::<Vec<_>>().join("/");
    format!("/{}/{path}", encode(bucket))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ObjectStorageError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|err| ObjectStorageError::signing(err.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn signing_key(secret: &str, date: &str) -> Result<Zeroizing<Vec<u8>>, ObjectStorageError> {
    let seed = Zeroizing::new(format!("GOOG4{secret}"));
    let mut key = hmac(seed.as_bytes(), date.as_bytes())?;
    for part in ["auto", "storage", "goog4_request"] {
        key = hmac(&key, part.as_bytes())?;
    }
    Ok(Zeroizing::new(key))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::GcsUri;
    use crate::test_support::SteppingClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[fixture]
    fn signer() -> GcsSigner {
        GcsSigner::new(
            GcsSignerConfig {
                access_id: Some("GOOG1EXAMPLE".to_owned()),
                secret: Some(Zeroizing::new("secret".to_owned())),
                host: None,
            },
            Arc::new(SteppingClock::starting_at(instant())),
        )
    }

    fn request(method: SignedUrlMethod, secs: u64) -> SignedUrlRequest {
        SignedUrlRequest {
            object: GcsUri::new("uploads", "pitch_decks/s1/17 deck.pdf"),
            method,
            expires_in: Duration::from_secs(secs),
            content_type: Some("application/pdf".to_owned()),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn download_urls_sign_only_the_host(signer: GcsSigner) {
        let signed = signer
            .signed_url(&request(SignedUrlMethod::Get, 3600))
            .await
            .expect("signed");
        assert!(signed.url.starts_with(
            "https://storage.googleapis.com/uploads/pitch_decks/s1/17%20deck.pdf?X-Goog-Algorithm=GOOG4-HMAC-SHA256"
        ));
        assert!(signed.url.contains("X-Goog-Credential=GOOG1EXAMPLE%2F20240501%2Fauto%2Fstorage%2Fgoog4_request"));
        assert!(signed.url.contains("X-Goog-Date=20240501T080000Z"));
        assert!(signed.url.contains("X-Goog-Expires=3600"));
        assert!(signed.url.contains("X-Goog-SignedHeaders=host&"));
        assert_eq!(signed.expires_at, instant() + TimeDelta::hours(1));
    }

    #[rstest]
    fn uploads_also_sign_the_content_type(signer: GcsSigner) {
        let signed = signer
            .sign_at(&request(SignedUrlMethod::Put, 600), instant())
            .expect("signed");
        assert!(signed.url.contains("X-Goog-SignedHeaders=content-type%3Bhost"));
    }

    #[rstest]
    fn signatures_are_deterministic_and_method_bound(signer: GcsSigner) {
        let get = signer
            .sign_at(&request(SignedUrlMethod::Get, 600), instant())
            .expect("get");
        let again = signer
            .sign_at(&request(SignedUrlMethod::Get, 600), instant())
            .expect("get again");
        let put = signer
            .sign_at(&request(SignedUrlMethod::Put, 600), instant())
            .expect("put");
        assert_eq!(get.url, again.url);
        assert_ne!(get.url, put.url);
        let signature = get.url.rsplit("X-Goog-Signature=").next().expect("signature");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[case::zero(0)]
    #[case::over_a_week(MAX_EXPIRY_SECS + 1)]
    fn expiry_outside_the_window_is_rejected(signer: GcsSigner, #[case] secs: u64) {
        let err = signer
            .sign_at(&request(SignedUrlMethod::Get, secs), instant())
            .expect_err("bad expiry");
        assert!(matches!(err, ObjectStorageError::Signing { .. }));
    }

    #[rstest]
    fn missing_credentials_are_not_configured() {
        let signer = GcsSigner::new(
            GcsSignerConfig::default(),
            Arc::new(SteppingClock::default()),
        );
        let err = signer
            .sign_at(&request(SignedUrlMethod::Get, 60), instant())
            .expect_err("unconfigured");
        assert!(matches!(err, ObjectStorageError::NotConfigured { .. }));
    }
}
