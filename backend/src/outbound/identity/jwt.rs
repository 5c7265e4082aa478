//! Identity-token verification with `jsonwebtoken`.
//!
//! Tokens are expected in the Firebase/Identity Platform shape: issuer
//! `https://securetoken.google.com/{project}` and the project as audience.
//! An RS256 public key takes precedence over an HS256 shared secret.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{IdentityVerificationError, IdentityVerifier, VerifiedIdentity};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Key material and project for verification.
#[derive(Clone, Default)]
pub struct JwtIdentityConfig {
    pub project_id: String,
    /// PEM-encoded RSA public key.
    pub public_key_pem: Option<String>,
    pub shared_secret: Option<Zeroizing<String>>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    roles: Option<Vec<String>>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, rename = "startupId")]
    startup_id: Option<String>,
}

impl Claims {
    fn into_identity(self) -> VerifiedIdentity {
        let roles = match (self.roles, self.role) {
            (Some(roles), _) => roles,
            (None, Some(role)) => vec![role],
            (None, None) => Vec::new(),
        };
        VerifiedIdentity {
            uid: self.sub,
            email: self.email,
            roles,
            startup_id: self.startup_id,
        }
    }
}

/// [`IdentityVerifier`] checking signature, expiry, issuer and audience.
pub struct JwtIdentityVerifier {
    key: Option<(DecodingKey, Algorithm)>,
    project_id: String,
}

impl JwtIdentityVerifier {
    /// Build a verifier. Without key material every call reports
    /// [`IdentityVerificationError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error when the public key is not valid RSA PEM.
    pub fn new(config: JwtIdentityConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = match (config.public_key_pem, config.shared_secret) {
            (Some(pem), _) => Some((DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256)),
            (None, Some(secret)) if !secret.is_empty() => Some((
                DecodingKey::from_secret(secret.as_bytes()),
                Algorithm::HS256,
            )),
            _ => None,
        };
        Ok(Self {
            key,
            project_id: config.project_id,
        })
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{}", self.project_id)]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityVerificationError> {
        let Some((key, algorithm)) = &self.key else {
            return Err(IdentityVerificationError::not_configured());
        };
        let data = decode::<Claims>(token, key, &self.validation(*algorithm)).map_err(|err| {
            debug!(error = %err, "identity token rejected");
            IdentityVerificationError::rejected(err.to_string())
        })?;
        Ok(data.claims.into_identity())
    }
}
