//! Driven port verifying bearer identity tokens.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while verifying identity tokens.
    pub enum IdentityVerificationError {
        /// No verification key is configured.
        NotConfigured => "identity verification is not configured",
        /// The token is malformed, expired, or carries a bad signature.
        Rejected { message: String } => "identity token rejected: {message}",
    }
}

/// Identity resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Subject identifier.
    pub uid: String,
    /// Email claim, when present.
    pub email: Option<String>,
    /// Role claims.
    pub roles: Vec<String>,
    /// Startup the subject acts for, when present.
    pub startup_id: Option<String>,
}

/// Driven port for token verification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and resolve the identity it carries.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityVerificationError>;
}
