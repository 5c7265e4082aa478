//! Resolved caller identity and roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Founder account.
    Startup,
    /// Investor account.
    Investor,
}

impl Role {
    /// Wire spelling.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Investor => "investor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "startup" => Ok(Self::Startup),
            "investor" => Ok(Self::Investor),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Identity attached to a request by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject identifier.
    pub uid: String,
    /// Email, when known.
    pub email: Option<String>,
    /// Role claims. Unknown roles are kept verbatim.
    pub roles: Vec<String>,
    /// Startup the caller acts for, when known.
    pub startup_id: Option<String>,
}

impl AuthenticatedUser {
    /// Fixed development identity built from trusted debug headers.
    pub fn development(roles: Vec<String>, startup_id: Option<String>) -> Self {
        Self {
            uid: "debug-user".to_owned(),
            email: Some("debug@example.com".to_owned()),
            roles,
            startup_id,
        }
    }

    /// Set-membership check against the role list.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|candidate| candidate == role.as_str())
    }
}
