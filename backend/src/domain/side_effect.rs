//! Outcome of best-effort secondary writes.
//!
//! Profile syncs and transcript logging must never fail the primary
//! operation. Their outcome is returned alongside the primary result so
//! callers and tests can observe it.

use std::fmt::Display;

use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

/// Result of a best-effort side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SideEffectStatus {
    /// The write happened.
    Applied,
    /// There was nothing to write.
    Skipped,
    /// The write failed; the reason was logged.
    Failed {
        /// Failure description.
        reason: String,
    },
}

impl SideEffectStatus {
    /// Convert a secondary write outcome, logging failures at `warn`.
    pub fn from_result<E: Display>(effect: &'static str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Applied,
            Err(err) => {
                warn!(effect, error = %err, "best-effort write failed");
                Self::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Combine two outcomes; the first failure wins.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (failed @ Self::Failed { .. }, _) | (_, failed @ Self::Failed { .. }) => failed,
            (Self::Skipped, Self::Skipped) => Self::Skipped,
            _ => Self::Applied,
        }
    }

    /// Whether the write failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
