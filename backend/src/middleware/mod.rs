//! Request middleware.
//!
//! Tracing wraps the whole application. Authentication and role gating wrap
//! the `/v1` scopes that need an identity.

pub mod auth;
pub mod trace;

pub use auth::{Authenticate, RequireRole};
pub use trace::Trace;
