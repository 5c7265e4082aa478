//! Identity-token verification adapters.

mod jwt;

pub use jwt::{JwtIdentityConfig, JwtIdentityVerifier};
