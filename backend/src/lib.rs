//! Dealroom backend library modules.
//!
//! Hexagonal layout: [`domain`] holds services and ports, [`inbound`] the
//! HTTP adapter, and [`outbound`] the infrastructure adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
