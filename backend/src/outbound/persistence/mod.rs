//! PostgreSQL persistence adapter.
//!
//! Documents are stored as JSONB rows in a single table. Connections come
//! from a `bb8` pool of `diesel-async` connections, and the schema is kept
//! current by embedded migrations applied at start-up.

mod diesel_basic_error_mapping;
mod diesel_document_store;
mod migrations;
mod pool;
mod schema;

pub use diesel_document_store::DieselDocumentStore;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
