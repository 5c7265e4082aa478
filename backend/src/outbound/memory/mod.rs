//! In-process adapters used when no database is configured and in tests.

mod document_store;

pub use document_store::InMemoryDocumentStore;
