//! Object storage adapters.

mod gcs;

pub use gcs::{DEFAULT_STORAGE_HOST, GcsSigner, GcsSignerConfig};
