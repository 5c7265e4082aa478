//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly.

diesel::table! {
    /// Every collection shares one table keyed by `(collection, id)`.
    documents (collection, id) {
        /// Collection name, see `Collection::name`.
        collection -> Text,
        /// Opaque document identifier.
        id -> Text,
        /// JSON body.
        data -> Jsonb,
        /// Last write.
        updated_at -> Timestamptz,
    }
}
