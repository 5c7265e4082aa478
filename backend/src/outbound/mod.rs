//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL JSONB document store using Diesel
//! - **memory**: in-process document store
//! - **storage**: Cloud Storage signed URLs
//! - **pubsub**: event publishing
//! - **identity**: bearer token verification
//! - **password**: password hashing
//! - **agents**: analyst, questionnaire and chatbot strategies
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod agents;
pub mod identity;
pub mod memory;
pub mod password;
pub mod persistence;
pub mod pubsub;
pub mod storage;
