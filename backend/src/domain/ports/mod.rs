//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod agent_error;
mod analyst_agent;
mod chatbot_agent;
mod document_store;
mod event_publisher;
mod identity_verifier;
mod object_storage;
mod password_hasher;
mod questionnaire_agent;

pub use agent_error::AgentError;
#[cfg(test)]
pub use analyst_agent::MockAnalystAgent;
pub use analyst_agent::{
    AnalysedDealNote, AnalystAgent, FullAnalysisRequest, IngestedNote, IngestionRequest,
    NoteProvenance,
};
pub use chatbot_agent::ChatbotAgent;
#[cfg(test)]
pub use chatbot_agent::MockChatbotAgent;
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    Collection, Document, DocumentData, DocumentQuery, DocumentStore, DocumentStoreError,
    FieldFilter, FilterOp, OrderBy, SortDirection, Stored, to_document_data,
};
pub use event_publisher::{EventPublisher, EventPublisherError};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use identity_verifier::{IdentityVerificationError, IdentityVerifier, VerifiedIdentity};
#[cfg(test)]
pub use identity_verifier::MockIdentityVerifier;
#[cfg(test)]
pub use object_storage::MockObjectStorage;
pub use object_storage::{
    ObjectStorage, ObjectStorageError, SignedUrl, SignedUrlMethod, SignedUrlRequest,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use questionnaire_agent::MockQuestionnaireAgent;
pub use questionnaire_agent::{QuestionnaireAgent, QuestionnaireContext};
