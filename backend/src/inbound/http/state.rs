//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain services, which in turn depend only on ports.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AnalystAgent, ChatbotAgent, DocumentStore, EventPublisher, ObjectStorage, PasswordHasher,
    QuestionnaireAgent,
};
use crate::domain::{
    AnalystService, ChatbotService, CompanyService, DealNoteService, FinalNoteService,
    IngestionEventService, PitchDeckService, QuestionnaireService, RagService, SchedulerService,
    StartupFlowService, StartupProfileService, UploadService, UserService,
};

/// Parameter object bundling every port implementation.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub store: Arc<dyn DocumentStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub publisher: Arc<dyn EventPublisher>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub analyst: Arc<dyn AnalystAgent>,
    pub questionnaire: Arc<dyn QuestionnaireAgent>,
    pub chatbot: Arc<dyn ChatbotAgent>,
    pub clock: Arc<dyn Clock>,
}

/// Deployment values the services need.
#[derive(Debug, Clone, Default)]
pub struct HttpStateOptions {
    /// Upload bucket; `None` or empty disables signed uploads.
    pub gcs_bucket: Option<String>,
    /// Topic receiving upload confirmations.
    pub ingestion_topic: String,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<UserService>,
    pub companies: Arc<CompanyService>,
    pub startup_profiles: Arc<StartupProfileService>,
    pub pitch_decks: Arc<PitchDeckService>,
    pub questionnaires: Arc<QuestionnaireService>,
    pub startup_flow: Arc<StartupFlowService>,
    pub deal_notes: Arc<DealNoteService>,
    pub final_notes: Arc<FinalNoteService>,
    pub scheduler: Arc<SchedulerService>,
    pub uploads: Arc<UploadService>,
    pub events: Arc<IngestionEventService>,
    pub rag: Arc<RagService>,
    pub analyst: Arc<AnalystService>,
    pub chatbot: Arc<ChatbotService>,
}

impl HttpState {
    /// Wire every domain service over `ports`.
    pub fn new(ports: HttpStatePorts, options: HttpStateOptions) -> Self {
        let HttpStatePorts {
            store,
            storage,
            publisher,
            hasher,
            analyst,
            questionnaire,
            chatbot,
            clock,
        } = ports;

        let pitch_decks = Arc::new(PitchDeckService::new(store.clone(), clock.clone()));
        let questionnaires = Arc::new(QuestionnaireService::new(
            store.clone(),
            questionnaire,
            clock.clone(),
        ));
        let deal_notes = Arc::new(DealNoteService::new(
            store.clone(),
            analyst.clone(),
            pitch_decks.clone(),
            questionnaires.clone(),
            clock.clone(),
        ));
        let uploads = Arc::new(
            UploadService::new(
                store.clone(),
                storage,
                publisher,
                pitch_decks.clone(),
                clock.clone(),
            )
            .with_bucket(options.gcs_bucket)
            .with_topic(options.ingestion_topic),
        );

        Self {
            users: Arc::new(UserService::new(store.clone(), hasher, clock.clone())),
            companies: Arc::new(CompanyService::new(store.clone())),
            startup_profiles: Arc::new(StartupProfileService::new(store.clone(), clock.clone())),
            startup_flow: Arc::new(StartupFlowService::new(
                pitch_decks.clone(),
                questionnaires.clone(),
            )),
            final_notes: Arc::new(FinalNoteService::new(store.clone(), clock.clone())),
            scheduler: Arc::new(SchedulerService::new(store.clone(), clock.clone())),
            events: Arc::new(IngestionEventService::new(store.clone(), clock.clone())),
            rag: Arc::new(RagService::new(store.clone())),
            analyst: Arc::new(AnalystService::new(store.clone(), analyst, clock.clone())),
            chatbot: Arc::new(ChatbotService::new(store, chatbot, clock)),
            pitch_decks,
            questionnaires,
            deal_notes,
            uploads,
        }
    }
}
