//! Domain entities, ports and services.
//!
//! Services own every document-store write and depend only on the traits in
//! [`ports`]. Inbound adapters call services; outbound adapters implement
//! ports. Nothing in this module knows about HTTP.

pub mod analyst_service;
pub mod chatbot_service;
pub mod company;
pub mod deal_note;
pub mod error;
pub mod final_note;
pub mod founder_answers;
pub mod gcs_uri;
pub mod identity;
pub mod ingestion_events;
pub mod json_path;
pub mod pitch_deck;
pub mod ports;
pub mod questionnaire;
pub mod rag;
pub mod scheduler;
pub(crate) mod service_support;
pub mod side_effect;
pub mod startup_flow;
pub mod startup_profile;
pub mod timestamp;
pub mod trace_id;
pub mod upload;
pub mod user;

pub use self::analyst_service::AnalystService;
pub use self::chatbot_service::{ChatReply, ChatbotService};
pub use self::company::{Company, CompanyService};
pub use self::deal_note::{
    AfterCallForm, AfterCallRun, AnalysedStartup, AnalysisStatus, CreatedDealNote, DealNoteForm,
    DealNoteOutcome, DealNoteService, GeneratedDealNote, PendingStartup, ProfileProjection,
    fallback_deal_note,
};
pub use self::error::{Error, ErrorKind, INTERNAL_ERROR_CODE};
pub use self::final_note::{FinalNoteForm, FinalNoteService};
pub use self::founder_answers::{AnswerEntry, FounderAnswers, entries_from_value, load_answers};
pub use self::gcs_uri::GcsUri;
pub use self::identity::{AuthenticatedUser, Role, UnknownRole};
pub use self::ingestion_events::{EventOutcome, IngestionEventService, PushEnvelope, PushMessage};
pub use self::pitch_deck::{
    DEFAULT_DECK_CONTENT_TYPE, NewPitchDeck, PitchDeck, PitchDeckForm, PitchDeckService,
};
pub use self::questionnaire::{
    GeneratedQuestionnaire, NewQuestionnaire, Questionnaire, QuestionnaireService, SavedAnswers,
};
pub use self::rag::{RagFilters, RagHit, RagSearchForm, RagSearchResult, RagService};
pub use self::scheduler::{ScheduleCallForm, ScheduledCall, SchedulerService};
pub use self::side_effect::SideEffectStatus;
pub use self::startup_flow::{PitchUploadOutcome, StartupFlowService};
pub use self::startup_profile::{StartupProfileForm, StartupProfileService, slugify};
pub use self::timestamp::{format_timestamp, now_timestamp};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::upload::{IssuedUpload, PitchDeckDownload, PitchUploadForm, UploadService};
pub use self::user::{LoginForm, NewUser, UserForm, UserService, current_user_stub, public_user};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use dealroom::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("deal_note_not_found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
