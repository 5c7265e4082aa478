//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer. Request and
//! response schemas referenced by those paths are collected automatically;
//! the shared [`Error`] body is listed explicitly.
//!
//! The generated specification is served by Swagger UI at `/docs` in debug
//! builds and exported via `cargo run --bin openapi-dump`.

use crate::domain::{Error, Role, SideEffectStatus};
use crate::inbound::http;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Identity Platform ID token."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dealroom backend API",
        description = "Startup onboarding, deal notes, and investor tooling."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        http::health::health,
        http::health::ready,
        http::health::live,
        http::auth::register,
        http::auth::login,
        http::auth::me,
        http::users::create_user,
        http::users::list_users,
        http::users::get_user,
        http::users::update_user,
        http::companies::list_companies,
        http::companies::get_company,
        http::startups::upload_pitch,
        http::startups::startup_pitch_deck,
        http::startups::generate_questionnaire,
        http::startups::startup_questionnaire,
        http::startups::save_answers,
        http::startups::generate_deal_note,
        http::startups::startup_deal_note,
        http::startups::list_startup_deal_notes,
        http::startups::get_startup_deal_note,
        http::startups::upload_real_deal_note,
        http::startups::schedule_startup_call,
        http::startups::startup_scheduled_calls,
        http::startups::create_startup_profile,
        http::startups::get_startup_profile,
        http::startups::startup_summary,
        http::startups::startup_status,
        http::startups::startup_notes,
        http::startup_analyst::trigger_after_call,
        http::startup_analyst::analysis_status,
        http::deal_notes::create_deal_note,
        http::deal_notes::list_deal_notes,
        http::deal_notes::deal_note_for_startup,
        http::deal_notes::get_deal_note,
        http::questionnaires::generate_questionnaire,
        http::questionnaires::create_questionnaire,
        http::questionnaires::questionnaire_for_startup,
        http::questionnaires::get_questionnaire,
        http::questionnaires::submit_answers,
        http::scheduler::available_slots,
        http::scheduler::schedule_call,
        http::scheduler::calls_for_startup,
        http::files::download_url,
        http::files::pitch_deck_info,
        http::events::pubsub_push,
        http::uploads::issue_pitch_upload,
        http::uploads::confirm_upload,
        http::rag::search,
        http::rag::get_deal_note,
        http::agents::run_ingestion,
        http::agents::run_deep_research,
        http::agents::run_deal_scoring,
        http::agents::run_full_analysis,
        http::agents::run_questionnaire,
        http::agents::run_questionnaire_assist,
        http::agents::run_deal_screener,
        http::agents::run_deep_dive,
        http::agents::run_questionnaire_chat,
        http::final_notes::generate_final_note,
        http::final_notes::final_note_for_startup,
        http::final_notes::get_final_note,
        http::notes::notes_for_startup,
        http::notes::get_note,
        http::pitch_decks::create_pitch_deck,
        http::pitch_decks::pitch_deck_for_startup,
        http::pitch_decks::get_pitch_deck,
    ),
    components(schemas(Error, Role, SideEffectStatus)),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User directory"),
        (name = "companies", description = "Investor view of startups"),
        (name = "startups", description = "Founder onboarding flow"),
        (name = "startup-analyst", description = "Post-call analysis and status"),
        (name = "deal-notes", description = "Deal note storage"),
        (name = "questionnaires", description = "Founder questionnaires"),
        (name = "scheduler", description = "Founder call scheduling"),
        (name = "files", description = "Pitch deck downloads"),
        (name = "events", description = "Pub/Sub push delivery"),
        (name = "uploads", description = "Two-phase pitch uploads"),
        (name = "rag", description = "Deal note search"),
        (name = "agents", description = "Direct agent invocations"),
        (name = "final-notes", description = "Final investment notes"),
        (name = "notes", description = "Analyst notes"),
        (name = "pitch-decks", description = "Pitch deck metadata")
    )
)]
pub struct ApiDoc;
