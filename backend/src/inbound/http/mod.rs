//! HTTP inbound adapter exposing the REST API.
//!
//! Each resource module owns a `configure` function registering its scope;
//! [`configure_routes`] assembles them into the served route tree.

use actix_web::web;

use crate::domain::Role;
use crate::middleware::{Authenticate, RequireRole};

pub mod agents;
pub mod auth;
pub mod companies;
pub mod deal_notes;
pub mod error;
pub mod events;
pub mod files;
pub mod final_notes;
pub mod health;
pub mod notes;
pub mod pitch_decks;
pub mod questionnaires;
pub mod rag;
pub mod scheduler;
pub mod startup_analyst;
pub mod startups;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;

/// Register the full route tree.
///
/// Health, auth, and the Pub/Sub push endpoint stay public. Everything else
/// under `/v1` passes through `authenticate`; companies and RAG additionally
/// require the investor role.
pub fn configure_routes(cfg: &mut web::ServiceConfig, authenticate: Authenticate) {
    cfg.route("/health", web::get().to(health::health))
        .route("/v1/health", web::get().to(health::health))
        .service(health::ready)
        .service(health::live)
        .service(
            web::scope("/v1/auth")
                .service(auth::register)
                .service(auth::login)
                .service(auth::me),
        )
        .service(web::scope("/v1/events").service(events::pubsub_push))
        .service(
            web::scope("/v1")
                .wrap(authenticate)
                .service(
                    web::scope("/companies")
                        .wrap(RequireRole::new(Role::Investor))
                        .service(companies::list_companies)
                        .service(companies::get_company),
                )
                .service(
                    web::scope("/rag")
                        .wrap(RequireRole::new(Role::Investor))
                        .service(rag::search)
                        .service(rag::get_deal_note),
                )
                .configure(users::configure)
                .configure(startups::configure)
                .configure(startup_analyst::configure)
                .configure(deal_notes::configure)
                .configure(questionnaires::configure)
                .configure(scheduler::configure)
                .configure(files::configure)
                .configure(uploads::configure)
                .configure(agents::configure)
                .configure(final_notes::configure)
                .configure(notes::configure)
                .configure(pitch_decks::configure),
        );
}
