//! Builders turning [`AppSettings`] into port adapters and HTTP state.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use dealroom::domain::ports::{DocumentStore, EventPublisher, IdentityVerifier};
use dealroom::inbound::http::state::{HttpState, HttpStateOptions, HttpStatePorts};
use dealroom::middleware::Authenticate;
use dealroom::outbound::agents::{
    AgentSetupError, build_analyst_agent, build_chatbot_agent, build_questionnaire_agent,
};
use dealroom::outbound::identity::{JwtIdentityConfig, JwtIdentityVerifier};
use dealroom::outbound::memory::InMemoryDocumentStore;
use dealroom::outbound::password::Argon2PasswordHasher;
use dealroom::outbound::persistence::DieselDocumentStore;
use dealroom::outbound::pubsub::{InMemoryEventPublisher, PubSubConfig, PubSubPublisher};
use dealroom::outbound::storage::{GcsSigner, GcsSignerConfig};
use dealroom::settings::AppSettings;

use super::ServerConfig;

const PUBSUB_TIMEOUT: Duration = Duration::from_secs(10);

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).cloned()
}

fn build_store(config: &ServerConfig) -> Arc<dyn DocumentStore> {
    match &config.db_pool {
        Some(pool) => Arc::new(DieselDocumentStore::new(pool.clone())),
        None => {
            warn!("no database configured; documents are kept in memory");
            Arc::new(InMemoryDocumentStore::new())
        }
    }
}

fn build_publisher(settings: &AppSettings) -> std::io::Result<Arc<dyn EventPublisher>> {
    let emulator_host = non_empty(settings.pubsub_emulator_host.as_ref());
    let access_token = non_empty(settings.pubsub_access_token.as_ref());
    if emulator_host.is_none() && access_token.is_none() {
        warn!("no pub/sub credentials configured; events are recorded in memory");
        return Ok(Arc::new(InMemoryEventPublisher::new()));
    }
    let publisher = PubSubPublisher::new(PubSubConfig {
        project_id: settings.project_id().to_owned(),
        emulator_host,
        access_token: access_token.map(Zeroizing::new),
        timeout: PUBSUB_TIMEOUT,
    })
    .map_err(|e| std::io::Error::other(format!("pub/sub client setup failed: {e}")))?;
    Ok(Arc::new(publisher))
}

/// Identity verifier from the configured key material.
///
/// # Errors
/// Returns an error when the public key file cannot be read or parsed.
pub(super) fn build_identity_verifier(
    settings: &AppSettings,
) -> std::io::Result<Arc<dyn IdentityVerifier>> {
    let public_key_pem = settings
        .identity_public_key_path
        .as_ref()
        .map(|path| {
            std::fs::read_to_string(path).map_err(|e| {
                std::io::Error::other(format!(
                    "failed to read identity public key at {}: {e}",
                    path.display()
                ))
            })
        })
        .transpose()?;
    let verifier = JwtIdentityVerifier::new(JwtIdentityConfig {
        project_id: settings.project_id().to_owned(),
        public_key_pem,
        shared_secret: non_empty(settings.identity_jwt_secret.as_ref()).map(Zeroizing::new),
    })
    .map_err(|e| std::io::Error::other(format!("invalid identity public key: {e}")))?;
    Ok(Arc::new(verifier))
}

/// Authentication middleware for the `/v1` scope.
pub(super) fn build_authenticate(config: &ServerConfig) -> std::io::Result<Authenticate> {
    let settings = &config.settings;
    if settings.auth_dev_headers {
        warn!("development identity headers are accepted");
    }
    Ok(Authenticate::new(build_identity_verifier(settings)?)
        .with_dev_headers(settings.auth_dev_headers))
}

/// Build the shared HTTP state from configured adapters.
///
/// # Errors
/// Returns an error when an agent or publisher client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let settings = &config.settings;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let timeout = settings.agent_timeout();
    let agent_error = |e: AgentSetupError| std::io::Error::other(format!("agent setup failed: {e}"));

    let storage = GcsSigner::new(
        GcsSignerConfig {
            access_id: non_empty(settings.gcs_hmac_access_id.as_ref()),
            secret: non_empty(settings.gcs_hmac_secret.as_ref()).map(Zeroizing::new),
            host: non_empty(settings.storage_host.as_ref()),
        },
        clock.clone(),
    );

    let ports = HttpStatePorts {
        store: build_store(config),
        storage: Arc::new(storage),
        publisher: build_publisher(settings)?,
        hasher: Arc::new(Argon2PasswordHasher::new()),
        analyst: build_analyst_agent(settings.agent_base_url(), timeout).map_err(agent_error)?,
        questionnaire: build_questionnaire_agent(settings.agent_base_url(), timeout)
            .map_err(agent_error)?,
        chatbot: build_chatbot_agent(settings.chatbot_base_url(), timeout)
            .map_err(agent_error)?,
        clock,
    };
    let options = HttpStateOptions {
        gcs_bucket: settings.gcs_bucket().map(str::to_owned),
        ingestion_topic: settings.pubsub_topic_ingestion().to_owned(),
    };
    info!(
        project_id = settings.project_id(),
        bucket = ?options.gcs_bucket,
        topic = %options.ingestion_topic,
        "http state assembled"
    );
    Ok(HttpState::new(ports, options))
}
