//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `DEALROOM_*` environment variables, CLI flags, or an
//! optional config file. Every field is optional; accessors apply defaults.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

pub const DEFAULT_PROJECT_ID: &str = "startup-analyst-dev-f6c623";
pub const DEFAULT_AGENT_BASE_URL: &str = "mock";
pub const DEFAULT_GCS_BUCKET: &str = "startup-analyst-uploads";
pub const DEFAULT_INGESTION_TOPIC: &str = "startup-analyst-ingestion";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_AGENT_TIMEOUT_SECS: u64 = 30;

/// Configuration read once at start-up.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEALROOM")]
pub struct AppSettings {
    /// Cloud project owning storage, Pub/Sub, and identity tokens.
    pub project_id: Option<String>,
    /// Analyst and questionnaire agent server; `mock` selects local agents.
    pub agent_base_url: Option<String>,
    /// Chatbot agent server; `mock` selects the local chatbot.
    pub chatbot_base_url: Option<String>,
    /// Upload bucket. An empty value disables signed uploads.
    pub gcs_bucket: Option<String>,
    pub pubsub_topic_ingestion: Option<String>,
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; unset keeps documents in memory.
    pub database_url: Option<String>,
    pub db_max_connections: Option<u32>,
    pub agent_timeout_secs: Option<u64>,
    /// Accept `x-debug-role`/`x-debug-startup-id` headers in place of tokens.
    #[ortho_config(default = false)]
    pub auth_dev_headers: bool,
    pub identity_jwt_secret: Option<String>,
    pub identity_public_key_path: Option<PathBuf>,
    pub gcs_hmac_access_id: Option<String>,
    pub gcs_hmac_secret: Option<String>,
    pub storage_host: Option<String>,
    /// `host:port` of a Pub/Sub emulator.
    pub pubsub_emulator_host: Option<String>,
    pub pubsub_access_token: Option<String>,
}

fn redacted(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| "<redacted>")
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("project_id", &self.project_id)
            .field("agent_base_url", &self.agent_base_url)
            .field("chatbot_base_url", &self.chatbot_base_url)
            .field("gcs_bucket", &self.gcs_bucket)
            .field("pubsub_topic_ingestion", &self.pubsub_topic_ingestion)
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &redacted(&self.database_url))
            .field("db_max_connections", &self.db_max_connections)
            .field("agent_timeout_secs", &self.agent_timeout_secs)
            .field("auth_dev_headers", &self.auth_dev_headers)
            .field("identity_jwt_secret", &redacted(&self.identity_jwt_secret))
            .field("identity_public_key_path", &self.identity_public_key_path)
            .field("gcs_hmac_access_id", &self.gcs_hmac_access_id)
            .field("gcs_hmac_secret", &redacted(&self.gcs_hmac_secret))
            .field("storage_host", &self.storage_host)
            .field("pubsub_emulator_host", &self.pubsub_emulator_host)
            .field("pubsub_access_token", &redacted(&self.pubsub_access_token))
            .finish()
    }
}

impl AppSettings {
    pub fn project_id(&self) -> &str {
        self.project_id.as_deref().unwrap_or(DEFAULT_PROJECT_ID)
    }

    pub fn agent_base_url(&self) -> &str {
        self.agent_base_url
            .as_deref()
            .unwrap_or(DEFAULT_AGENT_BASE_URL)
    }

    pub fn chatbot_base_url(&self) -> &str {
        self.chatbot_base_url
            .as_deref()
            .unwrap_or(DEFAULT_AGENT_BASE_URL)
    }

    /// Configured bucket, or `None` when explicitly set to an empty string.
    pub fn gcs_bucket(&self) -> Option<&str> {
        match self.gcs_bucket.as_deref() {
            None => Some(DEFAULT_GCS_BUCKET),
            Some(bucket) if bucket.trim().is_empty() => None,
            Some(bucket) => Some(bucket),
        }
    }

    pub fn pubsub_topic_ingestion(&self) -> &str {
        self.pubsub_topic_ingestion
            .as_deref()
            .unwrap_or(DEFAULT_INGESTION_TOPIC)
    }

    /// Listen address.
    ///
    /// # Errors
    /// Returns an error when the configured value is not `ip:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(
            self.agent_timeout_secs
                .unwrap_or(DEFAULT_AGENT_TIMEOUT_SECS),
        )
    }
}
