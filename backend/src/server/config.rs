//! HTTP server configuration object and helpers.

use dealroom::outbound::persistence::DbPool;
use dealroom::settings::AppSettings;
use std::net::SocketAddr;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) settings: AppSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from loaded settings.
    #[must_use]
    pub fn new(settings: AppSettings, bind_addr: SocketAddr) -> Self {
        Self {
            settings,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, documents persist in PostgreSQL instead of memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
