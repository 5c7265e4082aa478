//! Backend entry-point: loads settings, prepares persistence, and serves the
//! REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dealroom::inbound::http::health::HealthState;
use dealroom::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use dealroom::settings::AppSettings;
use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;

    let mut config = ServerConfig::new(settings.clone(), bind_addr);
    if let Some(database_url) = settings.database_url() {
        let applied = run_migrations(database_url)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        info!(applied, "database migrations complete");
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting dealroom backend");
    create_server(health_state, config)?.await
}
