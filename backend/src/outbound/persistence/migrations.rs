//! Embedded schema migrations.
//!
//! `diesel_migrations` needs a synchronous connection, so the harness runs
//! on the blocking pool.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures while applying migrations at start-up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to connect for migrations: {message}")]
    Connect { message: String },
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    #[error("migration task aborted: {message}")]
    Join { message: String },
}

/// Apply pending migrations and return how many ran.
///
/// # Errors
/// See [`MigrationError`].
pub async fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let database_url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || {
        let mut conn =
            PgConnection::establish(&database_url).map_err(|err| MigrationError::Connect {
                message: err.to_string(),
            })?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.len())
            .map_err(|err| MigrationError::Apply {
                message: err.to_string(),
            })
    })
    .await
    .map_err(|err| MigrationError::Join {
        message: err.to_string(),
    })??;
    info!(applied, "database migrations complete");
    Ok(applied)
}
