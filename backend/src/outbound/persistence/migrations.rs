//! Embedded database migrations.
//!
//! Migrations are compiled into the binary and applied at startup so a fresh
//! database reaches the expected schema without external tooling.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying embedded migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open a connection to run migrations over.
    #[error("failed to connect for migrations: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// A migration failed part way through.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
}

/// Apply any pending migrations against the given database.
///
/// Runs over a dedicated synchronous connection; call from a blocking
/// context (for example `tokio::task::spawn_blocking`) during startup.
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    Ok(())
}
