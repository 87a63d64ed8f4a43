//! Embedded schema migrations, applied at startup.
//!
//! `diesel_migrations` drives a synchronous [`PgConnection`], so the run
//! happens on Tokio's blocking pool.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while bringing the schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The migration connection could not be opened.
    #[error("failed to connect for migrations: {message}")]
    Connection { message: String },
    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply { message: String },
    /// The blocking task panicked or was cancelled.
    #[error("migration task aborted: {message}")]
    Aborted { message: String },
}

impl MigrationError {
    fn connection(error: impl std::fmt::Display) -> Self {
        Self::Connection {
            message: error.to_string(),
        }
    }

    fn apply(error: impl std::fmt::Display) -> Self {
        Self::Apply {
            message: error.to_string(),
        }
    }

    fn aborted(error: impl std::fmt::Display) -> Self {
        Self::Aborted {
            message: error.to_string(),
        }
    }
}

fn apply_pending(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut connection =
        PgConnection::establish(database_url).map_err(MigrationError::connection)?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(MigrationError::apply)?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply every pending migration and return the applied versions.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails; failed migrations roll back.
pub async fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply_pending(&url))
        .await
        .map_err(MigrationError::aborted)??;
    if applied.is_empty() {
        info!("database schema is up to date");
    } else {
        info!(versions = ?applied, "applied database migrations");
    }
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use diesel::migration::MigrationSource;
    use diesel::pg::Pg;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn the_schema_migration_is_embedded() {
        let migrations = <EmbeddedMigrations as MigrationSource<Pg>>::migrations(&MIGRATIONS)
            .expect("embedded migrations load");
        assert_eq!(migrations.len(), 1);
    }

    #[rstest]
    fn unreachable_databases_fail_to_connect() {
        let error = apply_pending("not a url").expect_err("invalid url");
        assert!(matches!(error, MigrationError::Connection { .. }));
    }
}
