//! Database provider selection and connection management.
//!
//! The backend is chosen by [`Provider`]; only SQLite is implemented. The
//! other variants exist so configuration can name them, and the factory
//! rejects them with a clear error instead of a partial implementation.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, instrument};

use crate::db::DbError;

/// Migrations compiled into the binary so deployments need no migration
/// directory on disk.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database backend selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Embedded SQLite database (the only implemented backend).
    #[default]
    Sqlite,
    /// PostgreSQL (unimplemented).
    Postgres,
    /// DynamoDB (unimplemented).
    Dynamo,
}

/// Handle to the configured database.
///
/// Connections are established per operation; there is no pool and no shared
/// connection state.
#[derive(Debug, Clone)]
pub struct Database {
    provider: Provider,
    path: String,
}

impl Database {
    /// Opens a database handle for the given provider and path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the provider has no implementation.
    #[instrument(skip(path), fields(path = %path.as_ref()))]
    pub fn open(provider: Provider, path: impl AsRef<str>) -> Result<Self, DbError> {
        match provider {
            Provider::Sqlite => {
                info!(provider = %provider, path = %path.as_ref(), "Opening database");
                Ok(Self {
                    provider,
                    path: path.as_ref().to_string(),
                })
            }
            Provider::Postgres | Provider::Dynamo => Err(DbError::new(format!(
                "Provider '{provider}' is not implemented; only 'sqlite' is supported"
            ))),
        }
    }

    /// Opens a SQLite database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    pub fn sqlite(path: impl AsRef<str>) -> Result<Self, DbError> {
        Self::open(Provider::Sqlite, path)
    }

    /// The provider this handle was opened with.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// The database file path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Establishes a database connection.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection cannot be established.
    #[instrument(skip(self))]
    pub fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.path, "Establishing connection");
        SqliteConnection::establish(&self.path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.path, e)))
    }

    /// Applies any pending embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_provider_opens() {
        let db = Database::open(Provider::Sqlite, ":memory:").expect("Open failed");
        assert_eq!(db.provider(), Provider::Sqlite);
        assert_eq!(db.path(), ":memory:");
    }

    #[test]
    fn unimplemented_providers_are_rejected() {
        assert!(Database::open(Provider::Postgres, "ignored").is_err());
        assert!(Database::open(Provider::Dynamo, "ignored").is_err());
    }

    #[test]
    fn provider_parses_from_config_strings() {
        use std::str::FromStr;
        assert_eq!(Provider::from_str("sqlite").unwrap(), Provider::Sqlite);
        assert_eq!(Provider::from_str("postgres").unwrap(), Provider::Postgres);
        assert!(Provider::from_str("oracle").is_err());
    }
}
