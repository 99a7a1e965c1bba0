use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Duplicate value: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the application's connection pool and answers health probes
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create a pool that connects on first use, so the server can start
    /// (and report degraded health) while the database is unreachable.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy(url)?;

        info!("Created database pool (max_connections={})", config.max_connections);
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> Result<String, DatabaseError> {
        if !Self::is_valid_identifier(name) {
            return Err(DatabaseError::InvalidIdentifier(name.to_string()));
        }
        Ok(format!("\"{}\"", name))
    }

    /// Identifiers are lowercase snake_case: [a-z_][a-z0-9_]*
    pub fn is_valid_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_identifiers() {
        assert!(DatabaseManager::is_valid_identifier("products"));
        assert!(DatabaseManager::is_valid_identifier("order_items"));
        assert!(DatabaseManager::is_valid_identifier("_private2"));
        assert!(!DatabaseManager::is_valid_identifier("Products"));
        assert!(!DatabaseManager::is_valid_identifier("2fa"));
        assert!(!DatabaseManager::is_valid_identifier("users; DROP TABLE users"));
        assert!(!DatabaseManager::is_valid_identifier(""));
    }

    #[test]
    fn quotes_valid_identifiers_only() {
        assert_eq!(DatabaseManager::quote_identifier("users").unwrap(), "\"users\"");
        assert!(matches!(
            DatabaseManager::quote_identifier("users\""),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn lazy_pool_requires_url() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
        };
        assert!(matches!(
            DatabaseManager::connect_lazy(&config),
            Err(DatabaseError::ConfigMissing("DATABASE_URL"))
        ));
    }
}
