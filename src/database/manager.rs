use std::time::Duration;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{ConnectOptions, Connection, PgConnection};
use thiserror::Error;
use tracing::debug;

use crate::config::{self, DatabaseConfig};
use crate::error::ApiError;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection timed out after {0}s")]
    ConnectionTimeout(u64),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens one PostgreSQL connection per unit of work. There is no pool:
/// a connection lives exactly as long as the request that opened it.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a fresh connection using the global configuration
    pub async fn connect() -> Result<PgConnection, DatabaseError> {
        Self::connect_with(&config::config().database).await
    }

    pub async fn connect_with(db_config: &DatabaseConfig) -> Result<PgConnection, DatabaseError> {
        let options = Self::connect_options(db_config)?;
        let timeout = Duration::from_secs(db_config.connect_timeout_secs);

        let conn = tokio::time::timeout(timeout, PgConnection::connect_with(&options))
            .await
            .map_err(|_| DatabaseError::ConnectionTimeout(db_config.connect_timeout_secs))??;

        debug!("Opened database connection to {}", db_config.database);
        Ok(conn)
    }

    fn connect_options(db_config: &DatabaseConfig) -> Result<PgConnectOptions, DatabaseError> {
        let connection_string = Self::build_connection_string(db_config)?;
        let mut options: PgConnectOptions = connection_string
            .parse()
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        if db_config.require_tls {
            options = options.ssl_mode(PgSslMode::Require);
        }
        if !db_config.enable_query_logging {
            options = options.disable_statement_logging();
        }
        Ok(options)
    }

    /// Use DATABASE_URL when given, otherwise assemble one from the individual parts
    fn build_connection_string(db_config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = &db_config.url {
            url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
            return Ok(url.clone());
        }

        if db_config.host.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_HOST"));
        }
        if db_config.database.is_empty() {
            return Err(DatabaseError::ConfigMissing("DB_NAME"));
        }

        let mut url = url::Url::parse("postgres://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(&db_config.host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(db_config.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_username(&db_config.username).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !db_config.password.is_empty() {
            url.set_password(Some(&db_config.password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", db_config.database));
        Ok(url.into())
    }

    /// Opens a connection and runs a trivial query
    pub async fn health_check() -> Result<(), DatabaseError> {
        let mut conn = Self::connect().await?;
        sqlx::query("SELECT 1").execute(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }

    /// Apply the embedded schema migrations
    pub async fn migrate() -> Result<(), DatabaseError> {
        let mut conn = Self::connect().await?;
        sqlx::migrate!("./migrations").run(&mut conn).await?;
        conn.close().await?;
        Ok(())
    }
}

/// Per-request database connection. Dropped (and therefore closed) when the
/// handler returns, whether it succeeded or not.
pub struct DbConn(pub PgConnection);

#[async_trait]
impl<S> FromRequestParts<S> for DbConn
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(DbConn(DatabaseManager::connect().await?))
    }
}
