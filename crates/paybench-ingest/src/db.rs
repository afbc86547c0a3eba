//! Database connection setup

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default TLS mode; the hosted Postgres instance refuses plaintext connections.
pub const DEFAULT_SSL_MODE: &str = "require";

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

/// Default maximum pool size. The jobs are sequential, so one or two suffice.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 2;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL or the DB_* settings.")]
    Config(String),
}

impl DbError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Where to connect: a full URL or discrete parts
#[derive(Clone)]
pub enum DbTarget {
    Url(String),
    Parts {
        host: String,
        port: u16,
        database: String,
        username: String,
        password: String,
    },
}

impl std::fmt::Debug for DbTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbTarget::Url(_) => f.write_str("Url(<redacted>)"),
            DbTarget::Parts {
                host,
                port,
                database,
                username,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub target: DbTarget,
    pub ssl_mode: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            target: DbTarget::Url(url.into()),
            ssl_mode: DEFAULT_SSL_MODE.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    /// Load from `DATABASE_URL`, or from `DB_HOST`, `DB_PORT`, `DB_NAME`,
    /// `DB_USER` and `DB_PASSWORD` when no URL is set.
    pub fn from_env() -> DbResult<Self> {
        let target = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => DbTarget::Url(url),
            _ => Self::target_from_parts()?,
        };

        let ssl_mode =
            std::env::var("DB_SSLMODE").unwrap_or_else(|_| DEFAULT_SSL_MODE.to_string());

        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let connect_timeout_secs = std::env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        Ok(Self {
            target,
            ssl_mode,
            max_connections,
            connect_timeout_secs,
        })
    }

    fn target_from_parts() -> DbResult<DbTarget> {
        let required = ["DB_HOST", "DB_PORT", "DB_NAME", "DB_USER", "DB_PASSWORD"];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| std::env::var(key).map(|v| v.is_empty()).unwrap_or(true))
            .collect();

        if !missing.is_empty() {
            return Err(DbError::config(format!(
                "DATABASE_URL not set and missing {}",
                missing.join(", ")
            )));
        }

        let var = |key: &str| std::env::var(key).unwrap_or_default();
        let port = var("DB_PORT")
            .parse()
            .map_err(|_| DbError::config(format!("DB_PORT is not a port: {}", var("DB_PORT"))))?;

        Ok(DbTarget::Parts {
            host: var("DB_HOST"),
            port,
            database: var("DB_NAME"),
            username: var("DB_USER"),
            password: var("DB_PASSWORD"),
        })
    }

    pub fn connect_options(&self) -> DbResult<PgConnectOptions> {
        let options = match &self.target {
            DbTarget::Url(url) => PgConnectOptions::from_str(url)?,
            DbTarget::Parts {
                host,
                port,
                database,
                username,
                password,
            } => {
                let ssl_mode = PgSslMode::from_str(&self.ssl_mode)?;
                PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .database(database)
                    .username(username)
                    .password(password)
                    .ssl_mode(ssl_mode)
            },
        };

        Ok(options)
    }
}

pub async fn create_pool(config: &DbConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_with(config.connect_options()?)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection established"
    );

    Ok(pool)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const DB_VARS: [&str; 9] = [
        "DATABASE_URL",
        "DB_HOST",
        "DB_PORT",
        "DB_NAME",
        "DB_USER",
        "DB_PASSWORD",
        "DB_SSLMODE",
        "DB_MAX_CONNECTIONS",
        "DB_CONNECT_TIMEOUT",
    ];

    fn clear_db_env() {
        for var in DB_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_config_from_database_url() {
        clear_db_env();
        std::env::set_var("DATABASE_URL", "postgresql://localhost/paybench_test");
        std::env::set_var("DB_MAX_CONNECTIONS", "4");

        let config = DbConfig::from_env().unwrap();
        assert!(matches!(config.target, DbTarget::Url(_)));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.connect_timeout_secs, 15);
        assert!(config.connect_options().is_ok());

        clear_db_env();
    }

    #[test]
    #[serial]
    fn test_config_from_parts() {
        clear_db_env();
        std::env::set_var("DB_HOST", "db.example.com");
        std::env::set_var("DB_PORT", "6543");
        std::env::set_var("DB_NAME", "postgres");
        std::env::set_var("DB_USER", "paybench");
        std::env::set_var("DB_PASSWORD", "s3cret");

        let config = DbConfig::from_env().unwrap();
        assert_eq!(config.ssl_mode, "require");
        match &config.target {
            DbTarget::Parts { host, port, .. } => {
                assert_eq!(host, "db.example.com");
                assert_eq!(*port, 6543);
            },
            other => panic!("expected parts, got {:?}", other),
        }
        assert!(!format!("{:?}", config).contains("s3cret"));
        assert!(config.connect_options().is_ok());

        clear_db_env();
    }

    #[test]
    #[serial]
    fn test_config_missing_parts() {
        clear_db_env();
        std::env::set_var("DB_HOST", "db.example.com");

        let err = DbConfig::from_env().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("DB_PORT"));
        assert!(message.contains("DB_PASSWORD"));
        assert!(!message.contains("DB_HOST,"));

        clear_db_env();
    }

    #[test]
    fn test_invalid_ssl_mode() {
        let mut config = DbConfig::from_url("postgresql://localhost/paybench");
        config.target = DbTarget::Parts {
            host: "localhost".to_string(),
            port: 5432,
            database: "paybench".to_string(),
            username: "paybench".to_string(),
            password: "paybench".to_string(),
        };
        config.ssl_mode = "sometimes".to_string();
        assert!(config.connect_options().is_err());
    }
}
