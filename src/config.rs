//! Process configuration
//!
//! Reads config from env vars (a `.env` file is loaded first when present):
//!   DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME   required
//!   DB_SSLMODE                 default: require
//!   DB_POOL_SIZE               default: 10
//!   DB_ACQUIRE_TIMEOUT_SECS    default: 30
//!   DB_STATEMENT_TIMEOUT_MS    default: unset (server default)
//!   DB_AUTO_MIGRATE            default: false
//!   BIND_ADDR                  default: 0.0.0.0:9999

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9999";

/// TLS negotiation mode for the store connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Allow,
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(SslMode::Disable),
            "allow" => Ok(SslMode::Allow),
            "prefer" => Ok(SslMode::Prefer),
            "require" => Ok(SslMode::Require),
            "verify-ca" => Ok(SslMode::VerifyCa),
            "verify-full" => Ok(SslMode::VerifyFull),
            other => Err(format!("unknown ssl mode '{}'", other)),
        }
    }
}

/// Database configuration
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub ssl_mode: SslMode,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub statement_timeout: Option<Duration>,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection target without credentials, safe for logs
    pub fn display_target(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// Server process configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub bind_addr: String,
    pub auto_migrate: bool,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::info!("No .env file loaded: {}", e);
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; missing or malformed values fail
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Lookup(lookup);

        let database = DatabaseConfig {
            host: env.required("DB_HOST")?,
            port: env.required_parsed("DB_PORT")?,
            user: env.required("DB_USER")?,
            password: env.required("DB_PASSWORD")?,
            database: env.required("DB_NAME")?,
            ssl_mode: env.parsed_or("DB_SSLMODE", SslMode::Require)?,
            max_connections: env.parsed_or("DB_POOL_SIZE", 10)?,
            acquire_timeout: Duration::from_secs(env.parsed_or("DB_ACQUIRE_TIMEOUT_SECS", 30)?),
            statement_timeout: env
                .parsed::<u64>("DB_STATEMENT_TIMEOUT_MS")?
                .map(Duration::from_millis),
        };

        Ok(Self {
            database,
            bind_addr: env
                .optional("BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            auto_migrate: env.parsed_or("DB_AUTO_MIGRATE", false)?,
        })
    }
}

struct Lookup<F>(F);

impl<F> Lookup<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, var: &'static str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn parsed<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.optional(var)
            .map(|value| {
                value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                    var,
                    value: value.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn required_parsed<T>(&self, var: &'static str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.parsed(var)?.ok_or(ConfigError::Missing(var))
    }

    fn parsed_or<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        Ok(self.parsed(var)?.unwrap_or(default))
    }
}
