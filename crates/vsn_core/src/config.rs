use std::fmt;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Connection settings for the PostgreSQL endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub password: String,
    pub user: String,
    pub dbname: String,
    pub port: u16,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("password", &"<redacted>")
            .field("user", &self.user)
            .field("dbname", &self.dbname)
            .field("port", &self.port)
            .finish()
    }
}

/// Process-wide settings, built once at startup and handed to each component.
#[derive(Clone)]
pub struct Config {
    /// `None` when the host or password is missing, which disables ingestion.
    pub database: Option<DatabaseConfig>,
    pub scrape_interval: Duration,
    pub http_timeout: Duration,
    pub user_agent: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub bind_addr: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database", &self.database)
            .field("scrape_interval", &self.scrape_interval)
            .field("http_timeout", &self.http_timeout)
            .field("user_agent", &self.user_agent)
            .field("openai_api_key", &self.openai_api_key.as_deref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field("bind_addr", &self.bind_addr)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            scrape_interval: Duration::from_secs(6 * 3600),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let database = match (var("SUPABASE_HOST"), var("SUPABASE_PASSWORD")) {
            (Some(host), Some(password)) => Some(DatabaseConfig {
                host,
                password,
                user: var("SUPABASE_USER").unwrap_or_else(|| "postgres".to_string()),
                dbname: var("SUPABASE_DB").unwrap_or_else(|| "postgres".to_string()),
                port: parse_var("SUPABASE_PORT", var("SUPABASE_PORT"), 5432)?,
            }),
            _ => None,
        };

        let hours: u64 = parse_var("SCRAPE_INTERVAL_HOURS", var("SCRAPE_INTERVAL_HOURS"), 6)?;
        if hours == 0 {
            return Err(Error::Config("SCRAPE_INTERVAL_HOURS must be at least 1".to_string()));
        }
        let seconds = hours
            .checked_mul(3600)
            .ok_or_else(|| Error::Config(format!("SCRAPE_INTERVAL_HOURS is too large: {}", hours)))?;

        Ok(Self {
            database,
            scrape_interval: Duration::from_secs(seconds),
            openai_api_key: var("OPENAI_API_KEY"),
            openai_model: var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            ..defaults
        })
    }

    pub fn ingestion_enabled(&self) -> bool {
        self.database.is_some()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} must be a number, got {:?}", key, raw))),
        None => Ok(default),
    }
}
