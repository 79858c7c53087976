//! Settings from environment variables. Names are the upper-case field names (`DB_HOST`, `PORT`, ...).

use crate::error::ConfigError;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::UnknownStorage(s.to_string())),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    /// Full URL; when set it wins over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl DatabaseSettings {
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                self.username, self.password, self.host, self.port, self.database
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub host_address: String,
    pub port: u16,
    /// Prefix for absolute links in list responses.
    pub public_base_url: String,
    pub storage: StorageBackend,
    pub database: DatabaseSettings,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());
        let port = parse(&lookup, "PORT", 5000)?;
        Ok(Settings {
            host_address: text("HOST_ADDRESS", "0.0.0.0"),
            port,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            storage: lookup("STOREFRONT_STORAGE")
                .map(|s| s.parse::<StorageBackend>())
                .transpose()?
                .unwrap_or(StorageBackend::Postgres),
            database: DatabaseSettings {
                url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
                host: text("DB_HOST", "localhost"),
                port: parse(&lookup, "DB_PORT", 5432)?,
                username: text("DB_USERNAME", "root"),
                password: text("DB_PASSWORD", "root"),
                database: text("DB_DATABASE", "ecommerce"),
                max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host_address, self.port)
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
