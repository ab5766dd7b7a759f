use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub access_secret: String,
    pub token_ttl_hours: i64,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, value } => write!(f, "{} has an invalid value: {}", key, value),
        }
    }
}

impl std::error::Error for ConfigError {}

const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw })?,
            None => 5000,
        };

        let store_backend = match get("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("mongodb") => StoreBackend::MongoDB,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { key: "STORE_BACKEND", value: other.to_string() })
            }
        };

        let database_url = get("DATABASE_URL");
        if store_backend == StoreBackend::MongoDB && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        // ASSESS_SECRET is the name older deployments use.
        let access_secret = get("ACCESS_SECRET")
            .or_else(|| get("ASSESS_SECRET"))
            .ok_or(ConfigError::Missing("ACCESS_SECRET"))?;

        let token_ttl_hours = match get("TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0 && chrono::Duration::try_hours(*h).is_some())
                .ok_or(ConfigError::Invalid { key: "TOKEN_TTL_HOURS", value: raw })?,
            None => 24,
        };

        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            host,
            port,
            store_backend,
            database_url,
            access_secret,
            token_ttl_hours,
            allowed_origins,
        })
    }
}
