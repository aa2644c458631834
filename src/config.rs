/*
 * Responsibility
 * - Load settings from the environment (.env is honored via dotenvy)
 * - Validate them up front: a missing or broken key URL fails startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::middleware::http::HttpLimits;

/// Env var holding the public key location.
pub const PUBLIC_KEY_URL_ENV: &str = "AUTHORIZER_PUBLIC_KEY_URL";
/// Older name for the same setting, still honored.
pub const LEGACY_PUBLIC_KEY_URL_ENV: &str = "EGO_PUBLIC_KEY_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<String>) -> Self {
        match value
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub public_key_url: Url,
    pub key_fetch_timeout: Duration,

    pub audience: Option<String>,
    pub token_leeway_seconds: u64,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let raw_url = lookup(PUBLIC_KEY_URL_ENV)
            .or_else(|| lookup(LEGACY_PUBLIC_KEY_URL_ENV))
            .ok_or(ConfigError::Missing(PUBLIC_KEY_URL_ENV))?;
        let public_key_url = parse_key_url(&raw_url)?;

        let key_fetch_timeout = Duration::from_secs(
            lookup("KEY_FETCH_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        );

        let audience = lookup("AUTHORIZER_AUDIENCE")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let token_leeway_seconds = lookup("TOKEN_LEEWAY_SECONDS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);

        let request_timeout = Duration::from_secs(
            lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        Ok(Self {
            addr,
            app_env,
            public_key_url,
            key_fetch_timeout,
            audience,
            token_leeway_seconds,
            request_timeout,
        })
    }

    pub fn http_limits(&self) -> HttpLimits {
        HttpLimits {
            request_timeout: self.request_timeout,
            ..HttpLimits::default()
        }
    }
}

fn parse_key_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid(PUBLIC_KEY_URL_ENV))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::Invalid(PUBLIC_KEY_URL_ENV)),
    }
}
