use crate::error::{KanbanError, Result};
use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};
use tracing::{info, warn};

pub const API_URL_VAR: &str = "OMNI_API_URL";
pub const SESSION_FILE_VAR: &str = "OMNI_SESSION_FILE";
pub const COOKIE_MAX_AGE_VAR: &str = "OMNI_COOKIE_MAX_AGE_SECS";
pub const HTTP_TIMEOUT_VAR: &str = "OMNI_HTTP_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_SESSION_FILE: &str = ".omni-learner/session.json";
const DEFAULT_COOKIE_MAX_AGE_SECS: u64 = 60 * 60;

/// Client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the REST backend
    pub api_url: String,
    /// JSON file holding the persisted session
    pub session_file: PathBuf,
    /// Lifetime of the access-token cookie mirror
    pub cookie_max_age: Duration,
    /// Per-request timeout; `None` keeps the HTTP client's default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            cookie_max_age: Duration::from_secs(DEFAULT_COOKIE_MAX_AGE_SECS),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Loads settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads settings through `lookup`, falling back to defaults for missing keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url: String = try_load(&lookup, API_URL_VAR, DEFAULT_API_URL)?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(KanbanError::ConfigError(format!(
                "{} must be an http(s) URL, got '{}'", API_URL_VAR, api_url
            )));
        }

        let session_file: String = try_load(&lookup, SESSION_FILE_VAR, DEFAULT_SESSION_FILE)?;
        let cookie_max_age: u64 = try_load(
            &lookup,
            COOKIE_MAX_AGE_VAR,
            &DEFAULT_COOKIE_MAX_AGE_SECS.to_string(),
        )?;
        let request_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(raw) => Some(Duration::from_secs(parse(HTTP_TIMEOUT_VAR, &raw)?)),
            None => None,
        };

        Ok(Self {
            api_url,
            session_file: PathBuf::from(session_file),
            cookie_max_age: Duration::from_secs(cookie_max_age),
            request_timeout,
        })
    }
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    });
    parse(key, &raw)
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|e| {
        warn!("Invalid {} value: {}", key, e);
        KanbanError::ConfigError(format!("Invalid {} value '{}': {}", key, raw, e))
    })
}
