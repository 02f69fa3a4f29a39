/*
 * Responsibility
 * - Load settings from the environment (.env via dotenvy, then process env)
 * - Validate them up front: a bad value fails startup, never a request
 */
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::authz::{Authority, AuthoritySet};

const DEFAULT_LOGIN_ENTRY_POINT: &str = "/oauth2/authorization/google";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Where ChallengeLogin redirects to (provider authorization endpoint)
    pub login_entry_point: String,

    pub session_cookie_name: String,
    // None = sessions only end at logout
    pub session_ttl: Option<Duration>,
    pub session_purge_interval: Duration,

    pub request_timeout: Duration,

    pub policy_file: Option<PathBuf>,
    pub default_authorities: AuthoritySet,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key → value lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{port}"))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let login_entry_point = lookup("LOGIN_ENTRY_POINT")
            .map(|s| s.trim().to_owned())
            .unwrap_or_else(|| DEFAULT_LOGIN_ENTRY_POINT.to_owned());
        if !is_redirect_target(&login_entry_point) {
            return Err(ConfigError::Invalid("LOGIN_ENTRY_POINT"));
        }

        let session_cookie_name = lookup("SESSION_COOKIE_NAME")
            .map(|s| s.trim().to_owned())
            .unwrap_or_else(|| "SESSION".to_owned());
        if session_cookie_name.is_empty()
            || session_cookie_name.contains(|c: char| c == '=' || c == ';' || c.is_whitespace())
        {
            return Err(ConfigError::Invalid("SESSION_COOKIE_NAME"));
        }

        let session_ttl = match seconds(&lookup, "SESSION_TTL_SECONDS", 1800)? {
            0 => None,
            n => Some(Duration::from_secs(n)),
        };

        let session_purge_interval = Duration::from_secs(
            seconds(&lookup, "SESSION_PURGE_INTERVAL_SECONDS", 60)?.max(1),
        );

        let request_timeout =
            Duration::from_secs(seconds(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?.max(1));

        let policy_file = lookup("AUTHZ_POLICY_FILE")
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let default_authorities = lookup("DEFAULT_AUTHORITIES")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Authority::from)
            .collect();

        Ok(Self {
            addr,
            app_env,
            login_entry_point,
            session_cookie_name,
            session_ttl,
            session_purge_interval,
            request_timeout,
            policy_file,
            default_authorities,
        })
    }
}

fn seconds<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

// Absolute path on this host, or an absolute http(s) URL.
fn is_redirect_target(raw: &str) -> bool {
    if raw.starts_with('/') {
        return !raw.starts_with("//");
    }
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}
