use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use chrono::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set!")]
    Missing(&'static str),
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_lifetime: Duration,
    pub files_url: String,
    pub uploads_dir: PathBuf,
    pub bcrypt_cost: u32,
    pub max_upload_bytes: usize,
    pub login_attempts_per_minute: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SESSION_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SESSION_KEY"))?;

        let lifetime = var_or("JWT_SESSION_LIFETIME", "1d");

        Ok(Self {
            host: var_or("HOST", "0.0.0.0"),
            port: try_load("PORT", "3333")?,
            jwt_secret,
            session_lifetime: parse_lifetime(&lifetime).map_err(|reason| ConfigError::Invalid {
                key: "JWT_SESSION_LIFETIME",
                value: lifetime.clone(),
                reason,
            })?,
            files_url: var_or("FILES_URL", "http://localhost:3333/file")
                .trim_end_matches('/')
                .to_string(),
            uploads_dir: PathBuf::from(var_or("UPLOADS_DIR", "tmp/uploads")),
            bcrypt_cost: try_load("BCRYPT_COST", "8")?,
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
            login_attempts_per_minute: try_load("LOGIN_ATTEMPTS_PER_MINUTE", "10")?,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Public URL of an uploaded file
    pub fn files_url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.files_url, filename)
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = var_or(key, default);
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value,
        reason: e.to_string(),
    })
}

/// Parse a token lifetime such as `3600`, `90s`, `15m`, `12h` or `7d`.
/// A bare number is seconds.
pub fn parse_lifetime(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| "expected a number followed by an optional s/m/h/d unit".to_string())?;

    if amount <= 0 {
        return Err("lifetime must be positive".into());
    }

    let duration = match unit.trim() {
        "" | "s" => Duration::try_seconds(amount),
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        other => return Err(format!("unknown unit {:?}", other)),
    };

    duration.ok_or_else(|| "lifetime out of range".to_string())
}
