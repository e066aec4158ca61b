//! Connection configuration.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OrmError, Result};

pub const ENV_URL: &str = "FIREBASE_URL";
pub const ENV_WRITE_MODE: &str = "FIREBASE_WRITE_MODE";
pub const ENV_TIMEOUT_SECS: &str = "FIREBASE_TIMEOUT_SECS";

/// How store writes are awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Every write completes (or fails) before the operation returns.
    #[default]
    Confirm,
    /// Writes are spawned onto the runtime; failures are logged, not returned.
    BestEffort,
}

impl FromStr for WriteMode {
    type Err = OrmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "confirm" => Ok(WriteMode::Confirm),
            "best-effort" | "best_effort" => Ok(WriteMode::BestEffort),
            other => Err(OrmError::Config(format!("unknown write mode: {other}"))),
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Confirm => f.write_str("confirm"),
            WriteMode::BestEffort => f.write_str("best-effort"),
        }
    }
}

/// Settings for a store connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub base_url: String,
    #[serde(default)]
    pub write_mode: WriteMode,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            write_mode: WriteMode::default(),
            timeout_secs: None,
        }
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Load from the process environment, reading a `.env` file first if present.
    ///
    /// A missing `.env` is fine; one that cannot be read or parsed is a `Config` error.
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(ENV_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| OrmError::Config(format!("{ENV_URL} is not set")))?;

        let write_mode = match lookup(ENV_WRITE_MODE) {
            Some(mode) => mode.parse()?,
            None => WriteMode::default(),
        };

        let timeout_secs = match lookup(ENV_TIMEOUT_SECS) {
            Some(secs) => Some(secs.trim().parse::<u64>().map_err(|e| {
                OrmError::Config(format!("{ENV_TIMEOUT_SECS} is not a number: {e}"))
            })?),
            None => None,
        };

        Ok(Self {
            base_url,
            write_mode,
            timeout_secs,
        })
    }
}

fn check_dotenv<T>(loaded: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(OrmError::Config(format!("cannot load .env: {err}"))),
    }
}
