use thiserror::Error;

/// Errors surfaced by store round trips.
///
/// Only transport-level failures exist here: absent records are reported as
/// `Ok(None)` by the lookup operations, never as errors.
#[derive(Debug, Error)]
pub enum OrmError {
    #[cfg(feature = "http")]
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} returned status {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed document at {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("configuration error: {0}")]
    Config(String),
}

impl OrmError {
    pub fn malformed(path: &str, reason: impl Into<String>) -> Self {
        OrmError::MalformedDocument {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OrmError>;
