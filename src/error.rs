//! Error types for jira-task-sync
//!
//! One error enum covers every failure mode of a sync run. Remote failures
//! (`Remote`, `Network`, `Parse`) are absorbed by the REST client and only
//! show up in logs; `ConfigLoad` is the one error that stops a run.

use thiserror::Error;

/// Result type alias for jira-task-sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type for jira-task-sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// Credential store missing or unreadable
    #[error("Failed to load integration config: {0}")]
    ConfigLoad(String),

    /// Configuration present but invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-200 response from JIRA
    #[error("JIRA returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// Transport-level failures (connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Malformed payloads
    #[error("Parse error: {0}")]
    Parse(String),

    /// Authorization header construction
    #[error("Authentication error: {0}")]
    Auth(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl SyncError {
    /// Whether this failure came from talking to JIRA.
    ///
    /// Remote failures degrade to "no data" for the query that produced them.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Remote { .. }
                | SyncError::Network(_)
                | SyncError::Parse(_)
                | SyncError::Json(_)
                | SyncError::Http(_)
        )
    }

    /// Short label used in structured log fields
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ConfigLoad(_) => "config_load",
            SyncError::Config(_) => "config",
            SyncError::Remote { .. } => "remote",
            SyncError::Network(_) | SyncError::Http(_) => "network",
            SyncError::Parse(_) | SyncError::Json(_) | SyncError::Yaml(_) => "parse",
            SyncError::Auth(_) => "auth",
            SyncError::Io(_) => "io",
            SyncError::Other(_) => "other",
        }
    }
}
