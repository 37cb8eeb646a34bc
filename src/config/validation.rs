//! Configuration validation
//!
//! Validates jira-task-sync configuration for correctness:
//! - JIRA URL is http(s)
//! - Username and API token are present
//! - Task URL, when set, is a URL
//! - Sync settings are in range

use super::sync_config::SyncConfig;
use crate::integrations::IssueType;
use crate::sync::timestamp::CalendarZone;
use crate::SyncError;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a jira-task-sync configuration, collecting every problem
pub fn validate_config(config: &SyncConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let jira = &config.jira;

    if !is_http_url(&jira.domain_url) {
        errors.push(ValidationError::new(
            "jira.domain_url",
            format!("Invalid JIRA URL: '{}'", jira.domain_url),
        ));
    }

    if jira.username.trim().is_empty() {
        errors.push(ValidationError::new(
            "jira.username",
            "JIRA username cannot be empty",
        ));
    }

    match (&jira.api_token, &jira.api_token_env) {
        (Some(token), _) if !token.is_empty() => {}
        (_, Some(var)) => {
            let var = var.trim_start_matches('$');
            if std::env::var(var).is_err() {
                tracing::warn!(
                    env_var = %var,
                    "API token environment variable not set (this may be intentional if set at runtime)"
                );
            }
        }
        _ => errors.push(ValidationError::new(
            "jira.api_token",
            "Either api_token or api_token_env must be set",
        )),
    }

    if !jira.task_url.is_empty() && !is_http_url(&jira.task_url) {
        errors.push(ValidationError::new(
            "jira.task_url",
            format!("Invalid task URL: '{}'", jira.task_url),
        ));
    }

    let sync = &config.sync;

    if sync.issue_types.is_empty() {
        errors.push(ValidationError::new(
            "sync.issue_types",
            format!(
                "At least one issue type is required. Choose from: {}",
                IssueType::ALL
                    .iter()
                    .map(|t| t.jql_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    }

    let mut seen = HashSet::new();
    for issue_type in &sync.issue_types {
        if !seen.insert(issue_type) {
            errors.push(ValidationError::new(
                "sync.issue_types",
                format!("Duplicate issue type: {}", issue_type),
            ));
        }
    }

    if sync.start_date_field.trim().is_empty() {
        errors.push(ValidationError::new(
            "sync.start_date_field",
            "Start date field id cannot be empty",
        ));
    }

    if let Some(minutes) = sync.utc_offset_minutes {
        if CalendarZone::from_offset_minutes(minutes).is_none() {
            errors.push(ValidationError::new(
                "sync.utc_offset_minutes",
                format!("Offset must be within ±1439 minutes, got {}", minutes),
            ));
        }
    }

    if sync.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "sync.request_timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    (url.starts_with("https://") && url.len() > "https://".len())
        || (url.starts_with("http://") && url.len() > "http://".len())
}

/// Validate configuration and return a Result
pub fn validate_config_result(config: &SyncConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        SyncError::Config(format!(
            "Configuration validation failed:\n  - {}",
            messages.join("\n  - ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SyncConfig {
        SyncConfig::new("https://acme.atlassian.net", "jane@example.com", "token")
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_invalid_domain_url() {
        let mut config = valid_config();
        config.jira.domain_url = "acme.atlassian.net".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "jira.domain_url");
    }

    #[test]
    fn test_missing_token() {
        let mut config = valid_config();
        config.jira.api_token = None;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "jira.api_token"));
    }

    #[test]
    fn test_token_env_accepted() {
        let mut config = valid_config();
        config.jira.api_token = None;
        config.jira.api_token_env = Some("$SOME_RUNTIME_TOKEN".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid_config();
        config.jira.username = "  ".to_string();
        config.jira.task_url = "OTP-1".to_string();
        config.sync.issue_types = vec![IssueType::Bug, IssueType::Bug];
        config.sync.utc_offset_minutes = Some(1440);
        config.sync.request_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "jira.username",
                "jira.task_url",
                "sync.issue_types",
                "sync.utc_offset_minutes",
                "sync.request_timeout_secs",
            ]
        );
    }

    #[test]
    fn test_result_wrapper() {
        let mut config = valid_config();
        config.sync.issue_types.clear();

        let err = validate_config_result(&config).unwrap_err();
        assert!(err.to_string().contains("sync.issue_types"));
    }
}
