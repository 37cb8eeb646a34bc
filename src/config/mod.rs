//! Configuration system
//!
//! The YAML credential store plus the per-run view derived from it.
//!
//! Loads ~/.config/jira-task-sync/config.yaml with support for:
//! - JIRA domain, username and API token (inline or from an environment variable)
//! - The task URL naming the anchor issue
//! - The host company identifier used for environment detection
//! - Sync settings (issue types, start-date field, calendar offset, timeout)

mod integration;
mod sync_config;
pub mod validation;

pub use integration::{extract_issue_key, looks_like_issue_key, IntegrationConfig};
pub use sync_config::{CompanySection, JiraSection, SyncConfig, SyncSettings};
pub use validation::{validate_config, validate_config_result, ValidationError};
