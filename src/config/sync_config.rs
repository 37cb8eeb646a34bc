//! jira-task-sync configuration file handling
//!
//! Loads and manages ~/.config/jira-task-sync/config.yaml, the credential
//! store for the integration.

use super::integration::IntegrationConfig;
use crate::integrations::IssueType;
use crate::sync::mapper::{FieldMapping, DEFAULT_START_DATE_FIELD};
use crate::sync::timestamp::CalendarZone;
use crate::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// JIRA connection section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraSection {
    /// JIRA instance URL
    pub domain_url: String,

    /// Account email for Basic auth
    pub username: String,

    /// API token stored inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// Environment variable holding the API token (used when `api_token` is unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token_env: Option<String>,

    /// Board or issue URL naming the anchor issue
    #[serde(default)]
    pub task_url: String,
}

impl JiraSection {
    /// Inline token, falling back to the configured environment variable
    pub fn resolve_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                self.api_token_env
                    .as_ref()
                    .and_then(|var| std::env::var(var.trim_start_matches('$')).ok())
                    .filter(|t| !t.is_empty())
            })
    }
}

/// Host company section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySection {
    /// Host account identifier used for environment detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
}

/// Sync behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Issue types queried by the type fan-out
    #[serde(default = "default_issue_types")]
    pub issue_types: Vec<IssueType>,

    /// Custom field id of the start date
    #[serde(default = "default_start_date_field")]
    pub start_date_field: String,

    /// Calendar offset for JQL timestamps; local time zone when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_issue_types() -> Vec<IssueType> {
    IssueType::ALL.to_vec()
}

fn default_start_date_field() -> String {
    DEFAULT_START_DATE_FIELD.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            issue_types: default_issue_types(),
            start_date_field: default_start_date_field(),
            utc_offset_minutes: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SyncSettings {
    pub fn field_mapping(&self) -> FieldMapping {
        FieldMapping {
            start_date_field: self.start_date_field.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Calendar zone for update timestamps
    pub fn calendar_zone(&self) -> Result<CalendarZone> {
        match self.utc_offset_minutes {
            None => Ok(CalendarZone::Local),
            Some(minutes) => CalendarZone::from_offset_minutes(minutes).ok_or_else(|| {
                SyncError::Config(format!("UTC offset out of range: {} minutes", minutes))
            }),
        }
    }
}

/// jira-task-sync configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// JIRA connection
    pub jira: JiraSection,

    /// Host company information
    #[serde(default)]
    pub company: CompanySection,

    /// Sync behaviour
    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Create a configuration with an inline API token
    pub fn new(
        domain_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Self {
        Self {
            jira: JiraSection {
                domain_url: domain_url.into(),
                username: username.into(),
                api_token: Some(api_token.into()),
                api_token_env: None,
                task_url: String::new(),
            },
            company: CompanySection::default(),
            sync: SyncSettings::default(),
        }
    }

    pub fn with_task_url(mut self, task_url: impl Into<String>) -> Self {
        self.jira.task_url = task_url.into();
        self
    }

    pub fn with_company_id(mut self, company_id: impl Into<String>) -> Self {
        self.company.company_id = Some(company_id.into());
        self
    }

    /// Load configuration from the default path
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SyncError::ConfigLoad(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading jira-task-sync configuration");

        let content = fs::read_to_string(path)
            .map_err(|e| SyncError::ConfigLoad(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_yaml::from_str(&content)
            .map_err(|e| SyncError::ConfigLoad(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            domain = %config.jira.domain_url,
            issue_types = config.sync.issue_types.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving jira-task-sync configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/jira-task-sync/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("jira-task-sync");
        path.push("config.yaml");
        path
    }

    /// Resolve the credentials for one run
    pub fn integration_config(&self) -> Result<IntegrationConfig> {
        let token = self.jira.resolve_token().ok_or_else(|| {
            SyncError::ConfigLoad("No JIRA API token configured (api_token or api_token_env)".to_string())
        })?;

        Ok(IntegrationConfig::new(
            self.jira.domain_url.clone(),
            self.jira.username.clone(),
            token,
            self.jira.task_url.clone(),
        ))
    }
}
