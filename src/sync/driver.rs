//! Sync Driver
//!
//! One invocation of the pipeline: environment check, credential load,
//! project listing and issue aggregation. Configuration is read fresh on
//! every run; nothing carries over between runs.

use super::aggregator::IssueAggregator;
use super::mapper::{FieldMapping, SyncRecord};
use super::timestamp::CalendarZone;
use crate::config::SyncSettings;
use crate::host::{is_production_environment, CompanyInfoSource, CredentialStore, RecordSink};
use crate::integrations::{IssueType, JiraApi, JiraClient, ProjectRef, DEFAULT_TIMEOUT};
use crate::{Result, SyncError};
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Which queries feed the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Issues updated since each recent project's last update
    #[default]
    RecentlyUpdated,
    /// Every issue of the configured types
    ByIssueType,
    /// Both, merged
    All,
}

impl FromStr for SyncMode {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "recent" | "recently-updated" => Ok(SyncMode::RecentlyUpdated),
            "by-type" | "types" => Ok(SyncMode::ByIssueType),
            "all" => Ok(SyncMode::All),
            other => Err(SyncError::Config(format!(
                "Unknown sync mode '{}'. Must be one of: recent, by-type, all",
                other
            ))),
        }
    }
}

/// Options for a driver run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: SyncMode,
    pub issue_types: Vec<IssueType>,
    pub mapping: FieldMapping,
    pub zone: CalendarZone,
    pub request_timeout: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            mode: SyncMode::default(),
            issue_types: IssueType::ALL.to_vec(),
            mapping: FieldMapping::default(),
            zone: CalendarZone::default(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SyncOptions {
    /// Options derived from the `sync` section of the config file
    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        Ok(Self {
            mode: SyncMode::default(),
            issue_types: settings.issue_types.clone(),
            mapping: settings.field_mapping(),
            zone: settings.calendar_zone()?,
            request_timeout: settings.request_timeout(),
        })
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Output of one driver run
#[derive(Debug, Clone, Serialize)]
pub struct SyncBatch {
    pub production: bool,
    /// Anchor issue parsed from the task URL
    pub issue_key: Option<String>,
    pub projects: Vec<ProjectRef>,
    pub records: Vec<SyncRecord>,
}

/// Runs the pipeline once against host-provided collaborators
pub struct SyncDriver<'a> {
    credentials: &'a dyn CredentialStore,
    company: &'a dyn CompanyInfoSource,
    options: SyncOptions,
}

impl<'a> SyncDriver<'a> {
    pub fn new(
        credentials: &'a dyn CredentialStore,
        company: &'a dyn CompanyInfoSource,
        options: SyncOptions,
    ) -> Self {
        Self {
            credentials,
            company,
            options,
        }
    }

    /// Run against the live JIRA instance named by the credential store
    ///
    /// Fails only when credentials cannot be loaded; remote failures shrink
    /// the batch instead.
    pub async fn run(&self) -> Result<SyncBatch> {
        let production = is_production_environment(self.company);
        let environment = if production {
            "production"
        } else {
            "non-production"
        };
        info!(environment, "Starting JIRA sync");

        let config = self.credentials.fetch_integration_config()?;
        let client = JiraClient::with_timeout(&config, self.options.request_timeout)?;

        let issue_key = config.issue_key();
        debug!(issue_key = ?issue_key, "Parsed task URL");

        Ok(self.run_with(&client, production, issue_key).await)
    }

    /// Run against any [`JiraApi`]
    pub async fn run_with<A: JiraApi + ?Sized>(
        &self,
        api: &A,
        production: bool,
        issue_key: Option<String>,
    ) -> SyncBatch {
        let aggregator = IssueAggregator::new(api)
            .with_mapping(self.options.mapping.clone())
            .with_zone(self.options.zone);

        let projects = aggregator.list_projects().await;
        info!(projects = projects.len(), "Fetched JIRA projects");

        let records = match self.options.mode {
            SyncMode::RecentlyUpdated => aggregator.aggregate().await,
            SyncMode::ByIssueType => {
                aggregator
                    .aggregate_by_types(&self.options.issue_types)
                    .await
            }
            SyncMode::All => aggregator.aggregate_all(&self.options.issue_types).await,
        };

        SyncBatch {
            production,
            issue_key,
            projects,
            records,
        }
    }

    /// Run and hand the records to `sink`
    pub async fn run_into(&self, sink: &mut dyn RecordSink) -> Result<SyncBatch> {
        let batch = self.run().await?;
        sink.accept(&batch.records)?;
        info!(records = batch.records.len(), "Handed records to sink");
        Ok(batch)
    }
}
