//! Field Mapper / Status Normalizer
//!
//! Flattens a raw JIRA issue into the record the downstream host turns into a
//! project task.

use crate::integrations::JiraIssue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// JIRA Cloud's built-in "Start date" field
pub const DEFAULT_START_DATE_FIELD: &str = "customfield_10015";

/// Canonical task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::NotStarted => "Not Started",
            SyncStatus::InProgress => "In Progress",
            SyncStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a JIRA status name onto the three canonical buckets
///
/// Exact match on the name: "To Do" is not started, "In Progress" and
/// "In QA" are in progress, everything else counts as completed.
pub fn normalize_status(status_name: &str) -> SyncStatus {
    match status_name {
        "To Do" => SyncStatus::NotStarted,
        "In Progress" | "In QA" => SyncStatus::InProgress,
        _ => SyncStatus::Completed,
    }
}

/// Instance-specific field ids used while mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Custom field holding the issue's start date
    pub start_date_field: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            start_date_field: DEFAULT_START_DATE_FIELD.to_string(),
        }
    }
}

/// Flat sync record handed to the host's record-creation stage
///
/// Serializes with the field names the host expects (`issuekey`,
/// `statusName`, otherwise camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecord {
    pub project_key: String,
    #[serde(rename = "issuekey")]
    pub issue_key: String,
    pub summary: String,
    pub parent: Option<String>,
    /// Project name; the host files tasks under a company of this name
    pub company: String,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    #[serde(rename = "statusName")]
    pub status: SyncStatus,
    /// Seconds
    pub original_estimate: Option<i64>,
    pub due_date: Option<String>,
    pub start_date: Option<String>,
    /// Remaining estimate, seconds
    pub time_estimate: Option<i64>,
}

/// Convert a raw JIRA issue into a [`SyncRecord`]
pub fn map_issue(issue: &JiraIssue, mapping: &FieldMapping) -> SyncRecord {
    let fields = &issue.fields;
    let project = fields.project.as_ref();

    let status_name = fields
        .status
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or_default();

    let start_date = fields
        .extra
        .get(&mapping.start_date_field)
        .and_then(|v| v.as_str())
        .map(str::to_string);

    SyncRecord {
        project_key: project.map(|p| p.key.clone()).unwrap_or_default(),
        issue_key: issue.key.clone(),
        summary: fields.summary.clone().unwrap_or_default(),
        parent: fields.parent.as_ref().map(|p| p.key.clone()),
        company: project.and_then(|p| p.name.clone()).unwrap_or_default(),
        assignee: fields.assignee.as_ref().and_then(|u| u.email.clone()),
        reporter: fields.reporter.as_ref().and_then(|u| u.email.clone()),
        status: normalize_status(status_name),
        original_estimate: fields.time_original_estimate,
        due_date: fields.due_date.clone(),
        start_date,
        time_estimate: fields.time_estimate,
    }
}
