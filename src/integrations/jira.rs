//! JIRA REST Client
//!
//! Read-only access to the JIRA Cloud REST API (v3). Every call is a plain GET
//! that either yields decoded JSON or degrades to `None`: a failing query is
//! logged and skipped so the rest of the sync can continue.

use super::auth::build_headers;
use crate::config::IntegrationConfig;
use crate::{Result, SyncError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

/// Whole-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PROJECT_PATH: &str = "/rest/api/3/project";
const PROJECT_RECENT_PATH: &str = "/rest/api/3/project/recent";
const SEARCH_PATH: &str = "/rest/api/3/search";
const ISSUE_PATH: &str = "/rest/api/3/issue";
const ISSUE_PICKER_PATH: &str = "/rest/api/3/issue/picker";

/// JIRA issue types the sync fans out over
///
/// Deserializes through [`FromStr`], so config files may use any casing and
/// the `sub-task` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IssueType {
    Epic,
    Task,
    Story,
    Bug,
    Subtask,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::Epic,
        IssueType::Task,
        IssueType::Story,
        IssueType::Bug,
        IssueType::Subtask,
    ];

    /// Name as used in JQL
    pub fn jql_name(&self) -> &'static str {
        match self {
            IssueType::Epic => "Epic",
            IssueType::Task => "Task",
            IssueType::Story => "Story",
            IssueType::Bug => "Bug",
            IssueType::Subtask => "Subtask",
        }
    }

    /// `type = <Type>` query
    pub fn jql(&self) -> String {
        format!("type = {}", self.jql_name())
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.jql_name())
    }
}

impl FromStr for IssueType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "epic" => Ok(IssueType::Epic),
            "task" => Ok(IssueType::Task),
            "story" => Ok(IssueType::Story),
            "bug" => Ok(IssueType::Bug),
            "subtask" | "sub-task" => Ok(IssueType::Subtask),
            other => Err(SyncError::Config(format!(
                "Unknown issue type '{}'. Must be one of: epic, task, story, bug, subtask",
                other
            ))),
        }
    }
}

impl TryFrom<String> for IssueType {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<IssueType> for String {
    fn from(issue_type: IssueType) -> Self {
        issue_type.jql_name().to_string()
    }
}

/// Entry of `/rest/api/3/project`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of `/rest/api/3/project/recent?expand=insight`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentProject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub insight: Option<ProjectInsight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInsight {
    #[serde(rename = "totalIssueCount", default)]
    pub total_issue_count: Option<u64>,
    #[serde(rename = "lastIssueUpdateTime", default)]
    pub last_issue_update_time: Option<String>,
}

/// One page of `/rest/api/3/search`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(rename = "startAt", default)]
    pub start_at: Option<u64>,
    #[serde(rename = "maxResults", default)]
    pub max_results: Option<u64>,
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

impl SearchPage {
    /// True when JIRA reports more matches than this page carries
    pub fn is_truncated(&self) -> bool {
        match self.total {
            Some(total) => {
                total > self.start_at.unwrap_or(0).saturating_add(self.issues.len() as u64)
            }
            None => false,
        }
    }
}

/// JIRA issue representation
///
/// Decoded leniently: only `key` is required. Fields the mapper does not know
/// about (custom fields) stay reachable through `fields.extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub fields: JiraIssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraIssueFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub project: Option<JiraProject>,
    #[serde(default)]
    pub parent: Option<JiraParent>,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default)]
    pub reporter: Option<JiraUser>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(rename = "issuetype", default)]
    pub issue_type: Option<JiraIssueType>,
    #[serde(rename = "timeoriginalestimate", default)]
    pub time_original_estimate: Option<i64>,
    #[serde(rename = "timeestimate", default)]
    pub time_estimate: Option<i64>,
    #[serde(rename = "duedate", default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraProject {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraParent {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "accountId", default)]
    pub account_id: Option<String>,
    #[serde(rename = "emailAddress", default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueType {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Response of `/rest/api/3/issue/picker`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuePickerResponse {
    #[serde(default)]
    pub sections: Vec<PickerSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerSection {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub issues: Vec<PickerIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerIssue {
    pub key: String,
    #[serde(rename = "summaryText", default)]
    pub summary_text: Option<String>,
}

/// Anchor for issue picker suggestions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerQuery {
    ProjectId(String),
    IssueKey(String),
}

/// Read operations the aggregator needs from JIRA
///
/// `None` means the source failed and has already been logged.
#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn list_projects(&self) -> Option<Vec<ProjectRef>>;

    async fn recent_projects(&self) -> Option<Vec<RecentProject>>;

    async fn search(&self, jql: &str) -> Option<SearchPage>;
}

/// JIRA REST client
pub struct JiraClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl JiraClient {
    /// Create a client with the default request timeout
    pub fn new(config: &IntegrationConfig) -> Result<Self> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests fail after `timeout`
    pub fn with_timeout(config: &IntegrationConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let headers = build_headers(&config.username, config.api_token())?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            headers,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let url = if params.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, params)
        };
        url.map_err(|e| SyncError::Config(format!("Invalid JIRA URL '{}': {}", raw, e)))
    }

    /// GET `url` and decode the body as JSON, surfacing the failure kind
    pub async fn try_get(&self, url: &str, headers: &HeaderMap) -> Result<Value> {
        debug!(url = %url, "GET JIRA");

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| SyncError::Network(e.to_string()))?;
                serde_json::from_str(&body)
                    .map_err(|e| SyncError::Parse(format!("Invalid JSON from {}: {}", url, e)))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SyncError::Remote {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    /// GET `url`, returning `None` on any failure
    ///
    /// Non-200 statuses, transport errors, timeouts and malformed JSON are
    /// logged and absorbed; callers treat `None` as "skip this source".
    pub async fn get(&self, url: &str, headers: &HeaderMap) -> Option<Value> {
        match self.try_get(url, headers).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url = %url, kind = e.kind(), error = %e, "JIRA request failed, skipping source");
                None
            }
        }
    }

    async fn get_typed<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Option<T> {
        let url = match self.endpoint(path, params) {
            Ok(url) => url,
            Err(e) => {
                warn!(path = %path, error = %e, "Could not build JIRA URL");
                return None;
            }
        };
        self.fetch_typed(url).await
    }

    async fn fetch_typed<T: DeserializeOwned>(&self, url: Url) -> Option<T> {
        let value = self.get(url.as_str(), &self.headers).await?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(url = %url, error = %e, "Unexpected JIRA payload shape, skipping source");
                None
            }
        }
    }

    /// `GET /rest/api/3/search?jql=type = <Type>&fields=*all`
    pub async fn search_by_type(&self, issue_type: IssueType) -> Option<SearchPage> {
        self.search(&issue_type.jql()).await
    }

    /// `GET /rest/api/3/search?jql=updated >= "<timestamp>"&fields=*all`
    pub async fn search_updated_since(&self, timestamp: &str) -> Option<SearchPage> {
        self.search(&updated_since_jql(timestamp)).await
    }

    /// `GET /rest/api/3/issue/<key>?fields=*all`
    ///
    /// `id_or_key` is sent as a single escaped path segment.
    pub async fn issue(&self, id_or_key: &str) -> Option<JiraIssue> {
        let mut url = match self.endpoint(ISSUE_PATH, &[("fields", "*all")]) {
            Ok(url) => url,
            Err(e) => {
                warn!(issue = %id_or_key, error = %e, "Could not build JIRA URL");
                return None;
            }
        };

        let pushed = match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.push(id_or_key);
                true
            }
            Err(()) => false,
        };
        if !pushed {
            warn!(url = %url, "JIRA URL cannot carry an issue path");
            return None;
        }

        self.fetch_typed(url).await
    }

    /// `GET /rest/api/3/issue/picker?currentProjectId=<id>` or `?currentIssueKey=<key>`
    pub async fn issue_picker(&self, query: &PickerQuery) -> Option<IssuePickerResponse> {
        let param = match query {
            PickerQuery::ProjectId(id) => ("currentProjectId", id.as_str()),
            PickerQuery::IssueKey(key) => ("currentIssueKey", key.as_str()),
        };
        self.get_typed(ISSUE_PICKER_PATH, &[param]).await
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    /// `GET /rest/api/3/project`
    async fn list_projects(&self) -> Option<Vec<ProjectRef>> {
        self.get_typed(PROJECT_PATH, &[]).await
    }

    /// `GET /rest/api/3/project/recent?expand=insight`
    async fn recent_projects(&self) -> Option<Vec<RecentProject>> {
        self.get_typed(PROJECT_RECENT_PATH, &[("expand", "insight")])
            .await
    }

    async fn search(&self, jql: &str) -> Option<SearchPage> {
        self.get_typed(SEARCH_PATH, &[("jql", jql), ("fields", "*all")])
            .await
    }
}

/// `updated >= "<timestamp>"` query
pub fn updated_since_jql(timestamp: &str) -> String {
    format!("updated >= \"{}\"", timestamp)
}
