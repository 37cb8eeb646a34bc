//! Integration credentials
//!
//! The immutable per-run view of the credential store: where JIRA lives, who
//! to authenticate as, and the task URL that names the anchor issue.

use reqwest::Url;
use std::fmt;

/// JIRA connection settings for one sync run
#[derive(Clone, PartialEq, Eq)]
pub struct IntegrationConfig {
    /// JIRA base URL (e.g. `https://acme.atlassian.net`)
    pub domain_url: String,

    /// Account email used for Basic auth
    pub username: String,

    api_token: String,

    /// Board or issue URL; its selected issue anchors picker lookups
    pub task_url: String,
}

impl IntegrationConfig {
    pub fn new(
        domain_url: impl Into<String>,
        username: impl Into<String>,
        api_token: impl Into<String>,
        task_url: impl Into<String>,
    ) -> Self {
        Self {
            domain_url: domain_url.into(),
            username: username.into(),
            api_token: api_token.into(),
            task_url: task_url.into(),
        }
    }

    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Domain URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.domain_url.trim().trim_end_matches('/')
    }

    /// Issue key named by the task URL, if any
    pub fn issue_key(&self) -> Option<String> {
        extract_issue_key(&self.task_url)
    }
}

impl fmt::Debug for IntegrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationConfig")
            .field("domain_url", &self.domain_url)
            .field("username", &self.username)
            .field("api_token", &"<redacted>")
            .field("task_url", &self.task_url)
            .finish()
    }
}

/// Pull an issue key out of a JIRA task URL
///
/// Board URLs carry it as `?selectedIssue=KEY`; browse URLs end with it
/// (`/browse/KEY`).
pub fn extract_issue_key(task_url: &str) -> Option<String> {
    let url = Url::parse(task_url.trim()).ok()?;

    if let Some((_, value)) = url.query_pairs().find(|(k, _)| k == "selectedIssue") {
        if !value.is_empty() {
            return Some(value.into_owned());
        }
    }

    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()
        .filter(|segment| looks_like_issue_key(segment))
        .map(str::to_string)
}

/// `PROJ-123` shape: uppercase project key, dash, number
pub fn looks_like_issue_key(candidate: &str) -> bool {
    let Some((project, number)) = candidate.rsplit_once('-') else {
        return false;
    };

    project.starts_with(|c: char| c.is_ascii_uppercase())
        && project
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_issue_param() {
        let url = "https://acme.atlassian.net/jira/software/projects/OTP/boards/12?selectedIssue=OTP-5926";
        assert_eq!(extract_issue_key(url).as_deref(), Some("OTP-5926"));
    }

    #[test]
    fn test_browse_url() {
        assert_eq!(
            extract_issue_key("https://acme.atlassian.net/browse/OTP-12/").as_deref(),
            Some("OTP-12")
        );
    }

    #[test]
    fn test_no_key() {
        assert!(extract_issue_key("https://acme.atlassian.net/jira/your-work").is_none());
        assert!(extract_issue_key("not a url").is_none());
        assert!(extract_issue_key("").is_none());
        assert!(extract_issue_key("https://acme.atlassian.net/boards?selectedIssue=").is_none());
    }

    #[test]
    fn test_issue_key_shape() {
        assert!(looks_like_issue_key("OTP-1"));
        assert!(looks_like_issue_key("A2B_C-99"));
        assert!(!looks_like_issue_key("otp-1"));
        assert!(!looks_like_issue_key("OTP-"));
        assert!(!looks_like_issue_key("-1"));
        assert!(!looks_like_issue_key("your-work"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = IntegrationConfig::new(
            "https://acme.atlassian.net/",
            "jane@example.com",
            "super-secret",
            "",
        );
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
        assert_eq!(config.base_url(), "https://acme.atlassian.net");
        assert_eq!(config.api_token(), "super-secret");
    }
}
