//! JIRA Integration
//!
//! Basic-auth header construction and a read-only REST client for JIRA Cloud.
//!
//! # Endpoints
//!
//! | Operation | Path |
//! |---|---|
//! | list projects | `/rest/api/3/project` |
//! | search by type | `/rest/api/3/search?jql=type = <Type>&fields=*all` |
//! | search by update date | `/rest/api/3/search?jql=updated >= "<timestamp>"&fields=*all` |
//! | project recent / insight | `/rest/api/3/project/recent?expand=insight` |
//! | issue detail | `/rest/api/3/issue/<issueIdOrKey>?fields=*all` |
//! | issue picker | `/rest/api/3/issue/picker?currentProjectId=<id>` |

pub mod auth;
pub mod jira;

pub use auth::{basic_credentials, build_headers};
pub use jira::{
    updated_since_jql, IssuePickerResponse, IssueType, JiraApi, JiraClient, JiraIssue,
    JiraIssueFields, JiraIssueType, JiraParent, JiraProject, JiraStatus, JiraUser, PickerIssue,
    PickerQuery, PickerSection, ProjectInsight, ProjectRef, RecentProject, SearchPage,
    DEFAULT_TIMEOUT,
};
