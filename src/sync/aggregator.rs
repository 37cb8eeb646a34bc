//! Issue Aggregator
//!
//! Fans out over JIRA queries, maps every returned issue and merges the
//! results into one batch with unique issue keys. Queries run one after
//! another; a failed query contributes nothing and the rest continue.

use super::mapper::{map_issue, FieldMapping, SyncRecord};
use super::timestamp::{format_update_time, parse_jira_timestamp, CalendarZone};
use crate::integrations::{updated_since_jql, IssueType, JiraApi, ProjectRef, SearchPage};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Accumulates mapped records, keeping the first record seen per issue key
#[derive(Debug, Default)]
struct RecordCollector {
    seen: HashSet<String>,
    records: Vec<SyncRecord>,
    duplicates: usize,
}

impl RecordCollector {
    fn extend(&mut self, page: &SearchPage, mapping: &FieldMapping) {
        for issue in &page.issues {
            if self.seen.insert(issue.key.clone()) {
                self.records.push(map_issue(issue, mapping));
            } else {
                self.duplicates += 1;
            }
        }
    }

    fn finish(self, source: &str) -> Vec<SyncRecord> {
        info!(
            source = source,
            records = self.records.len(),
            duplicates_dropped = self.duplicates,
            "Aggregation complete"
        );
        self.records
    }
}

/// Issue aggregator over any [`JiraApi`]
pub struct IssueAggregator<'a, A: JiraApi + ?Sized> {
    api: &'a A,
    mapping: FieldMapping,
    zone: CalendarZone,
}

impl<'a, A: JiraApi + ?Sized> IssueAggregator<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            mapping: FieldMapping::default(),
            zone: CalendarZone::default(),
        }
    }

    pub fn with_mapping(mut self, mapping: FieldMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Calendar used when formatting update timestamps for JQL
    pub fn with_zone(mut self, zone: CalendarZone) -> Self {
        self.zone = zone;
        self
    }

    /// Projects visible to the integration user; empty if the fetch fails
    pub async fn list_projects(&self) -> Vec<ProjectRef> {
        let projects = self.api.list_projects().await.unwrap_or_default();
        debug!(count = projects.len(), "Fetched JIRA projects");
        projects
    }

    /// Last-update timestamps of recent projects, formatted for JQL
    ///
    /// Repeated timestamps are collapsed. `None` when the insight fetch fails.
    pub async fn update_timestamps(&self) -> Option<Vec<String>> {
        let projects = self.api.recent_projects().await?;

        let mut seen = HashSet::new();
        let mut formatted = Vec::new();
        for project in &projects {
            let Some(raw) = project
                .insight
                .as_ref()
                .and_then(|i| i.last_issue_update_time.as_deref())
            else {
                continue;
            };

            match parse_jira_timestamp(raw) {
                Ok(ts) => {
                    let value = format_update_time(&ts, self.zone);
                    if seen.insert(value.clone()) {
                        formatted.push(value);
                    }
                }
                Err(e) => warn!(
                    project = project.key.as_deref().unwrap_or("?"),
                    error = %e,
                    "Skipping project with unreadable update time"
                ),
            }
        }

        debug!(timestamps = ?formatted, "Formatted project update times");
        Some(formatted)
    }

    /// Records for every issue updated since a recent project's last update
    ///
    /// Empty when the recent-projects fetch fails.
    pub async fn aggregate(&self) -> Vec<SyncRecord> {
        let mut collector = RecordCollector::default();
        self.collect_recent(&mut collector).await;
        collector.finish("recently_updated")
    }

    /// Records for every issue of the given types
    pub async fn aggregate_by_types(&self, types: &[IssueType]) -> Vec<SyncRecord> {
        let mut collector = RecordCollector::default();
        self.collect_types(types, &mut collector).await;
        collector.finish("issue_types")
    }

    /// Issue-type fan-out followed by the recently-updated pass, merged
    pub async fn aggregate_all(&self, types: &[IssueType]) -> Vec<SyncRecord> {
        let mut collector = RecordCollector::default();
        self.collect_types(types, &mut collector).await;
        self.collect_recent(&mut collector).await;
        collector.finish("all")
    }

    async fn collect_recent(&self, collector: &mut RecordCollector) {
        let Some(timestamps) = self.update_timestamps().await else {
            warn!("Recent project insight unavailable, no recently updated issues collected");
            return;
        };

        for timestamp in &timestamps {
            self.run_query(&updated_since_jql(timestamp), collector).await;
        }
    }

    async fn collect_types(&self, types: &[IssueType], collector: &mut RecordCollector) {
        for issue_type in types {
            self.run_query(&issue_type.jql(), collector).await;
        }
    }

    async fn run_query(&self, jql: &str, collector: &mut RecordCollector) {
        let Some(page) = self.api.search(jql).await else {
            return;
        };

        if page.is_truncated() {
            warn!(
                jql = %jql,
                total = page.total.unwrap_or_default(),
                returned = page.issues.len(),
                "JIRA search truncated to first page"
            );
        }

        debug!(jql = %jql, returned = page.issues.len(), "JIRA search complete");
        collector.extend(&page, &self.mapping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::RecentProject;
    use crate::sync::mapper::SyncStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory JIRA: canned responses keyed by JQL, `None` simulating failures
    #[derive(Default)]
    struct FakeJira {
        projects: Option<Vec<ProjectRef>>,
        recent: Option<Vec<RecentProject>>,
        searches: HashMap<String, Option<SearchPage>>,
        queries: Mutex<Vec<String>>,
    }

    impl FakeJira {
        fn with_recent(mut self, value: serde_json::Value) -> Self {
            self.recent = Some(serde_json::from_value(value).unwrap());
            self
        }

        fn with_search(mut self, jql: &str, value: Option<serde_json::Value>) -> Self {
            self.searches.insert(
                jql.to_string(),
                value.map(|v| serde_json::from_value(v).unwrap()),
            );
            self
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JiraApi for FakeJira {
        async fn list_projects(&self) -> Option<Vec<ProjectRef>> {
            self.projects.clone()
        }

        async fn recent_projects(&self) -> Option<Vec<RecentProject>> {
            self.recent.clone()
        }

        async fn search(&self, jql: &str) -> Option<SearchPage> {
            self.queries.lock().unwrap().push(jql.to_string());
            self.searches.get(jql).cloned().flatten()
        }
    }

    fn page(keys: &[(&str, &str)]) -> serde_json::Value {
        let issues: Vec<_> = keys
            .iter()
            .map(|(key, status)| {
                json!({
                    "key": key,
                    "fields": {"project": {"key": "OTP"}, "status": {"name": status}}
                })
            })
            .collect();
        json!({"total": issues.len(), "startAt": 0, "maxResults": 50, "issues": issues})
    }

    #[tokio::test]
    async fn test_empty_recent_projects_yields_nothing() {
        let fake = FakeJira::default().with_recent(json!([]));
        let records = IssueAggregator::new(&fake).aggregate().await;
        assert!(records.is_empty());
        assert!(fake.queries().is_empty());
    }

    #[tokio::test]
    async fn test_failed_insight_yields_nothing() {
        let fake = FakeJira::default();
        let aggregator = IssueAggregator::new(&fake);
        assert!(aggregator.update_timestamps().await.is_none());
        assert!(aggregator.aggregate().await.is_empty());
    }

    #[tokio::test]
    async fn test_recent_flow_queries_formatted_timestamps() {
        let fake = FakeJira::default()
            .with_recent(json!([
                {"key": "OTP", "insight": {"lastIssueUpdateTime": "2024-01-05T09:03:00.000+0000"}},
                {"key": "OPS", "insight": {"lastIssueUpdateTime": "2024-01-04T18:45:10.000+0000"}},
                {"key": "NEW"}
            ]))
            .with_search(
                "updated >= \"2024/01/05 09:03\"",
                Some(page(&[("OTP-1", "To Do")])),
            )
            .with_search(
                "updated >= \"2024/01/04 18:45\"",
                Some(page(&[("OTP-1", "To Do"), ("OPS-2", "In Progress")])),
            );

        let records = IssueAggregator::new(&fake)
            .with_zone(CalendarZone::utc())
            .aggregate()
            .await;

        assert_eq!(
            fake.queries(),
            vec![
                "updated >= \"2024/01/05 09:03\"".to_string(),
                "updated >= \"2024/01/04 18:45\"".to_string(),
            ]
        );

        let keys: Vec<_> = records.iter().map(|r| r.issue_key.as_str()).collect();
        assert_eq!(keys, vec!["OTP-1", "OPS-2"]);
        assert_eq!(records[1].status, SyncStatus::InProgress);
    }

    #[tokio::test]
    async fn test_failed_search_is_skipped() {
        let fake = FakeJira::default()
            .with_search("type = Epic", None)
            .with_search("type = Bug", Some(page(&[("OTP-3", "Done")])));

        let records = IssueAggregator::new(&fake)
            .aggregate_by_types(&[IssueType::Epic, IssueType::Bug])
            .await;

        assert_eq!(fake.queries(), vec!["type = Epic", "type = Bug"]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].issue_key, "OTP-3");
        assert_eq!(records[0].status, SyncStatus::Completed);
    }

    #[tokio::test]
    async fn test_duplicate_timestamps_queried_once() {
        let fake = FakeJira::default().with_recent(json!([
            {"key": "A", "insight": {"lastIssueUpdateTime": "2024-01-05T09:03:00Z"}},
            {"key": "B", "insight": {"lastIssueUpdateTime": "2024-01-05T09:03:30Z"}},
            {"key": "C", "insight": {"lastIssueUpdateTime": "not a date"}}
        ]));

        let timestamps = IssueAggregator::new(&fake)
            .with_zone(CalendarZone::utc())
            .update_timestamps()
            .await
            .unwrap();
        assert_eq!(timestamps, vec!["2024/01/05 09:03"]);
    }

    #[tokio::test]
    async fn test_aggregate_all_keeps_keys_unique() {
        let fake = FakeJira::default()
            .with_recent(json!([
                {"key": "OTP", "insight": {"lastIssueUpdateTime": "2024-01-05T09:03:00Z"}}
            ]))
            .with_search("type = Task", Some(page(&[("OTP-1", "To Do"), ("OTP-2", "In QA")])))
            .with_search(
                "updated >= \"2024/01/05 09:03\"",
                Some(page(&[("OTP-2", "Done"), ("OTP-4", "To Do")])),
            );

        let records = IssueAggregator::new(&fake)
            .with_zone(CalendarZone::utc())
            .aggregate_all(&[IssueType::Task])
            .await;

        let keys: HashSet<_> = records.iter().map(|r| r.issue_key.clone()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(keys.len(), 3);
        let otp2 = records.iter().find(|r| r.issue_key == "OTP-2").unwrap();
        assert_eq!(otp2.status, SyncStatus::InProgress);
    }

    #[tokio::test]
    async fn test_list_projects_failure_is_empty() {
        let fake = FakeJira::default();
        assert!(IssueAggregator::new(&fake).list_projects().await.is_empty());
    }
}
