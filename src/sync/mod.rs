//! Issue synchronization pipeline
//!
//! Raw JIRA issues flow through the aggregator and the field mapper and come
//! out as flat [`SyncRecord`]s ready for the host's record-creation stage.
//!
//! # Flow
//!
//! 1. **Insight**: fetch recent projects and their last issue update time
//! 2. **Search**: query issues updated since each of those times (and,
//!    optionally, every issue of the configured types)
//! 3. **Map**: flatten each issue and normalize its status
//! 4. **Merge**: one batch, unique by issue key

pub mod aggregator;
pub mod driver;
pub mod mapper;
pub mod timestamp;

pub use aggregator::IssueAggregator;
pub use driver::{SyncBatch, SyncDriver, SyncMode, SyncOptions};
pub use mapper::{map_issue, normalize_status, FieldMapping, SyncRecord, SyncStatus};
pub use timestamp::{format_update_time, parse_jira_timestamp, CalendarZone};
