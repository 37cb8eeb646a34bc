//! Update-time formatting for JQL
//!
//! JIRA reports `lastIssueUpdateTime` as an ISO timestamp; JQL date
//! comparisons want `yyyy/MM/dd HH:mm` in the user's calendar.

use crate::{Result, SyncError};
use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// `YYYY/MM/DD HH:mm`, zero padded, 24-hour clock
pub const UPDATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Calendar used to read the date/time fields of a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarZone {
    /// The process's local time zone
    #[default]
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl CalendarZone {
    pub fn utc() -> Self {
        CalendarZone::Fixed(Utc.fix())
    }

    /// Fixed zone east of UTC by `minutes`; `None` outside ±24h
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(CalendarZone::Fixed)
    }
}

/// Parse a JIRA timestamp
///
/// Accepts RFC 3339 (`2024-01-05T09:03:00Z`) and JIRA's own
/// `2024-01-05T09:03:00.000+0000` form.
pub fn parse_jira_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map_err(|e| SyncError::Parse(format!("Invalid JIRA timestamp '{}': {}", raw, e)))
}

/// Format `timestamp` with [`UPDATE_TIME_FORMAT`] in `zone`'s calendar
pub fn format_update_time(timestamp: &DateTime<FixedOffset>, zone: CalendarZone) -> String {
    match zone {
        CalendarZone::Local => timestamp
            .with_timezone(&Local)
            .format(UPDATE_TIME_FORMAT)
            .to_string(),
        CalendarZone::Fixed(offset) => timestamp
            .with_timezone(&offset)
            .format(UPDATE_TIME_FORMAT)
            .to_string(),
    }
}
