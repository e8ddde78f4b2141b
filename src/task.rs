//! Task data structure.
//!
//! This module defines the `Task` record: a single logged activity with an id,
//! a timestamp, a category and free-text content.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::TaskType;

/// Field names in their natural key order. CSV headers follow this order.
pub const FIELD_NAMES: [&str; 4] = ["id", "date", "type", "content"];

/// Timestamp layout used for newly created records.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One logged activity entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub content: String,
}

impl Task {
    /// Create a record with default type and empty content.
    pub fn new(id: u64, date: impl Into<String>) -> Self {
        Task {
            id,
            date: date.into(),
            kind: TaskType::default(),
            content: String::new(),
        }
    }

    /// Field values as strings, in natural key order.
    pub fn values(&self) -> [String; 4] {
        [
            self.id.to_string(),
            self.date.clone(),
            self.kind.as_str().to_string(),
            self.content.clone(),
        ]
    }

    /// Parsed form of `date`, if it matches one of the accepted layouts.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.date)
    }
}

/// Current local time in the record timestamp layout.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp string in any of the accepted layouts.
///
/// Date-only values resolve to midnight. RFC 3339 values carry an offset and
/// are converted to this machine's local time, the zone `now_timestamp` writes in.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let t = Task::new(3, "2024-01-01");
        assert_eq!(t.kind, TaskType::Other);
        assert!(t.content.is_empty());
        assert_eq!(t.values(), ["3", "2024-01-01", "other", ""].map(String::from));
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        let midnight = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(midnight.to_string(), "2024-01-02 00:00:00");
        assert_eq!(parse_timestamp("2024/01/02"), Some(midnight));
        let full = parse_timestamp("2024-01-02 09:30:00").unwrap();
        assert_eq!(parse_timestamp("2024-01-02T09:30:00"), Some(full));
        assert_eq!(parse_timestamp("2024/01/02 09:30:00"), Some(full));
        assert_eq!(
            parse_timestamp("2024-01-02T09:30:00+09:00"),
            parse_timestamp("2024-01-02T00:30:00Z")
        );
        assert_eq!(parse_timestamp("yesterday-ish"), None);
    }

    #[test]
    fn test_now_timestamp_parses_back() {
        assert!(parse_timestamp(&now_timestamp()).is_some());
    }

    #[test]
    fn test_serde_uses_type_key() {
        let t = Task::new(0, "2024-01-01");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"id":0,"date":"2024-01-01","type":"other","content":""}"#);
    }
}
