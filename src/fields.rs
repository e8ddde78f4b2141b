//! Enumerations and field types for task records.
//!
//! This module defines the fixed set of task categories and the names of the
//! editable record fields, together with their parsing and display helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Classification of a logged activity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Development,
    Meeting,
    Review,
    Research,
    Break,
    Finish,
    #[default]
    Other,
}

impl TaskType {
    /// Every type in display order.
    pub const ALL: [TaskType; 7] = [
        TaskType::Development,
        TaskType::Meeting,
        TaskType::Review,
        TaskType::Research,
        TaskType::Break,
        TaskType::Finish,
        TaskType::Other,
    ];

    /// Wire name used in CSV and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::Development => "development",
            TaskType::Meeting => "meeting",
            TaskType::Review => "review",
            TaskType::Research => "research",
            TaskType::Break => "break",
            TaskType::Finish => "finish",
            TaskType::Other => "other",
        }
    }

    /// Next type in display order, wrapping around.
    pub fn next(self) -> TaskType {
        let pos = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    /// Previous type in display order, wrapping around.
    pub fn prev(self) -> TaskType {
        let pos = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(pos + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        TaskType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| format!("unknown task type '{}'", s.trim()))
    }
}

/// Editable fields of a task record. The id is never edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Type,
    Content,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Type => "type",
            Field::Content => "content",
        }
    }

    /// Column to the right, saturating at the last field.
    pub fn right(self) -> Field {
        match self {
            Field::Date => Field::Type,
            Field::Type | Field::Content => Field::Content,
        }
    }

    /// Column to the left, saturating at the first field.
    pub fn left(self) -> Field {
        match self {
            Field::Content => Field::Type,
            Field::Type | Field::Date => Field::Date,
        }
    }
}
