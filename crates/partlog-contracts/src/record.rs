//! The flat storage shape of a log entry.
//!
//! `PersistedEntry` is what stores write and what `LogEntry` serializes as:
//!
//! ```json
//! { "id": 7, "timestamp": "...", "level": "info", "type": "element_created",
//!   "target_type": "part", "target_id": 12, "user_id": 1,
//!   "extra": { "i": "5", "m": "restocked", "u": 3, "um": 2 } }
//! ```
//!
//! Conversion to and from `LogEntry` is lossless for every reserved key,
//! for unknown keys, and for entries of unknown type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    element::{ElementRef, ElementType, LogEntryId, UserId},
    entry::LogEntry,
    extra::{passthrough, Extra},
    kind::LogEntryKind,
    level::LogLevel,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    /// Absent until the entry has been appended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    pub timestamp: DateTime<Utc>,

    pub level: LogLevel,

    /// Discriminator selecting the payload variant.
    #[serde(rename = "type")]
    pub type_tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,

    #[serde(default)]
    pub extra: Extra,
}

impl From<&LogEntry> for PersistedEntry {
    fn from(entry: &LogEntry) -> Self {
        // Passthrough keys first so the typed payload wins on conflicts.
        let mut extra = entry.passthrough.clone();
        extra.extend(entry.kind.encode());

        Self {
            id: entry.id.map(|id| id.0),
            timestamp: entry.timestamp,
            level: entry.level,
            type_tag: entry.kind.type_tag().to_string(),
            target_type: entry.target.as_ref().map(|t| t.element_type.0.clone()),
            target_id: entry.target.as_ref().map(|t| t.id),
            user_id: entry.user.map(|u| u.0),
            extra,
        }
    }
}

impl From<LogEntry> for PersistedEntry {
    fn from(entry: LogEntry) -> Self {
        Self::from(&entry)
    }
}

impl From<PersistedEntry> for LogEntry {
    fn from(record: PersistedEntry) -> Self {
        let kind = LogEntryKind::decode(&record.type_tag, &record.extra);
        let passthrough = passthrough(&record.extra, &kind.encode());

        let target = match (record.target_type, record.target_id) {
            (Some(element_type), Some(id)) => Some(ElementRef {
                element_type: ElementType(element_type),
                id,
            }),
            _ => None,
        };

        Self {
            id: record.id.map(LogEntryId),
            timestamp: record.timestamp,
            level: record.level,
            target,
            user: record.user_id.map(UserId),
            kind,
            passthrough,
        }
    }
}
