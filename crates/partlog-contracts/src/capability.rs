//! Capabilities shared by several log entry variants.
//!
//! A variant opts into free-text comments (`HasComment`) and into pointing
//! back at the entry it undoes (`HasUndoReference`).  Consumers such as the
//! formatter ask a `LogEntry` for the capability instead of matching on the
//! concrete variant.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    element::LogEntryId,
    entry::LogEntry,
    error::{LogError, LogResult},
};

/// How an earlier event is being reversed.
///
/// Stored as an integer: 1 for `Undo`, 2 for `Revert`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndoMode {
    /// Reverse exactly the referenced event.
    #[default]
    Undo,
    /// Restore the state the element had at the referenced event.
    Revert,
}

impl UndoMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Revert => "revert",
        }
    }

    /// The integer code written to storage.
    pub const fn code(self) -> i64 {
        match self {
            Self::Undo => 1,
            Self::Revert => 2,
        }
    }

    /// Decode a stored integer code.  Returns `None` for anything but 1 or 2.
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Undo),
            2 => Some(Self::Revert),
            _ => None,
        }
    }
}

impl fmt::Display for UndoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UndoMode {
    type Err = LogError;

    /// Accepts exactly `"undo"` and `"revert"`.
    fn from_str(s: &str) -> LogResult<Self> {
        match s {
            "undo" => Ok(Self::Undo),
            "revert" => Ok(Self::Revert),
            other => Err(LogError::invalid_argument(format!(
                "undo mode must be 'undo' or 'revert', got '{}'",
                other
            ))),
        }
    }
}

/// The back-reference fields of an entry that undoes an earlier one.
///
/// An entry is an undo event exactly when a back-reference is stored.
/// `event` holds it when it is a valid entry id; any other non-null stored
/// value is kept in `raw_event` and written back unchanged.  `mode` is `None`
/// when storage held no recognizable code, in which case readers see
/// `UndoMode::Undo`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoInfo {
    pub(crate) event: Option<LogEntryId>,
    pub(crate) raw_event: Option<Value>,
    pub(crate) mode: Option<UndoMode>,
}

/// Variants that carry a free-text comment.
pub trait HasComment {
    fn comment(&self) -> Option<&str>;

    fn set_comment(&mut self, comment: Option<String>);

    fn has_comment(&self) -> bool {
        self.comment().is_some()
    }
}

/// Variants that can reference the event they undo or revert.
pub trait HasUndoReference {
    fn undo_info(&self) -> &UndoInfo;

    fn undo_info_mut(&mut self) -> &mut UndoInfo;

    /// True iff a back-reference is stored, regardless of the mode.
    fn is_undo_event(&self) -> bool {
        let info = self.undo_info();
        info.event.is_some() || info.raw_event.is_some()
    }

    /// The referenced entry, when the stored back-reference is a valid id.
    fn undo_event_id(&self) -> Option<LogEntryId> {
        self.undo_info().event
    }

    /// A stored back-reference that is not a valid entry id, as text.
    fn raw_undo_event(&self) -> Option<String> {
        self.undo_info().raw_event.as_ref().map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// The stored mode, defaulting to `Undo` when absent or unrecognized.
    fn undo_mode(&self) -> UndoMode {
        self.undo_info().mode.unwrap_or_default()
    }

    /// Record a typed back-reference.
    fn set_undo_reference(&mut self, event: LogEntryId, mode: UndoMode) {
        let info = self.undo_info_mut();
        info.event = Some(event);
        info.raw_event = None;
        info.mode = Some(mode);
    }

    /// Record that this entry undoes `event` using the mode named by `mode`.
    ///
    /// Fails with `InvalidArgument` when `mode` is neither `"undo"` nor
    /// `"revert"`, or when `event` has not been persisted yet.  On failure
    /// the existing back-reference is left untouched.
    fn set_undone_event(&mut self, event: &LogEntry, mode: &str) -> LogResult<()> {
        let mode: UndoMode = mode.parse()?;
        let id = event.id().ok_or_else(|| {
            LogError::invalid_argument("the undone event has not been persisted")
        })?;
        self.set_undo_reference(id, mode);
        Ok(())
    }
}
