//! Per-unit-of-work tracking of the event currently being undone.
//!
//! While a controller reverses an earlier event, every entry logged in the
//! same unit of work points back at that event.  The context is owned by a
//! single `UnitOfWork` and cleared when it finishes; it is never shared
//! between units of work.

use partlog_contracts::{LogEntry, LogError, LogResult, UndoMode};

/// The undo/revert state of one unit of work.
#[derive(Debug, Clone, Default)]
pub struct UndoContext {
    mode: UndoMode,
    undone_event: Option<LogEntry>,
}

impl UndoContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mode by name.  Only `"undo"` and `"revert"` are accepted.
    pub fn set_mode(&mut self, mode: &str) -> LogResult<()> {
        self.mode = mode.parse()?;
        Ok(())
    }

    pub fn set_undo_mode(&mut self, mode: UndoMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> UndoMode {
        self.mode
    }

    /// Set, or with `None` clear, the event being undone.
    pub fn set_undone_event(&mut self, event: Option<LogEntry>) {
        self.undone_event = event;
    }

    pub fn undone_event(&self) -> Option<&LogEntry> {
        self.undone_event.as_ref()
    }

    pub fn clear_undone_event(&mut self) {
        self.undone_event = None;
    }

    /// True while an undo or revert is in progress.  This reflects whether
    /// an event is tracked, not the value of `mode`.
    pub fn is_undo(&self) -> bool {
        self.undone_event.is_some()
    }

    /// Point `entry` at the tracked event, using the current mode.
    ///
    /// Does nothing when no undo is in progress, when the entry's variant
    /// has no undo semantics, or when the entry already references an event.
    /// Returns whether the entry was stamped.
    pub fn stamp(&self, entry: &mut LogEntry) -> LogResult<bool> {
        let Some(event) = &self.undone_event else {
            return Ok(false);
        };
        let Some(target) = entry.as_undo_reference_mut() else {
            return Ok(false);
        };
        if target.is_undo_event() {
            return Ok(false);
        }

        let event_id = event.id().ok_or_else(|| {
            LogError::invalid_argument("the undone event has not been persisted")
        })?;
        target.set_undo_reference(event_id, self.mode);
        Ok(true)
    }
}
