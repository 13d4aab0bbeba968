//! The event logger and its units of work.
//!
//! A `UnitOfWork` spans one request or batch job.  It owns the undo context
//! for that span, so an undo in progress can only ever stamp entries logged
//! through the same unit:
//!
//!   begin → [begin_undo] → log* → finish
//!
//! `finish` consumes the unit and clears the context.  A later unit always
//! starts with a fresh context, which makes leaking a stale back-reference
//! into an unrelated request impossible.

use std::{fmt, sync::Arc};

use tracing::{debug, info, warn};
use uuid::Uuid;

use partlog_contracts::{LogEntry, LogEntryId, LogError, LogResult, UndoMode, UserId};

use crate::{config::LoggerConfig, traits::LogStore, undo::UndoContext};

/// Unique identifier for one unit of work, attached to its log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitOfWorkId(pub Uuid);

impl UnitOfWorkId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UnitOfWorkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UnitOfWorkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Filters entries by configuration and appends the rest to a store.
pub struct EventLogger {
    store: Arc<dyn LogStore>,
    config: LoggerConfig,
}

impl EventLogger {
    pub fn new(store: Arc<dyn LogStore>, config: LoggerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &dyn LogStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Start a unit of work on behalf of `actor` (`None` for system or
    /// console actions).
    pub fn begin(&self, actor: Option<UserId>) -> UnitOfWork<'_> {
        let id = UnitOfWorkId::new();
        debug!(unit_of_work = %id, actor = ?actor.map(|u| u.0), "unit of work started");
        UnitOfWork {
            id,
            logger: self,
            actor,
            undo: UndoContext::new(),
            written: Vec::new(),
            dropped: 0,
        }
    }
}

/// What a finished unit of work wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOfWorkSummary {
    pub id: UnitOfWorkId,
    /// Ids of the appended entries, in append order.
    pub written: Vec<LogEntryId>,
    /// Entries the logger configuration filtered out.
    pub dropped: usize,
    /// The event that was being undone when the unit finished, if any.
    pub undone_event: Option<LogEntryId>,
}

/// One request or batch job writing to the log.
pub struct UnitOfWork<'a> {
    id: UnitOfWorkId,
    logger: &'a EventLogger,
    actor: Option<UserId>,
    undo: UndoContext,
    written: Vec<LogEntryId>,
    dropped: usize,
}

impl UnitOfWork<'_> {
    pub fn id(&self) -> UnitOfWorkId {
        self.id
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }

    pub fn undo_context(&self) -> &UndoContext {
        &self.undo
    }

    pub fn undo_context_mut(&mut self) -> &mut UndoContext {
        &mut self.undo
    }

    /// Arm the undo context with the stored event `event_id`.
    ///
    /// Returns the event so the caller can perform the reversal; every entry
    /// logged afterwards in this unit references it.
    ///
    /// # Errors
    ///
    /// `NotFound` if the store has no such entry, `InvalidArgument` if the
    /// entry's variant cannot be undone, and store errors unchanged.
    pub fn begin_undo(&mut self, event_id: LogEntryId, mode: UndoMode) -> LogResult<LogEntry> {
        let event = self
            .logger
            .store
            .get_by_id(event_id)?
            .ok_or(LogError::NotFound { id: event_id.0 })?;

        if !event.supports_undo() {
            return Err(LogError::invalid_argument(format!(
                "'{}' entries cannot be undone",
                event.type_tag()
            )));
        }

        info!(
            unit_of_work = %self.id,
            event_id = event_id.0,
            mode = %mode,
            "undo started"
        );

        self.undo.set_undo_mode(mode);
        self.undo.set_undone_event(Some(event.clone()));
        Ok(event)
    }

    /// Write one entry.
    ///
    /// Fills in the acting user, stamps the undo back-reference when an undo
    /// is in progress, and appends the entry unless the configuration
    /// filters it out.  Returns the new id, or `None` for filtered entries.
    ///
    /// # Errors
    ///
    /// Store failures propagate unchanged; nothing is retried.
    pub fn log(&mut self, mut entry: LogEntry) -> LogResult<Option<LogEntryId>> {
        if let Some(actor) = self.actor {
            entry.set_user_if_absent(actor);
        }

        let stamped = self.undo.stamp(&mut entry)?;

        if let Some(rejection) = self.logger.config.check(&entry) {
            debug!(
                unit_of_work = %self.id,
                entry_type = entry.type_tag(),
                level = %entry.level(),
                reason = %rejection,
                "log entry filtered"
            );
            self.dropped += 1;
            return Ok(None);
        }

        let entry_type = entry.type_tag().to_string();
        let id = self.logger.store.append(entry).map_err(|e| {
            warn!(
                unit_of_work = %self.id,
                entry_type = %entry_type,
                error = %e,
                "log entry append failed"
            );
            e
        })?;

        debug!(
            unit_of_work = %self.id,
            entry_id = id.0,
            entry_type = %entry_type,
            undo_stamped = stamped,
            "log entry appended"
        );

        self.written.push(id);
        Ok(Some(id))
    }

    /// End the unit of work and clear its undo context.
    pub fn finish(mut self) -> UnitOfWorkSummary {
        let undone_event = self.undo.undone_event().and_then(LogEntry::id);
        self.undo.clear_undone_event();

        info!(
            unit_of_work = %self.id,
            written = self.written.len(),
            dropped = self.dropped,
            "unit of work finished"
        );

        UnitOfWorkSummary {
            id: self.id,
            written: self.written,
            dropped: self.dropped,
            undone_event,
        }
    }
}
