//! Scripted inventory session.
//!
//! A small in-memory parts inventory whose mutating operations each run in
//! their own unit of work and log what they did.  The session walks through
//! every entry variant, then undoes a deletion and reverts an edit so the
//! resulting log shows undo back-references.
//!
//! All data here is fictional and nothing outside the process is contacted.

use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;
use tracing::info;

use partlog_contracts::{
    ElementRef, LogEntry, LogEntryId, LogError, LogResult, LoggableElement, SecurityEventType,
    UndoMode, UserId,
};
use partlog_core::{EventLogger, LoggerConfig, UnitOfWork, UnitOfWorkSummary};
use partlog_store::InMemoryLogStore;

const OPERATOR: UserId = UserId(1);
const OPERATOR_ADDRESS: &str = "203.0.113.42";
const BOM_COLLECTION: &str = "bom_entries";

// ── Domain ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub id: u64,
    pub name: String,
    pub instock: i64,
}

impl LoggableElement for Part {
    fn element_ref(&self) -> ElementRef {
        ElementRef::new("part", self.id)
    }

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// A project whose bill of materials references parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub bom: Vec<u64>,
}

impl LoggableElement for Project {
    fn element_ref(&self) -> ElementRef {
        ElementRef::new("project", self.id)
    }

    fn display_name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("part {id} not found")]
    UnknownPart { id: u64 },

    #[error("cannot withdraw {requested} of part {id}: only {available} in stock")]
    InsufficientStock { id: u64, requested: i64, available: i64 },

    #[error("log error: {0}")]
    Log(#[from] LogError),
}

type InventoryResult<T> = Result<T, InventoryError>;

/// Log errors pass through unchanged; inventory rule violations become
/// `InvalidArgument`.
impl From<InventoryError> for LogError {
    fn from(error: InventoryError) -> Self {
        match error {
            InventoryError::Log(inner) => inner,
            other => LogError::invalid_argument(format!("inventory session failed: {}", other)),
        }
    }
}

/// Parts and projects, with every mutation logged through `logger`.
pub struct Inventory {
    logger: EventLogger,
    parts: BTreeMap<u64, Part>,
    projects: BTreeMap<u64, Project>,
    next_id: u64,
}

impl Inventory {
    pub fn new(logger: EventLogger) -> Self {
        Self {
            logger,
            parts: BTreeMap::new(),
            projects: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[cfg(test)]
    pub fn part(&self, id: u64) -> Option<&Part> {
        self.parts.get(&id)
    }

    fn unit(&self) -> UnitOfWork<'_> {
        self.logger.begin(Some(OPERATOR))
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ── Operations ────────────────────────────────────────────────────────────

    pub fn create_part(&mut self, name: &str, instock: i64) -> InventoryResult<u64> {
        let part = Part {
            id: self.allocate_id(),
            name: name.to_string(),
            instock,
        };
        let mut unit = self.unit();
        unit.log(LogEntry::element_created(&part, Some(instock.to_string())))?;
        unit.finish();

        let id = part.id;
        self.parts.insert(id, part);
        Ok(id)
    }

    pub fn rename_part(
        &mut self,
        id: u64,
        name: &str,
        reason: &str,
    ) -> InventoryResult<Option<LogEntryId>> {
        let part = self.parts.get(&id).ok_or(InventoryError::UnknownPart { id })?;

        let mut entry = LogEntry::element_edited(part, ["name"]);
        entry.set_comment(reason)?;
        let mut unit = self.unit();
        let logged = unit.log(entry)?;
        unit.finish();

        if let Some(part) = self.parts.get_mut(&id) {
            part.name = name.to_string();
        }
        Ok(logged)
    }

    pub fn withdraw(&mut self, id: u64, amount: i64, comment: &str) -> InventoryResult<()> {
        let part = self.parts.get(&id).ok_or(InventoryError::UnknownPart { id })?;
        if amount > part.instock {
            return Err(InventoryError::InsufficientStock {
                id,
                requested: amount,
                available: part.instock,
            });
        }

        let entry = LogEntry::instock_changed(part, part.instock, part.instock - amount, comment);
        let mut unit = self.unit();
        unit.log(entry)?;
        unit.finish();

        if let Some(part) = self.parts.get_mut(&id) {
            part.instock -= amount;
        }
        Ok(())
    }

    pub fn create_project(&mut self, name: &str, bom: Vec<u64>) -> u64 {
        let id = self.allocate_id();
        self.projects.insert(
            id,
            Project {
                id,
                name: name.to_string(),
                bom,
            },
        );
        id
    }

    /// Drop `part_id` from the project's bill of materials.
    pub fn remove_from_bom(&mut self, project_id: u64, part_id: u64) -> InventoryResult<()> {
        let part = self
            .parts
            .get(&part_id)
            .ok_or(InventoryError::UnknownPart { id: part_id })?;
        let Some(project) = self.projects.get(&project_id) else {
            return Ok(());
        };

        let entry = LogEntry::collection_element_deleted(project, BOM_COLLECTION, part);
        let mut unit = self.unit();
        unit.log(entry)?;
        unit.finish();

        if let Some(project) = self.projects.get_mut(&project_id) {
            project.bom.retain(|id| *id != part_id);
        }
        Ok(())
    }

    pub fn delete_part(&mut self, id: u64) -> InventoryResult<Option<LogEntryId>> {
        let part = self.parts.remove(&id).ok_or(InventoryError::UnknownPart { id })?;

        let mut unit = self.unit();
        let logged = unit.log(LogEntry::element_deleted(&part))?;
        unit.finish();
        Ok(logged)
    }

    /// Recreate the part removed by the deletion `event_id`.
    pub fn undo_deletion(&mut self, event_id: LogEntryId) -> InventoryResult<UnitOfWorkSummary> {
        // Borrows only `logger`: `parts` is mutated while the unit is open.
        let mut unit = self.logger.begin(Some(OPERATOR));
        let event = unit.begin_undo(event_id, UndoMode::Undo)?;

        let target = event
            .target()
            .cloned()
            .ok_or_else(|| LogError::invalid_argument("deletion entry has no target"))?;
        let name = match event.kind() {
            partlog_contracts::LogEntryKind::ElementDeleted(deleted) => {
                deleted.old_name().unwrap_or("restored part").to_string()
            }
            _ => return Err(LogError::invalid_argument("not a deletion entry").into()),
        };

        let part = Part {
            id: target.id,
            name,
            instock: 0,
        };
        unit.log(LogEntry::element_created(&part, None))?;
        self.parts.insert(part.id, part);
        Ok(unit.finish())
    }

    /// Restore the name a part had before the edit `event_id`.
    pub fn revert_edit(
        &mut self,
        event_id: LogEntryId,
        previous_name: &str,
    ) -> InventoryResult<UnitOfWorkSummary> {
        // Borrows only `logger`, as in `undo_deletion`.
        let mut unit = self.logger.begin(Some(OPERATOR));
        let event = unit.begin_undo(event_id, UndoMode::Revert)?;
        let id = event
            .target()
            .map(|t| t.id)
            .ok_or_else(|| LogError::invalid_argument("edit entry has no target"))?;
        let part = self.parts.get_mut(&id).ok_or(InventoryError::UnknownPart { id })?;

        unit.log(LogEntry::element_edited(&*part, ["name"]))?;
        part.name = previous_name.to_string();
        Ok(unit.finish())
    }

    // ── Session and system events ─────────────────────────────────────────────

    fn log_once(&self, entry: LogEntry) -> LogResult<Option<LogEntryId>> {
        let mut unit = self.unit();
        let logged = unit.log(entry)?;
        unit.finish();
        Ok(logged)
    }

    pub fn login(&self) -> LogResult<Option<LogEntryId>> {
        let anonymize = self.logger.config().anonymize_ip_addresses;
        self.log_once(LogEntry::user_login(OPERATOR, OPERATOR_ADDRESS, anonymize))
    }

    pub fn logout(&self) -> LogResult<Option<LogEntryId>> {
        let anonymize = self.logger.config().anonymize_ip_addresses;
        self.log_once(LogEntry::user_logout(OPERATOR, OPERATOR_ADDRESS, anonymize))
    }

    pub fn security_event(&self, event_type: SecurityEventType) -> LogResult<Option<LogEntryId>> {
        let anonymize = self.logger.config().anonymize_ip_addresses;
        self.log_once(LogEntry::security_event(event_type, OPERATOR_ADDRESS, anonymize))
    }

    pub fn deny(&self, message: &str) -> LogResult<Option<LogEntryId>> {
        self.log_once(LogEntry::user_not_allowed(message))
    }

    pub fn migrated(&self, from: &str, to: &str) -> LogResult<Option<LogEntryId>> {
        self.log_once(LogEntry::database_updated(from, to, true))
    }

    /// Log an operation failure the way a request handler would.
    pub fn record_failure(&self, error: &InventoryError) -> LogResult<Option<LogEntryId>> {
        self.log_once(LogEntry::exception(error))
    }
}

// ── Scripted session ──────────────────────────────────────────────────────────

/// Run the scripted session against a fresh store and return the store.
pub fn run_session(config: LoggerConfig) -> InventoryResult<Arc<InMemoryLogStore>> {
    let store = Arc::new(InMemoryLogStore::new());
    let logger = EventLogger::new(store.clone(), config);
    let mut inventory = Inventory::new(logger);

    inventory.migrated("1.4.0", "1.5.0")?;
    inventory.login()?;

    let op_amp = inventory.create_part("LM358 op-amp", 25)?;
    let resistor = inventory.create_part("Resistor 10k", 200)?;
    let project = inventory.create_project("Preamp rev B", vec![op_amp, resistor]);

    let renamed = inventory.rename_part(resistor, "Resistor 10k 1%", "tolerance added to name")?;
    inventory.withdraw(op_amp, 4, "used in project Preamp rev B")?;
    inventory.remove_from_bom(project, resistor)?;
    let deleted = inventory.delete_part(resistor)?;

    if let Some(deleted) = deleted {
        let summary = inventory.undo_deletion(deleted)?;
        info!(written = summary.written.len(), "deletion undone");
    }
    if let Some(renamed) = renamed {
        inventory.revert_edit(renamed, "Resistor 10k")?;
    }

    if let Err(error) = inventory.withdraw(op_amp, 500, "prototype batch") {
        inventory.record_failure(&error)?;
    }

    inventory.deny("Access to the admin settings was denied")?;
    inventory.security_event(SecurityEventType::PasswordChanged)?;
    inventory.logout()?;

    Ok(store)
}

#[cfg(test)]
mod tests {
    use partlog_contracts::{LogEntryKind, UndoMode};
    use partlog_core::traits::LogStore;

    use super::*;

    /// The session logs every variant and keeps the chain intact.
    #[test]
    fn session_logs_every_variant() {
        let store = run_session(LoggerConfig::default()).unwrap();
        let entries = store.entries().unwrap();

        let mut tags: Vec<&str> = entries.iter().map(LogEntry::type_tag).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(
            tags,
            vec![
                "collection_element_deleted",
                "database_updated",
                "element_created",
                "element_deleted",
                "element_edited",
                "exception",
                "instock_changed",
                "security_generic",
                "user_login",
                "user_logout",
                "user_not_allowed",
            ]
        );
        assert!(store.verify_integrity());
    }

    /// The recreated part references the deletion it undoes, and the revert
    /// references the original edit.
    #[test]
    fn session_records_undo_and_revert() {
        let store = run_session(LoggerConfig::default()).unwrap();
        let entries = store.entries().unwrap();

        let undo_refs: Vec<(LogEntryId, UndoMode, &str)> = entries
            .iter()
            .filter_map(|e| {
                let undo = e.as_undo_reference()?;
                Some((undo.undo_event_id()?, undo.undo_mode(), e.type_tag()))
            })
            .collect();
        assert_eq!(undo_refs.len(), 2);

        let (deleted, mode, tag) = undo_refs[0];
        assert_eq!((mode, tag), (UndoMode::Undo, "element_created"));
        let deletion = store.get_by_id(deleted).unwrap().unwrap();
        assert!(matches!(deletion.kind(), LogEntryKind::ElementDeleted(_)));

        let (edited, mode, tag) = undo_refs[1];
        assert_eq!((mode, tag), (UndoMode::Revert, "element_edited"));
        let edit = store.get_by_id(edited).unwrap().unwrap();
        assert_eq!(edit.as_commented().and_then(|c| c.comment()), Some("tolerance added to name"));
    }

    #[test]
    fn blacklisted_types_are_not_written() {
        let config = LoggerConfig {
            blacklist: vec!["user_login".to_string(), "user_logout".to_string()],
            ..LoggerConfig::default()
        };
        let store = run_session(config).unwrap();

        assert!(store
            .entries()
            .unwrap()
            .iter()
            .all(|e| !e.type_tag().starts_with("user_log")));
    }

    #[test]
    fn overdrawn_withdrawal_is_rejected() {
        let logger = EventLogger::new(Arc::new(InMemoryLogStore::new()), LoggerConfig::default());
        let mut inventory = Inventory::new(logger);
        let id = inventory.create_part("Crystal 16MHz", 3).unwrap();

        let err = inventory.withdraw(id, 5, "").unwrap_err();
        assert!(matches!(err, InventoryError::InsufficientStock { available: 3, .. }));
        assert_eq!(inventory.part(id).unwrap().instock, 3);
    }

    /// Log errors keep their class when the session error is reported.
    #[test]
    fn log_errors_pass_through_unchanged() {
        let config = LogError::ConfigError {
            reason: "min_level 'loud' is not a level".to_string(),
        };
        let reported = LogError::from(InventoryError::from(config));
        assert!(matches!(
            reported,
            LogError::ConfigError { ref reason } if reason.contains("loud")
        ));

        let reported = LogError::from(InventoryError::UnknownPart { id: 9 });
        assert!(matches!(
            reported,
            LogError::InvalidArgument { ref reason } if reason.contains("part 9 not found")
        ));
    }
}
