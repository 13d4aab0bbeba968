//! In-memory implementation of `LogStore`.
//!
//! `InMemoryLogStore` keeps every record in a `Vec` behind a `Mutex`, so a
//! single store can be shared by many units of work through an `Arc`.  Ids
//! are assigned in append order starting at 1.
//!
//! Use `export_log()` / `to_json()` to snapshot the store and `import_json()`
//! to load a snapshot back; imports are schema-validated and chain-verified
//! before they are accepted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use partlog_contracts::{
    ElementRef, LogEntry, LogEntryId, LogError, LogResult, PersistedEntry,
};
use partlog_core::traits::LogStore;

use crate::{
    chain::{find_broken_link, hash_entry, verify_chain},
    record::{LogExport, StoredEntry},
    schema::validate_records,
};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Debug)]
pub(crate) struct InMemoryState {
    /// All records in append order.
    pub(crate) records: Vec<StoredEntry>,

    /// The `this_hash` of the last record, or `GENESIS_HASH` when empty.
    pub(crate) last_hash: String,
}

impl InMemoryState {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            last_hash: StoredEntry::GENESIS_HASH.to_string(),
        }
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An append-only log store backed by a SHA-256 hash chain.
#[derive(Clone, Debug)]
pub struct InMemoryLogStore {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState::empty())),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot all records written so far.
    pub fn export_log(&self) -> LogExport {
        let state = self.read();
        let terminal_hash = state
            .records
            .last()
            .map(|r| r.this_hash.clone())
            .unwrap_or_default();

        LogExport {
            entries: state.records.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that no stored record has been altered.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.read().records)
    }

    /// Serialize `export_log()` as pretty-printed JSON.
    pub fn to_json(&self) -> LogResult<String> {
        serde_json::to_string_pretty(&self.export_log()).map_err(|e| LogError::Serialization {
            reason: format!("failed to encode log export: {}", e),
        })
    }

    /// Rebuild a store from the JSON produced by `to_json()`.
    ///
    /// # Errors
    ///
    /// - `Serialization` if the document is not an export
    /// - `SchemaValidation` if any record violates the persisted entry schema
    /// - `IntegrityViolation` if the hash chain or terminal hash is broken
    pub fn import_json(json: &str) -> LogResult<Self> {
        let document: serde_json::Value =
            serde_json::from_str(json).map_err(|e| LogError::Serialization {
                reason: format!("log export is not valid JSON: {}", e),
            })?;

        let records = document
            .get("entries")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| LogError::Serialization {
                reason: "log export has no 'entries' array".to_string(),
            })?;
        validate_records(records)?;

        let export: LogExport =
            serde_json::from_value(document).map_err(|e| LogError::Serialization {
                reason: format!("failed to decode log export: {}", e),
            })?;

        if let Some(position) = find_broken_link(&export.entries) {
            warn!(position, "imported log failed chain verification");
            return Err(LogError::IntegrityViolation {
                reason: format!("hash chain broken at record {}", position),
            });
        }

        let last_hash = export
            .entries
            .last()
            .map(|r| r.this_hash.clone())
            .unwrap_or_else(|| StoredEntry::GENESIS_HASH.to_string());
        let expected_terminal = export
            .entries
            .last()
            .map(|r| r.this_hash.as_str())
            .unwrap_or_default();
        if export.terminal_hash != expected_terminal {
            return Err(LogError::IntegrityViolation {
                reason: "terminal hash does not match the last record".to_string(),
            });
        }

        info!(entry_count = export.entries.len(), "log imported");

        Ok(Self {
            state: Arc::new(Mutex::new(InMemoryState {
                records: export.entries,
                last_hash,
            })),
        })
    }

    /// Lock for reading.  A poisoned lock still holds consistent records,
    /// since appends only push fully built records.
    fn read(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode_all<'a>(records: impl Iterator<Item = &'a StoredEntry>) -> Vec<LogEntry> {
        records.map(|r| LogEntry::from(r.entry.clone())).collect()
    }
}

// ── LogStore impl ─────────────────────────────────────────────────────────────

impl LogStore for InMemoryLogStore {
    /// Assign the next id, chain the record to its predecessor, and append.
    fn append(&self, mut entry: LogEntry) -> LogResult<LogEntryId> {
        let mut state = self.state.lock().map_err(|e| LogError::StoreFailure {
            reason: format!("log state lock poisoned: {}", e),
        })?;

        let sequence = state.records.len() as u64;
        let id = LogEntryId(sequence + 1);
        entry.assign_id(id)?;

        let record = PersistedEntry::from(&entry);
        let prev_hash = state.last_hash.clone();
        let this_hash = hash_entry(sequence, &record, &prev_hash)?;

        debug!(
            entry_id = id.0,
            entry_type = %record.type_tag,
            level = %record.level,
            "log entry stored"
        );

        state.records.push(StoredEntry {
            sequence,
            entry: record,
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.last_hash = this_hash;

        Ok(id)
    }

    fn get_by_id(&self, id: LogEntryId) -> LogResult<Option<LogEntry>> {
        let state = self.read();
        let record = id
            .0
            .checked_sub(1)
            .and_then(|position| usize::try_from(position).ok())
            .and_then(|position| state.records.get(position));
        Ok(record.map(|r| LogEntry::from(r.entry.clone())))
    }

    fn list_by_target(&self, target: &ElementRef) -> LogResult<Vec<LogEntry>> {
        let state = self.read();
        Ok(Self::decode_all(state.records.iter().filter(|r| {
            r.entry.target_id == Some(target.id)
                && r.entry.target_type.as_deref() == Some(target.element_type.as_str())
        })))
    }

    fn entries(&self) -> LogResult<Vec<LogEntry>> {
        Ok(Self::decode_all(self.read().records.iter()))
    }
}
