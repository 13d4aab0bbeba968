//! # partlog-store
//!
//! Append-only, SHA-256 hash-chained log store for partlog.
//!
//! ## Overview
//!
//! Every appended `LogEntry` is assigned the next id and stored as a
//! `StoredEntry` that links to the previous record via its SHA-256 hash.
//! Editing any stored record breaks the chain and is detected by
//! `verify_chain`.  Exports are plain JSON and are schema-validated and
//! chain-verified again on import.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partlog_store::InMemoryLogStore;
//! use partlog_core::traits::LogStore;
//!
//! let store = InMemoryLogStore::new();
//! let id = store.append(LogEntry::element_created(&part, None))?;
//!
//! assert!(store.verify_integrity());
//! let restored = InMemoryLogStore::import_json(&store.to_json()?)?;
//! ```

pub mod chain;
pub mod memory;
pub mod record;
pub mod schema;

pub use chain::{find_broken_link, hash_entry, verify_chain};
pub use memory::InMemoryLogStore;
pub use record::{LogExport, StoredEntry};
pub use schema::{persisted_entry_schema, validate_records};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use partlog_contracts::{ElementRef, LogEntry, LogEntryId, LogError, UndoMode, UserId};
    use partlog_core::traits::LogStore;

    use super::{verify_chain, InMemoryLogStore, StoredEntry};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn part(id: u64) -> ElementRef {
        ElementRef::new("part", id)
    }

    /// A store holding three entries: two for part 1, one for part 2.
    fn filled_store() -> InMemoryLogStore {
        let store = InMemoryLogStore::new();
        store
            .append(LogEntry::element_created(&part(1), Some("5".to_string())))
            .unwrap();
        store
            .append(LogEntry::element_edited(&part(2), ["name"]).with_user(UserId(4)))
            .unwrap();
        store
            .append(LogEntry::instock_changed(&part(1), 5, 3, "used in build"))
            .unwrap();
        store
    }

    // ── Chain ─────────────────────────────────────────────────────────────────

    /// Appending three entries and verifying produces a valid chain.
    #[test]
    fn test_hash_chain_integrity() {
        let store = filled_store();
        assert!(store.verify_integrity(), "chain must be valid after sequential appends");
    }

    /// Mutating any stored record breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let store = filled_store();

        {
            let mut state = store.state.lock().unwrap();
            state.records[0]
                .entry
                .extra
                .insert("i".to_string(), json!("500"));
        }

        assert!(
            !store.verify_integrity(),
            "chain must detect tampering with a stored record"
        );
    }

    /// The first record's `prev_hash` must equal `StoredEntry::GENESIS_HASH`.
    #[test]
    fn test_genesis_hash() {
        let store = InMemoryLogStore::new();
        store.append(LogEntry::element_deleted(&part(9))).unwrap();

        let log = store.export_log();
        assert_eq!(log.entries.len(), 1);
        assert_eq!(log.entries[0].prev_hash, StoredEntry::GENESIS_HASH);
    }

    /// Sequences are 0, 1, 2 and ids are 1, 2, 3 with no gaps.
    #[test]
    fn test_sequence_and_ids_monotonic() {
        let log = filled_store().export_log();
        for (idx, record) in log.entries.iter().enumerate() {
            assert_eq!(record.sequence, idx as u64);
            assert_eq!(record.entry.id, Some(idx as u64 + 1));
        }
    }

    /// `export_log()` contains every record in order and ends at the
    /// terminal hash.
    #[test]
    fn test_export_log() {
        let log = filled_store().export_log();

        assert_eq!(log.entries.len(), 3);
        assert_eq!(log.terminal_hash, log.entries.last().unwrap().this_hash);
        assert!(verify_chain(&log.entries));
    }

    /// An empty chain is valid.
    #[test]
    fn test_verify_empty() {
        let store = InMemoryLogStore::new();
        assert!(store.verify_integrity());
        assert!(verify_chain(&[]));
        assert_eq!(store.export_log().terminal_hash, "");
    }

    // ── LogStore ──────────────────────────────────────────────────────────────

    /// `append` returns the assigned id and `get_by_id` reads it back.
    #[test]
    fn test_append_then_get_by_id() {
        let store = InMemoryLogStore::new();
        let id = store
            .append(LogEntry::element_created(&part(1), None).with_user(UserId(2)))
            .unwrap();
        assert_eq!(id, LogEntryId(1));

        let stored = store.get_by_id(id).unwrap().expect("entry must exist");
        assert_eq!(stored.id(), Some(id));
        assert_eq!(stored.user(), Some(UserId(2)));
        assert_eq!(stored.target(), Some(&part(1)));
        assert_eq!(stored.type_tag(), "element_created");
    }

    /// Unknown ids, including 0, resolve to `None`.
    #[test]
    fn test_get_by_id_missing() {
        let store = filled_store();
        assert!(store.get_by_id(LogEntryId(0)).unwrap().is_none());
        assert!(store.get_by_id(LogEntryId(42)).unwrap().is_none());
    }

    /// An entry that already carries an id cannot be appended again.
    #[test]
    fn test_reappend_rejected() {
        let store = filled_store();
        let existing = store.get_by_id(LogEntryId(1)).unwrap().unwrap();

        let err = store.append(existing).unwrap_err();
        assert!(matches!(err, LogError::InvalidArgument { .. }));
        assert_eq!(store.len(), 3);
    }

    /// `list_by_target` keeps append order and matches type and id.
    #[test]
    fn test_list_by_target() {
        let store = filled_store();
        store
            .append(LogEntry::element_deleted(&ElementRef::new("footprint", 1)))
            .unwrap();

        let entries = store.list_by_target(&part(1)).unwrap();
        let ids: Vec<_> = entries.iter().filter_map(LogEntry::id).collect();
        assert_eq!(ids, vec![LogEntryId(1), LogEntryId(3)]);
    }

    /// Undo references survive storage.
    #[test]
    fn test_undo_reference_survives_storage() {
        let store = InMemoryLogStore::new();
        let deleted_id = store.append(LogEntry::element_deleted(&part(5))).unwrap();
        let deleted = store.get_by_id(deleted_id).unwrap().unwrap();

        let mut restored = LogEntry::element_created(&part(5), None);
        restored.set_undone_event(&deleted, "revert").unwrap();
        let id = store.append(restored).unwrap();

        let stored = store.get_by_id(id).unwrap().unwrap();
        let undo = stored.as_undo_reference().expect("element entries support undo");
        assert_eq!(undo.undo_event_id(), Some(deleted_id));
        assert_eq!(undo.undo_mode(), UndoMode::Revert);
    }

    // ── Import ────────────────────────────────────────────────────────────────

    /// An export imports back into an equivalent store that keeps appending
    /// on the same chain.
    #[test]
    fn test_import_round_trip() {
        let store = filled_store();
        let json = store.to_json().unwrap();

        let restored = InMemoryLogStore::import_json(&json).unwrap();
        assert_eq!(restored.entries().unwrap(), store.entries().unwrap());
        assert!(restored.verify_integrity());

        let id = restored
            .append(LogEntry::element_deleted(&part(2)))
            .unwrap();
        assert_eq!(id, LogEntryId(4));
        assert!(restored.verify_integrity());
    }

    /// Editing a record inside an export is detected on import.
    #[test]
    fn test_import_rejects_tampered_export() {
        let mut document: Value = serde_json::from_str(&filled_store().to_json().unwrap()).unwrap();
        document["entries"][1]["entry"]["extra"]["f"] = json!(["price"]);

        let err = InMemoryLogStore::import_json(&document.to_string()).unwrap_err();
        assert!(
            matches!(err, LogError::IntegrityViolation { .. }),
            "expected IntegrityViolation, got {err:?}"
        );
    }

    /// A wrong terminal hash is detected on import.
    #[test]
    fn test_import_rejects_wrong_terminal_hash() {
        let mut document: Value = serde_json::from_str(&filled_store().to_json().unwrap()).unwrap();
        document["terminal_hash"] = json!(StoredEntry::GENESIS_HASH);

        let err = InMemoryLogStore::import_json(&document.to_string()).unwrap_err();
        assert!(matches!(err, LogError::IntegrityViolation { .. }));
    }

    /// Records that violate the entry schema are rejected before decoding.
    #[test]
    fn test_import_rejects_unknown_level() {
        let mut document: Value = serde_json::from_str(&filled_store().to_json().unwrap()).unwrap();
        document["entries"][0]["entry"]["level"] = json!("loud");

        let err = InMemoryLogStore::import_json(&document.to_string()).unwrap_err();
        match err {
            LogError::SchemaValidation { reason } => {
                assert!(reason.contains("record 0"), "reason was: {reason}")
            }
            other => panic!("expected SchemaValidation, got {other:?}"),
        }
    }

    /// A target type without a target id is a schema violation.
    #[test]
    fn test_import_rejects_half_target() {
        let mut document: Value = serde_json::from_str(&filled_store().to_json().unwrap()).unwrap();
        document["entries"][2]["entry"]
            .as_object_mut()
            .unwrap()
            .remove("target_id");

        let err = InMemoryLogStore::import_json(&document.to_string()).unwrap_err();
        assert!(matches!(err, LogError::SchemaValidation { .. }));
    }

    /// Input that is not an export at all is a serialization error.
    #[test]
    fn test_import_rejects_garbage() {
        for input in ["not json", "{}", r#"{"entries": 3}"#] {
            let err = InMemoryLogStore::import_json(input).unwrap_err();
            assert!(matches!(err, LogError::Serialization { .. }), "input {input:?}");
        }
    }
}
