//! # partlog-contracts
//!
//! The data model of the partlog audit log: log entries, their variant
//! payloads, the capabilities those payloads share, and the storage shape
//! they round-trip through.
//!
//! All crates in the workspace import from here.  No I/O happens in this
//! crate: it holds data definitions, the payload codec and error types.

pub mod address;
pub mod capability;
pub mod element;
pub mod entry;
pub mod error;
pub mod extra;
pub mod kind;
pub mod level;
pub mod record;

pub use capability::{HasComment, HasUndoReference, UndoMode};
pub use element::{ElementRef, ElementType, LogEntryId, LoggableElement, UserId};
pub use entry::LogEntry;
pub use error::{LogError, LogResult};
pub use kind::{LogEntryKind, SecurityEventType};
pub use level::LogLevel;
pub use record::PersistedEntry;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    struct Part {
        id: u64,
        name: &'static str,
    }

    impl LoggableElement for Part {
        fn element_ref(&self) -> ElementRef {
            ElementRef::new("part", self.id)
        }

        fn display_name(&self) -> Option<String> {
            Some(self.name.to_string())
        }
    }

    fn resistor() -> Part {
        Part { id: 12, name: "Resistor 10k" }
    }

    /// An entry that has been "appended" with the given id.
    fn persisted(mut entry: LogEntry, id: u64) -> LogEntry {
        entry.assign_id(LogEntryId(id)).unwrap();
        entry
    }

    /// Push an entry through its storage shape and back.
    fn round_trip(entry: &LogEntry) -> LogEntry {
        let json = serde_json::to_string(entry).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    fn from_record(type_tag: &str, extra: serde_json::Value) -> LogEntry {
        let record = json!({
            "id": 99,
            "timestamp": "2024-03-01T12:00:00Z",
            "level": "info",
            "type": type_tag,
            "extra": extra,
        });
        serde_json::from_value(record).unwrap()
    }

    // ── Undo back-reference ───────────────────────────────────────────────────

    #[rstest]
    #[case("undo", UndoMode::Undo)]
    #[case("revert", UndoMode::Revert)]
    fn set_undone_event_stores_mode(#[case] mode: &str, #[case] expected: UndoMode) {
        let prior = persisted(LogEntry::element_deleted(&resistor()), 3);
        let mut entry = LogEntry::element_created(&resistor(), None);

        entry.set_undone_event(&prior, mode).unwrap();

        let undo = entry.as_undo_reference().unwrap();
        assert!(undo.is_undo_event());
        assert_eq!(undo.undo_event_id(), Some(LogEntryId(3)));
        assert_eq!(undo.undo_mode(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("Undo")]
    #[case("redo")]
    fn set_undone_event_rejects_unknown_mode(#[case] mode: &str) {
        let prior = persisted(LogEntry::element_deleted(&resistor()), 3);
        let earlier = persisted(LogEntry::element_edited(&resistor(), ["name"]), 1);
        let mut entry = LogEntry::element_created(&resistor(), None);
        entry.set_undone_event(&earlier, "revert").unwrap();

        let err = entry.set_undone_event(&prior, mode).unwrap_err();

        assert!(matches!(err, LogError::InvalidArgument { .. }));
        let undo = entry.as_undo_reference().unwrap();
        assert_eq!(undo.undo_event_id(), Some(LogEntryId(1)));
        assert_eq!(undo.undo_mode(), UndoMode::Revert);
    }

    #[test]
    fn set_undone_event_requires_persisted_event() {
        let unsaved = LogEntry::element_deleted(&resistor());
        let mut entry = LogEntry::element_created(&resistor(), None);

        let err = entry.set_undone_event(&unsaved, "undo").unwrap_err();

        assert!(matches!(err, LogError::InvalidArgument { .. }));
        assert!(!entry.as_undo_reference().unwrap().is_undo_event());
    }

    #[test]
    fn variants_without_undo_semantics_reject_back_reference() {
        let prior = persisted(LogEntry::element_deleted(&resistor()), 3);
        let mut entry = LogEntry::exception(&std::fmt::Error);

        assert!(entry.as_undo_reference().is_none());
        assert!(entry.set_undone_event(&prior, "undo").is_err());
    }

    #[test]
    fn missing_undo_mode_defaults_to_undo() {
        let entry = from_record("element_deleted", json!({ "u": 4 }));

        let undo = entry.as_undo_reference().unwrap();
        assert!(undo.is_undo_event());
        assert_eq!(undo.undo_mode(), UndoMode::Undo);
    }

    #[rstest]
    #[case(json!(0))]
    #[case(json!(3))]
    #[case(json!(-1))]
    #[case(json!("revert"))]
    #[case(json!(null))]
    fn corrupt_undo_mode_defaults_to_undo(#[case] um: serde_json::Value) {
        let entry = from_record("element_edited", json!({ "u": 4, "um": um.clone() }));

        assert_eq!(entry.as_undo_reference().unwrap().undo_mode(), UndoMode::Undo);

        // The unrecognized value is kept as stored.
        let record = PersistedEntry::from(&entry);
        assert_eq!(record.extra.get("um"), Some(&um));
    }

    #[test]
    fn undo_event_is_keyed_on_back_reference_only() {
        let mode_only = from_record("element_created", json!({ "um": 2 }));
        let undo = mode_only.as_undo_reference().unwrap();
        assert!(!undo.is_undo_event());
        assert_eq!(undo.undo_mode(), UndoMode::Revert);

        let reference_only = from_record("element_created", json!({ "u": 8 }));
        assert!(reference_only.as_undo_reference().unwrap().is_undo_event());
    }

    /// Any stored back-reference marks an undo event, even one that is not a
    /// valid entry id.  Such values are kept as stored.
    #[rstest]
    #[case(json!("7"), "7")]
    #[case(json!(-3), "-3")]
    #[case(json!(7.0), "7.0")]
    fn malformed_back_reference_still_marks_undo_event(
        #[case] u: serde_json::Value,
        #[case] text: &str,
    ) {
        let entry = from_record("element_created", json!({ "u": u.clone(), "um": 2 }));

        let undo = entry.as_undo_reference().unwrap();
        assert!(undo.is_undo_event());
        assert_eq!(undo.undo_event_id(), None);
        assert_eq!(undo.raw_undo_event().as_deref(), Some(text));
        assert_eq!(undo.undo_mode(), UndoMode::Revert);

        let record = PersistedEntry::from(&entry);
        assert_eq!(record.extra.get("u"), Some(&u));
    }

    #[test]
    fn null_back_reference_is_absent() {
        let entry = from_record("element_deleted", json!({ "u": null }));

        let undo = entry.as_undo_reference().unwrap();
        assert!(!undo.is_undo_event());
        assert_eq!(undo.raw_undo_event(), None);
        assert_eq!(PersistedEntry::from(&entry).extra.get("u"), Some(&json!(null)));
    }

    #[test]
    fn setting_reference_replaces_malformed_one() {
        let prior = persisted(LogEntry::element_deleted(&resistor()), 5);
        let mut entry = from_record("element_created", json!({ "u": "7" }));
        entry.set_undone_event(&prior, "undo").unwrap();

        let undo = entry.as_undo_reference().unwrap();
        assert_eq!(undo.undo_event_id(), Some(LogEntryId(5)));
        assert_eq!(undo.raw_undo_event(), None);
        assert_eq!(PersistedEntry::from(&entry).extra.get("u"), Some(&json!(5)));
    }

    #[test]
    fn undo_mode_parses_only_known_names() {
        assert_eq!("undo".parse::<UndoMode>().unwrap(), UndoMode::Undo);
        assert_eq!("revert".parse::<UndoMode>().unwrap(), UndoMode::Revert);
        assert!("REVERT".parse::<UndoMode>().is_err());
        assert_eq!(UndoMode::from_code(2), Some(UndoMode::Revert));
        assert_eq!(UndoMode::from_code(7), None);
    }

    // ── Storage round-trip ────────────────────────────────────────────────────

    #[test]
    fn element_created_round_trips_all_capabilities() {
        let prior = persisted(LogEntry::element_deleted(&resistor()), 3);
        let mut entry = LogEntry::element_created(&resistor(), Some("5".to_string()))
            .with_user(UserId(1));
        entry.set_undone_event(&prior, "revert").unwrap();
        entry.set_comment("restocked").unwrap();

        let record = PersistedEntry::from(&entry);
        assert_eq!(
            serde_json::Value::Object(record.extra.clone()),
            json!({ "i": "5", "m": "restocked", "u": 3, "um": 2 })
        );

        let decoded = round_trip(&entry);
        assert_eq!(decoded, entry);
        let LogEntryKind::ElementCreated(created) = decoded.kind() else {
            panic!("expected element_created, got {:?}", decoded.kind());
        };
        assert_eq!(created.creation_instock_value(), Some("5"));
        assert_eq!(decoded.as_commented().unwrap().comment(), Some("restocked"));
        assert_eq!(decoded.target(), Some(&ElementRef::new("part", 12)));
        assert_eq!(decoded.user(), Some(UserId(1)));
    }

    #[test]
    fn element_edited_round_trips_changed_fields() {
        let mut entry = LogEntry::element_edited(&resistor(), ["name", "description"]);
        entry.set_comment("typo").unwrap();

        let decoded = round_trip(&entry);

        let LogEntryKind::ElementEdited(edited) = decoded.kind() else {
            panic!("expected element_edited");
        };
        assert!(edited.has_changed_fields_info());
        assert_eq!(edited.changed_fields(), ["name", "description"]);
        assert_eq!(decoded.as_commented().unwrap().comment(), Some("typo"));
    }

    #[test]
    fn element_edited_without_fields_has_no_field_info() {
        let entry = LogEntry::element_edited(&resistor(), Vec::<String>::new());

        let record = PersistedEntry::from(&entry);
        assert!(!record.extra.contains_key("f"));
        let LogEntryKind::ElementEdited(edited) = round_trip(&entry).kind().clone() else {
            panic!("expected element_edited");
        };
        assert!(!edited.has_changed_fields_info());
        assert!(edited.changed_fields().is_empty());
    }

    #[test]
    fn instock_changed_round_trips_delta() {
        let entry = LogEntry::instock_changed(&resistor(), 10, 4, "used in project");

        let decoded = round_trip(&entry);

        let LogEntryKind::InstockChanged(change) = decoded.kind() else {
            panic!("expected instock_changed");
        };
        assert!(change.is_withdrawal());
        assert_eq!(change.difference(false), -6);
        assert_eq!(change.difference(true), 6);
        assert_eq!(change.comment(), "used in project");
        assert!(decoded.as_commented().is_none());
    }

    /// The difference is exact across the whole `i64` range.
    #[rstest]
    #[case(i64::MIN, i64::MAX, 18_446_744_073_709_551_615)]
    #[case(i64::MAX, i64::MIN, -18_446_744_073_709_551_615)]
    #[case(i64::MIN, 1, 9_223_372_036_854_775_809)]
    #[case(0, i64::MIN, -9_223_372_036_854_775_808)]
    fn instock_difference_at_range_limits(
        #[case] old: i64,
        #[case] new: i64,
        #[case] expected: i128,
    ) {
        let entry = from_record("instock_changed", json!({ "o": old, "n": new }));

        let LogEntryKind::InstockChanged(change) = entry.kind() else {
            panic!("expected instock_changed, got {:?}", entry.kind());
        };
        assert_eq!(change.difference(false), expected);
        assert_eq!(change.difference(true), expected.abs());
    }

    #[test]
    fn collection_element_deleted_captures_deleted_element() {
        let bom = ElementRef::new("project", 7);
        let entry =
            LogEntry::collection_element_deleted(&bom, "BOM-7", &ElementRef::new("part", 42));

        let decoded = round_trip(&entry);

        let LogEntryKind::CollectionElementDeleted(deleted) = decoded.kind() else {
            panic!("expected collection_element_deleted");
        };
        assert_eq!(deleted.deleted_element_id(), 42);
        assert_eq!(deleted.deleted_element_type().as_str(), "part");
        assert_eq!(deleted.old_name(), None);
        assert_eq!(deleted.collection_name(), "BOM-7");
        assert_eq!(decoded.target(), Some(&bom));
    }

    #[test]
    fn element_deleted_captures_display_name() {
        let entry = LogEntry::element_deleted(&resistor());

        let LogEntryKind::ElementDeleted(deleted) = round_trip(&entry).kind().clone() else {
            panic!("expected element_deleted");
        };
        assert_eq!(deleted.old_name(), Some("Resistor 10k"));
    }

    #[test]
    fn exception_captures_type_location_and_message() {
        let err = "x".parse::<i32>().unwrap_err();
        let line = line!() + 1;
        let entry = LogEntry::exception(&err);

        assert_eq!(entry.level(), LogLevel::Critical);
        let LogEntryKind::Exception(raised) = round_trip(&entry).kind().clone() else {
            panic!("expected exception");
        };
        assert!(raised.error_type().ends_with("ParseIntError"));
        assert!(raised.file().ends_with("lib.rs"));
        assert_eq!(raised.line(), line);
        assert_eq!(raised.message(), err.to_string());
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let entry = from_record(
            "element_created",
            json!({ "i": "5", "x": [1, 2], "future": { "nested": true } }),
        );

        let record = PersistedEntry::from(&entry);
        assert_eq!(
            serde_json::Value::Object(record.extra),
            json!({ "i": "5", "x": [1, 2], "future": { "nested": true } })
        );
    }

    #[test]
    fn mistyped_reserved_key_is_preserved_not_interpreted() {
        let entry = from_record("element_created", json!({ "i": 5 }));

        let LogEntryKind::ElementCreated(created) = entry.kind() else {
            panic!("expected element_created");
        };
        assert_eq!(created.creation_instock_value(), None);
        assert_eq!(PersistedEntry::from(&entry).extra.get("i"), Some(&json!(5)));
    }

    #[test]
    fn typed_update_overrides_preserved_value() {
        let mut entry = from_record("element_deleted", json!({ "u": 4, "um": 9 }));

        entry
            .as_undo_reference_mut()
            .unwrap()
            .set_undo_reference(LogEntryId(5), UndoMode::Revert);

        let record = PersistedEntry::from(&entry);
        assert_eq!(record.extra.get("u"), Some(&json!(5)));
        assert_eq!(record.extra.get("um"), Some(&json!(2)));
    }

    #[test]
    fn unknown_type_decodes_to_opaque_and_round_trips() {
        let entry = from_record("part_lot_moved", json!({ "from": 1, "to": 2 }));

        let LogEntryKind::Opaque(opaque) = entry.kind() else {
            panic!("expected opaque entry");
        };
        assert_eq!(opaque.type_tag(), "part_lot_moved");
        assert_eq!(entry.type_tag(), "part_lot_moved");
        assert!(!entry.supports_undo());

        let record = PersistedEntry::from(&entry);
        assert_eq!(record.type_tag, "part_lot_moved");
        assert_eq!(serde_json::Value::Object(record.extra), json!({ "from": 1, "to": 2 }));
    }

    #[test]
    fn known_type_missing_mandatory_keys_decodes_to_opaque() {
        let entry = from_record("instock_changed", json!({ "o": 10 }));

        assert!(matches!(entry.kind(), LogEntryKind::Opaque(_)));
        assert_eq!(entry.type_tag(), "instock_changed");
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    #[test]
    fn assign_id_only_once() {
        let mut entry = LogEntry::user_not_allowed("no access to /admin");
        assert!(!entry.is_persisted());

        entry.assign_id(LogEntryId(1)).unwrap();
        let err = entry.assign_id(LogEntryId(2)).unwrap_err();

        assert!(matches!(err, LogError::InvalidArgument { .. }));
        assert_eq!(entry.id(), Some(LogEntryId(1)));
    }

    #[test]
    fn constructors_set_levels_and_tags() {
        assert_eq!(LogEntry::database_updated("1", "2", true).level(), LogLevel::Info);
        assert_eq!(LogEntry::database_updated("1", "2", false).level(), LogLevel::Error);
        assert_eq!(LogEntry::user_not_allowed("x").level(), LogLevel::Warning);
        assert_eq!(
            LogEntry::user_login(UserId(1), "10.0.0.1", false).type_tag(),
            "user_login"
        );
        assert_eq!(
            LogEntry::security_event(SecurityEventType::PasswordReset, "10.0.0.1", false)
                .type_tag(),
            "security_generic"
        );
    }

    #[test]
    fn comment_on_commentless_variant_is_rejected() {
        let mut entry = LogEntry::database_updated("1", "2", true);
        assert!(matches!(
            entry.set_comment("nope"),
            Err(LogError::InvalidArgument { .. })
        ));
    }

    // ── Address anonymization ─────────────────────────────────────────────────

    #[rstest]
    #[case("192.168.17.42", "192.168.17.0")]
    #[case("2001:db8:85a3:8d3:1319:8a2e:370:7348", "2001:db8:85a3::")]
    #[case("not-an-ip", "not-an-ip")]
    fn anonymize_strips_host_part(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(address::anonymize_address(input), expected);
    }

    #[test]
    fn login_entry_anonymizes_on_request() {
        let entry = LogEntry::user_login(UserId(2), "10.1.2.3", true);
        let LogEntryKind::UserLogin(session) = entry.kind() else {
            panic!("expected user_login");
        };
        assert_eq!(session.ip_address(), "10.1.2.0");
        assert_eq!(entry.user(), Some(UserId(2)));
    }

    // ── Levels ────────────────────────────────────────────────────────────────

    #[test]
    fn level_severity_follows_syslog_order() {
        assert!(LogLevel::Emergency.is_at_least(LogLevel::Info));
        assert!(LogLevel::Info.is_at_least(LogLevel::Info));
        assert!(!LogLevel::Debug.is_at_least(LogLevel::Info));
        assert_eq!(LogLevel::Warning.syslog_code(), 4);
        assert_eq!(serde_json::to_string(&LogLevel::Critical).unwrap(), "\"critical\"");
    }

    // ── LogError display messages ─────────────────────────────────────────────

    #[test]
    fn error_invalid_argument_display() {
        let err = LogError::invalid_argument("bad mode");
        let msg = err.to_string();
        assert!(msg.contains("invalid argument"));
        assert!(msg.contains("bad mode"));
    }

    #[test]
    fn error_not_found_display() {
        let err = LogError::NotFound { id: 42 };
        assert_eq!(err.to_string(), "log entry 42 not found");
    }
}
