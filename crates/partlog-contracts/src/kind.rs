//! The closed set of log entry variants and their typed payloads.
//!
//! `LogEntryKind` is the discriminated union callers work with.  Each
//! payload struct knows its own reserved `extra` keys; the generic map is
//! only materialized at the storage boundary (see `record`).

use std::fmt;

use serde_json::Value;

use crate::{
    capability::{HasComment, HasUndoReference, UndoInfo},
    element::ElementType,
    extra::{
        read_bool, read_int, read_str, read_str_list, read_u64, read_undo, write_opt_str,
        write_undo, Extra, ExtraPayload, KEY_COMMENT,
    },
};

// ── Element lifecycle ─────────────────────────────────────────────────────────

/// An element was created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementCreated {
    pub(crate) creation_instock: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) undo: UndoInfo,
}

impl ElementCreated {
    /// The stock value the element was created with, if one was recorded.
    pub fn creation_instock_value(&self) -> Option<&str> {
        self.creation_instock.as_deref()
    }

    pub fn has_creation_instock_value(&self) -> bool {
        self.creation_instock.is_some()
    }
}

impl ExtraPayload for ElementCreated {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            creation_instock: read_str(extra, "i"),
            comment: read_str(extra, KEY_COMMENT),
            undo: read_undo(extra),
        })
    }

    fn encode(&self, extra: &mut Extra) {
        write_opt_str(extra, "i", self.creation_instock.as_deref());
        write_opt_str(extra, KEY_COMMENT, self.comment.as_deref());
        write_undo(extra, &self.undo);
    }
}

/// One or more fields of an element were changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementEdited {
    pub(crate) changed_fields: Option<Vec<String>>,
    pub(crate) comment: Option<String>,
    pub(crate) undo: UndoInfo,
}

impl ElementEdited {
    pub fn has_changed_fields_info(&self) -> bool {
        self.changed_fields.is_some()
    }

    /// Names of the changed fields; empty when no info was recorded.
    pub fn changed_fields(&self) -> &[String] {
        self.changed_fields.as_deref().unwrap_or_default()
    }
}

impl ExtraPayload for ElementEdited {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            changed_fields: read_str_list(extra, "f"),
            comment: read_str(extra, KEY_COMMENT),
            undo: read_undo(extra),
        })
    }

    fn encode(&self, extra: &mut Extra) {
        if let Some(fields) = &self.changed_fields {
            extra.insert("f".to_string(), Value::from(fields.clone()));
        }
        write_opt_str(extra, KEY_COMMENT, self.comment.as_deref());
        write_undo(extra, &self.undo);
    }
}

/// An element was deleted.  The name is captured because the target
/// reference no longer resolves afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDeleted {
    pub(crate) old_name: Option<String>,
    pub(crate) comment: Option<String>,
    pub(crate) undo: UndoInfo,
}

impl ElementDeleted {
    pub fn old_name(&self) -> Option<&str> {
        self.old_name.as_deref()
    }
}

impl ExtraPayload for ElementDeleted {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            old_name: read_str(extra, "n"),
            comment: read_str(extra, KEY_COMMENT),
            undo: read_undo(extra),
        })
    }

    fn encode(&self, extra: &mut Extra) {
        write_opt_str(extra, "n", self.old_name.as_deref());
        write_opt_str(extra, KEY_COMMENT, self.comment.as_deref());
        write_undo(extra, &self.undo);
    }
}

/// An element was removed from a collection owned by the entry's target
/// (e.g. a part removed from a BOM).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionElementDeleted {
    pub(crate) old_name: Option<String>,
    pub(crate) collection_name: String,
    pub(crate) deleted_element_id: u64,
    pub(crate) deleted_element_type: ElementType,
    pub(crate) comment: Option<String>,
    pub(crate) undo: UndoInfo,
}

impl CollectionElementDeleted {
    /// Name of the deleted element, if it had one.
    pub fn old_name(&self) -> Option<&str> {
        self.old_name.as_deref()
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    pub fn deleted_element_id(&self) -> u64 {
        self.deleted_element_id
    }

    pub fn deleted_element_type(&self) -> &ElementType {
        &self.deleted_element_type
    }
}

impl ExtraPayload for CollectionElementDeleted {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            old_name: read_str(extra, "n"),
            collection_name: read_str(extra, "c")?,
            deleted_element_id: read_u64(extra, "i")?,
            deleted_element_type: ElementType(read_str(extra, "k")?),
            comment: read_str(extra, KEY_COMMENT),
            undo: read_undo(extra),
        })
    }

    fn encode(&self, extra: &mut Extra) {
        write_opt_str(extra, "n", self.old_name.as_deref());
        extra.insert("c".to_string(), Value::from(self.collection_name.as_str()));
        extra.insert("i".to_string(), Value::from(self.deleted_element_id));
        extra.insert("k".to_string(), Value::from(self.deleted_element_type.as_str()));
        write_opt_str(extra, KEY_COMMENT, self.comment.as_deref());
        write_undo(extra, &self.undo);
    }
}

macro_rules! impl_entry_capabilities {
    ($($payload:ty),+ $(,)?) => {
        $(
            impl HasComment for $payload {
                fn comment(&self) -> Option<&str> {
                    self.comment.as_deref()
                }

                fn set_comment(&mut self, comment: Option<String>) {
                    self.comment = comment;
                }
            }

            impl HasUndoReference for $payload {
                fn undo_info(&self) -> &UndoInfo {
                    &self.undo
                }

                fn undo_info_mut(&mut self) -> &mut UndoInfo {
                    &mut self.undo
                }
            }
        )+
    };
}

impl_entry_capabilities!(
    ElementCreated,
    ElementEdited,
    ElementDeleted,
    CollectionElementDeleted,
);

// ── Stock ─────────────────────────────────────────────────────────────────────

/// The stock of an element changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstockChanged {
    pub(crate) old_instock: i64,
    pub(crate) new_instock: i64,
    pub(crate) comment: Option<String>,
}

impl InstockChanged {
    pub fn old_instock(&self) -> i64 {
        self.old_instock
    }

    pub fn new_instock(&self) -> i64 {
        self.new_instock
    }

    /// The free-text reason; empty when none was given.
    pub fn comment(&self) -> &str {
        self.comment.as_deref().unwrap_or_default()
    }

    /// True if stock was taken out, i.e. the new value is lower.
    pub fn is_withdrawal(&self) -> bool {
        self.new_instock < self.old_instock
    }

    /// `new - old`, or its magnitude when `absolute` is set.
    ///
    /// Computed in `i128` so that every pair of stored `i64` values has an
    /// exact difference.
    pub fn difference(&self, absolute: bool) -> i128 {
        let delta = i128::from(self.new_instock) - i128::from(self.old_instock);
        if absolute {
            delta.abs()
        } else {
            delta
        }
    }
}

impl ExtraPayload for InstockChanged {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            old_instock: read_int(extra, "o")?,
            new_instock: read_int(extra, "n")?,
            comment: read_str(extra, "c"),
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("o".to_string(), Value::from(self.old_instock));
        extra.insert("n".to_string(), Value::from(self.new_instock));
        write_opt_str(extra, "c", self.comment.as_deref());
    }
}

// ── System ────────────────────────────────────────────────────────────────────

/// The database schema was migrated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUpdated {
    pub(crate) old_version: String,
    pub(crate) new_version: String,
    pub(crate) successful: bool,
}

impl DatabaseUpdated {
    pub fn old_version(&self) -> &str {
        &self.old_version
    }

    pub fn new_version(&self) -> &str {
        &self.new_version
    }

    pub fn is_successful(&self) -> bool {
        self.successful
    }
}

impl ExtraPayload for DatabaseUpdated {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            old_version: read_str(extra, "o")?,
            new_version: read_str(extra, "n")?,
            successful: read_bool(extra, "s")?,
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("o".to_string(), Value::from(self.old_version.as_str()));
        extra.insert("n".to_string(), Value::from(self.new_version.as_str()));
        extra.insert("s".to_string(), Value::from(self.successful));
    }
}

/// An error reached the top of a request and was recorded for post-mortem
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionRaised {
    pub(crate) error_type: String,
    pub(crate) file: String,
    pub(crate) line: u32,
    pub(crate) message: String,
}

impl ExceptionRaised {
    /// Type name of the captured error.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ExtraPayload for ExceptionRaised {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            error_type: read_str(extra, "t")?,
            file: read_str(extra, "f")?,
            line: read_u64(extra, "l").and_then(|l| u32::try_from(l).ok())?,
            message: read_str(extra, "m")?,
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("t".to_string(), Value::from(self.error_type.as_str()));
        extra.insert("f".to_string(), Value::from(self.file.as_str()));
        extra.insert("l".to_string(), Value::from(self.line));
        extra.insert("m".to_string(), Value::from(self.message.as_str()));
    }
}

// ── Security ──────────────────────────────────────────────────────────────────

/// A login or logout, with the originating network address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub(crate) address: String,
}

impl UserSession {
    pub fn ip_address(&self) -> &str {
        &self.address
    }
}

impl ExtraPayload for UserSession {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            address: read_str(extra, "i")?,
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("i".to_string(), Value::from(self.address.as_str()));
    }
}

/// An authorization check denied access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotAllowed {
    pub(crate) message: String,
}

impl UserNotAllowed {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl ExtraPayload for UserNotAllowed {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            message: read_str(extra, "a")?,
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("a".to_string(), Value::from(self.message.as_str()));
    }
}

/// Account security events recorded under the generic security type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityEventType {
    PasswordReset,
    PasswordChanged,
    TwoFactorReset,
    BackupKeysReset,
    U2fAdded,
    U2fRemoved,
    GoogleAuthenticatorInstalled,
    GoogleAuthenticatorRemoved,
    TrustedDeviceReset,
}

impl SecurityEventType {
    pub const fn code(self) -> i64 {
        match self {
            Self::PasswordReset => 0,
            Self::PasswordChanged => 1,
            Self::TwoFactorReset => 2,
            Self::BackupKeysReset => 3,
            Self::U2fAdded => 4,
            Self::U2fRemoved => 5,
            Self::GoogleAuthenticatorInstalled => 6,
            Self::GoogleAuthenticatorRemoved => 7,
            Self::TrustedDeviceReset => 8,
        }
    }

    pub const fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => Self::PasswordReset,
            1 => Self::PasswordChanged,
            2 => Self::TwoFactorReset,
            3 => Self::BackupKeysReset,
            4 => Self::U2fAdded,
            5 => Self::U2fRemoved,
            6 => Self::GoogleAuthenticatorInstalled,
            7 => Self::GoogleAuthenticatorRemoved,
            8 => Self::TrustedDeviceReset,
            _ => return None,
        })
    }

    /// Snake-case name, used to build translation keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::PasswordChanged => "password_changed",
            Self::TwoFactorReset => "two_factor_reset",
            Self::BackupKeysReset => "backup_keys_reset",
            Self::U2fAdded => "u2f_added",
            Self::U2fRemoved => "u2f_removed",
            Self::GoogleAuthenticatorInstalled => "google_authenticator_installed",
            Self::GoogleAuthenticatorRemoved => "google_authenticator_removed",
            Self::TrustedDeviceReset => "trusted_device_reset",
        }
    }
}

impl fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityEvent {
    pub(crate) event_type: SecurityEventType,
    pub(crate) address: String,
}

impl SecurityEvent {
    pub fn event_type(&self) -> SecurityEventType {
        self.event_type
    }

    pub fn ip_address(&self) -> &str {
        &self.address
    }
}

impl ExtraPayload for SecurityEvent {
    fn decode(extra: &Extra) -> Option<Self> {
        Some(Self {
            event_type: read_int(extra, "e").and_then(SecurityEventType::from_code)?,
            address: read_str(extra, "i")?,
        })
    }

    fn encode(&self, extra: &mut Extra) {
        extra.insert("e".to_string(), Value::from(self.event_type.code()));
        extra.insert("i".to_string(), Value::from(self.address.as_str()));
    }
}

// ── Opaque ────────────────────────────────────────────────────────────────────

/// A stored entry this version cannot interpret: an unknown type tag, or a
/// known tag whose mandatory keys are missing or malformed.
///
/// Kept verbatim so it re-encodes unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueEntry {
    pub(crate) type_tag: String,
    pub(crate) extra: Extra,
}

impl OpaqueEntry {
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    pub fn extra(&self) -> &Extra {
        &self.extra
    }
}

// ── Discriminated union ───────────────────────────────────────────────────────

pub const TYPE_ELEMENT_CREATED: &str = "element_created";
pub const TYPE_ELEMENT_EDITED: &str = "element_edited";
pub const TYPE_ELEMENT_DELETED: &str = "element_deleted";
pub const TYPE_COLLECTION_ELEMENT_DELETED: &str = "collection_element_deleted";
pub const TYPE_INSTOCK_CHANGED: &str = "instock_changed";
pub const TYPE_DATABASE_UPDATED: &str = "database_updated";
pub const TYPE_EXCEPTION: &str = "exception";
pub const TYPE_USER_LOGIN: &str = "user_login";
pub const TYPE_USER_LOGOUT: &str = "user_logout";
pub const TYPE_USER_NOT_ALLOWED: &str = "user_not_allowed";
pub const TYPE_SECURITY_GENERIC: &str = "security_generic";

/// Every variant of log entry, with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntryKind {
    ElementCreated(ElementCreated),
    ElementEdited(ElementEdited),
    ElementDeleted(ElementDeleted),
    CollectionElementDeleted(CollectionElementDeleted),
    InstockChanged(InstockChanged),
    DatabaseUpdated(DatabaseUpdated),
    Exception(ExceptionRaised),
    UserLogin(UserSession),
    UserLogout(UserSession),
    UserNotAllowed(UserNotAllowed),
    SecurityEvent(SecurityEvent),
    Opaque(OpaqueEntry),
}

impl LogEntryKind {
    /// The stored discriminator tag.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::ElementCreated(_) => TYPE_ELEMENT_CREATED,
            Self::ElementEdited(_) => TYPE_ELEMENT_EDITED,
            Self::ElementDeleted(_) => TYPE_ELEMENT_DELETED,
            Self::CollectionElementDeleted(_) => TYPE_COLLECTION_ELEMENT_DELETED,
            Self::InstockChanged(_) => TYPE_INSTOCK_CHANGED,
            Self::DatabaseUpdated(_) => TYPE_DATABASE_UPDATED,
            Self::Exception(_) => TYPE_EXCEPTION,
            Self::UserLogin(_) => TYPE_USER_LOGIN,
            Self::UserLogout(_) => TYPE_USER_LOGOUT,
            Self::UserNotAllowed(_) => TYPE_USER_NOT_ALLOWED,
            Self::SecurityEvent(_) => TYPE_SECURITY_GENERIC,
            Self::Opaque(opaque) => &opaque.type_tag,
        }
    }

    pub fn as_commented(&self) -> Option<&dyn HasComment> {
        match self {
            Self::ElementCreated(p) => Some(p),
            Self::ElementEdited(p) => Some(p),
            Self::ElementDeleted(p) => Some(p),
            Self::CollectionElementDeleted(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_commented_mut(&mut self) -> Option<&mut dyn HasComment> {
        match self {
            Self::ElementCreated(p) => Some(p),
            Self::ElementEdited(p) => Some(p),
            Self::ElementDeleted(p) => Some(p),
            Self::CollectionElementDeleted(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_undo_reference(&self) -> Option<&dyn HasUndoReference> {
        match self {
            Self::ElementCreated(p) => Some(p),
            Self::ElementEdited(p) => Some(p),
            Self::ElementDeleted(p) => Some(p),
            Self::CollectionElementDeleted(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_undo_reference_mut(&mut self) -> Option<&mut dyn HasUndoReference> {
        match self {
            Self::ElementCreated(p) => Some(p),
            Self::ElementEdited(p) => Some(p),
            Self::ElementDeleted(p) => Some(p),
            Self::CollectionElementDeleted(p) => Some(p),
            _ => None,
        }
    }

    /// Decode a stored payload.  Never fails: anything this version cannot
    /// interpret becomes `Opaque`.
    pub(crate) fn decode(type_tag: &str, extra: &Extra) -> Self {
        let decoded = match type_tag {
            TYPE_ELEMENT_CREATED => ElementCreated::decode(extra).map(Self::ElementCreated),
            TYPE_ELEMENT_EDITED => ElementEdited::decode(extra).map(Self::ElementEdited),
            TYPE_ELEMENT_DELETED => ElementDeleted::decode(extra).map(Self::ElementDeleted),
            TYPE_COLLECTION_ELEMENT_DELETED => {
                CollectionElementDeleted::decode(extra).map(Self::CollectionElementDeleted)
            }
            TYPE_INSTOCK_CHANGED => InstockChanged::decode(extra).map(Self::InstockChanged),
            TYPE_DATABASE_UPDATED => DatabaseUpdated::decode(extra).map(Self::DatabaseUpdated),
            TYPE_EXCEPTION => ExceptionRaised::decode(extra).map(Self::Exception),
            TYPE_USER_LOGIN => UserSession::decode(extra).map(Self::UserLogin),
            TYPE_USER_LOGOUT => UserSession::decode(extra).map(Self::UserLogout),
            TYPE_USER_NOT_ALLOWED => UserNotAllowed::decode(extra).map(Self::UserNotAllowed),
            TYPE_SECURITY_GENERIC => SecurityEvent::decode(extra).map(Self::SecurityEvent),
            _ => None,
        };

        decoded.unwrap_or_else(|| {
            Self::Opaque(OpaqueEntry {
                type_tag: type_tag.to_string(),
                extra: extra.clone(),
            })
        })
    }

    /// Encode the typed payload into a fresh map of its reserved keys.
    pub(crate) fn encode(&self) -> Extra {
        let mut extra = Extra::new();
        match self {
            Self::ElementCreated(p) => p.encode(&mut extra),
            Self::ElementEdited(p) => p.encode(&mut extra),
            Self::ElementDeleted(p) => p.encode(&mut extra),
            Self::CollectionElementDeleted(p) => p.encode(&mut extra),
            Self::InstockChanged(p) => p.encode(&mut extra),
            Self::DatabaseUpdated(p) => p.encode(&mut extra),
            Self::Exception(p) => p.encode(&mut extra),
            Self::UserLogin(p) | Self::UserLogout(p) => p.encode(&mut extra),
            Self::UserNotAllowed(p) => p.encode(&mut extra),
            Self::SecurityEvent(p) => p.encode(&mut extra),
            Self::Opaque(opaque) => extra.clone_from(&opaque.extra),
        }
        extra
    }
}
