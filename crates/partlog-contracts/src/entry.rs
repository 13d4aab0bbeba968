//! The log entry record and its constructors.
//!
//! A `LogEntry` is built in memory by the domain operation that triggers it,
//! optionally decorated with a comment or an undo back-reference, and then
//! appended once to a store.  The store assigns the id; after that the entry
//! is never modified.

use std::error::Error;
use std::panic::Location;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    address::anonymize_address,
    capability::{HasComment, HasUndoReference},
    element::{ElementRef, LogEntryId, LoggableElement, UserId},
    error::{LogError, LogResult},
    extra::Extra,
    kind::{
        CollectionElementDeleted, DatabaseUpdated, ElementCreated, ElementDeleted,
        ElementEdited, ExceptionRaised, InstockChanged, LogEntryKind, SecurityEvent,
        SecurityEventType, UserNotAllowed, UserSession,
    },
    level::LogLevel,
    record::PersistedEntry,
};

/// One logged event.
///
/// Serializes as a `PersistedEntry`, the flat storage shape with a generic
/// `extra` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PersistedEntry", from = "PersistedEntry")]
pub struct LogEntry {
    pub(crate) id: Option<LogEntryId>,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) level: LogLevel,
    pub(crate) target: Option<ElementRef>,
    pub(crate) user: Option<UserId>,
    pub(crate) kind: LogEntryKind,
    /// Stored `extra` keys the typed payload does not account for.
    pub(crate) passthrough: Extra,
}

impl LogEntry {
    /// Create an entry of the given kind, timestamped now.
    pub fn new(kind: LogEntryKind, level: LogLevel) -> Self {
        Self {
            id: None,
            timestamp: Utc::now(),
            level,
            target: None,
            user: None,
            kind,
            passthrough: Extra::new(),
        }
    }

    // ── Constructors per variant ──────────────────────────────────────────────

    /// A newly created element, optionally with the stock it started with.
    pub fn element_created(element: &dyn LoggableElement, creation_instock: Option<String>) -> Self {
        let kind = LogEntryKind::ElementCreated(ElementCreated {
            creation_instock,
            ..ElementCreated::default()
        });
        Self::new(kind, LogLevel::Info).with_target(element.element_ref())
    }

    /// An edited element.  An empty `changed_fields` records no field info.
    pub fn element_edited<I, S>(element: &dyn LoggableElement, changed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = changed_fields.into_iter().map(Into::into).collect();
        let kind = LogEntryKind::ElementEdited(ElementEdited {
            changed_fields: (!fields.is_empty()).then_some(fields),
            ..ElementEdited::default()
        });
        Self::new(kind, LogLevel::Info).with_target(element.element_ref())
    }

    /// A deleted element.  Its display name is captured now, since the
    /// target stops resolving once the deletion commits.
    pub fn element_deleted(element: &dyn LoggableElement) -> Self {
        let kind = LogEntryKind::ElementDeleted(ElementDeleted {
            old_name: element.display_name(),
            ..ElementDeleted::default()
        });
        Self::new(kind, LogLevel::Info).with_target(element.element_ref())
    }

    /// `deleted` was removed from the collection `collection_name` of `owner`.
    pub fn collection_element_deleted(
        owner: &dyn LoggableElement,
        collection_name: impl Into<String>,
        deleted: &dyn LoggableElement,
    ) -> Self {
        let deleted_ref = deleted.element_ref();
        let kind = LogEntryKind::CollectionElementDeleted(CollectionElementDeleted {
            old_name: deleted.display_name(),
            collection_name: collection_name.into(),
            deleted_element_id: deleted_ref.id,
            deleted_element_type: deleted_ref.element_type,
            comment: None,
            undo: Default::default(),
        });
        Self::new(kind, LogLevel::Info).with_target(owner.element_ref())
    }

    pub fn instock_changed(
        element: &dyn LoggableElement,
        old_instock: i64,
        new_instock: i64,
        comment: impl Into<String>,
    ) -> Self {
        let comment = comment.into();
        let kind = LogEntryKind::InstockChanged(InstockChanged {
            old_instock,
            new_instock,
            comment: (!comment.is_empty()).then_some(comment),
        });
        Self::new(kind, LogLevel::Info).with_target(element.element_ref())
    }

    /// A schema migration.  Failed migrations are logged at error level.
    pub fn database_updated(
        old_version: impl Into<String>,
        new_version: impl Into<String>,
        successful: bool,
    ) -> Self {
        let kind = LogEntryKind::DatabaseUpdated(DatabaseUpdated {
            old_version: old_version.into(),
            new_version: new_version.into(),
            successful,
        });
        let level = if successful { LogLevel::Info } else { LogLevel::Error };
        Self::new(kind, level)
    }

    /// Capture `error` together with the caller's source location.
    #[track_caller]
    pub fn exception<E: Error>(error: &E) -> Self {
        let location = Location::caller();
        let kind = LogEntryKind::Exception(ExceptionRaised {
            error_type: std::any::type_name::<E>().to_string(),
            file: location.file().to_string(),
            line: location.line(),
            message: error.to_string(),
        });
        Self::new(kind, LogLevel::Critical)
    }

    /// `user` logged in from `address`.
    pub fn user_login(user: UserId, address: &str, anonymize: bool) -> Self {
        let kind = LogEntryKind::UserLogin(UserSession {
            address: session_address(address, anonymize),
        });
        Self::new(kind, LogLevel::Info).with_user(user)
    }

    pub fn user_logout(user: UserId, address: &str, anonymize: bool) -> Self {
        let kind = LogEntryKind::UserLogout(UserSession {
            address: session_address(address, anonymize),
        });
        Self::new(kind, LogLevel::Info).with_user(user)
    }

    /// An authorization check rejected a request.
    pub fn user_not_allowed(message: impl Into<String>) -> Self {
        let kind = LogEntryKind::UserNotAllowed(UserNotAllowed {
            message: message.into(),
        });
        Self::new(kind, LogLevel::Warning)
    }

    /// Credential resets are logged at notice level, everything else at info.
    pub fn security_event(event_type: SecurityEventType, address: &str, anonymize: bool) -> Self {
        let level = match event_type {
            SecurityEventType::PasswordReset
            | SecurityEventType::TwoFactorReset
            | SecurityEventType::BackupKeysReset
            | SecurityEventType::TrustedDeviceReset => LogLevel::Notice,
            _ => LogLevel::Info,
        };
        let kind = LogEntryKind::SecurityEvent(SecurityEvent {
            event_type,
            address: session_address(address, anonymize),
        });
        Self::new(kind, level)
    }

    // ── Builders ──────────────────────────────────────────────────────────────

    pub fn with_target(mut self, target: ElementRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// The store-assigned id, `None` until the entry is appended.
    pub fn id(&self) -> Option<LogEntryId> {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn type_tag(&self) -> &str {
        self.kind.type_tag()
    }

    pub fn target(&self) -> Option<&ElementRef> {
        self.target.as_ref()
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Set the acting user if none was recorded yet.
    pub fn set_user_if_absent(&mut self, user: UserId) {
        self.user.get_or_insert(user);
    }

    pub fn kind(&self) -> &LogEntryKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut LogEntryKind {
        &mut self.kind
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Record the id assigned by the store.
    ///
    /// Fails if the entry already carries an id: entries are appended once.
    pub fn assign_id(&mut self, id: LogEntryId) -> LogResult<()> {
        if let Some(existing) = self.id {
            return Err(LogError::invalid_argument(format!(
                "log entry already persisted with id {}",
                existing
            )));
        }
        self.id = Some(id);
        Ok(())
    }

    // ── Capabilities ──────────────────────────────────────────────────────────

    pub fn as_commented(&self) -> Option<&dyn HasComment> {
        self.kind.as_commented()
    }

    pub fn as_commented_mut(&mut self) -> Option<&mut dyn HasComment> {
        self.kind.as_commented_mut()
    }

    pub fn as_undo_reference(&self) -> Option<&dyn HasUndoReference> {
        self.kind.as_undo_reference()
    }

    pub fn as_undo_reference_mut(&mut self) -> Option<&mut dyn HasUndoReference> {
        self.kind.as_undo_reference_mut()
    }

    /// Attach a comment; fails if this variant does not carry comments.
    pub fn set_comment(&mut self, comment: impl Into<String>) -> LogResult<()> {
        let type_tag = self.type_tag().to_string();
        let target = self.as_commented_mut().ok_or_else(|| {
            LogError::invalid_argument(format!("'{}' entries do not carry a comment", type_tag))
        })?;
        target.set_comment(Some(comment.into()));
        Ok(())
    }

    /// Mark this entry as undoing `event`; see
    /// [`HasUndoReference::set_undone_event`].
    ///
    /// Fails if this variant has no undo semantics.
    pub fn set_undone_event(&mut self, event: &LogEntry, mode: &str) -> LogResult<()> {
        let type_tag = self.type_tag().to_string();
        let target = self.as_undo_reference_mut().ok_or_else(|| {
            LogError::invalid_argument(format!(
                "'{}' entries cannot reference an undone event",
                type_tag
            ))
        })?;
        target.set_undone_event(event, mode)
    }

    /// True if entries of this variant can be the target of an undo.
    pub fn supports_undo(&self) -> bool {
        self.as_undo_reference().is_some()
    }
}

fn session_address(address: &str, anonymize: bool) -> String {
    if anonymize {
        anonymize_address(address)
    } else {
        address.to_string()
    }
}
