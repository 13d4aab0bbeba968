//! Human-readable rendering of an entry's payload.
//!
//! Output is a list of segments joined by `"; "`:
//!
//! 1. the undo prefix, for entries that reference an undone event
//! 2. the comment, for entries that carry one
//! 3. the variant body
//!
//! Prefix and comment are chosen by capability, so every variant that gains
//! `HasComment` or `HasUndoReference` renders them without changes here.
//! Formatting never fails; entries this version cannot interpret render as
//! the empty string.

use partlog_contracts::{
    kind::{
        CollectionElementDeleted, DatabaseUpdated, ElementCreated, ElementDeleted,
        ElementEdited, ExceptionRaised, InstockChanged, SecurityEvent, UserSession,
    },
    HasUndoReference, LogEntry, LogEntryKind, UndoMode,
};
use partlog_core::traits::{ElementTypeNameGenerator, Translator};

use crate::{
    render::{ConsoleRenderer, HtmlRenderer, MarkupRenderer},
    token::Token,
};

const SEGMENT_SEPARATOR: &str = "; ";

/// Formats log entry payloads using a message catalog and element type labels.
pub struct LogEntryExtraFormatter<'a> {
    translator: &'a dyn Translator,
    type_names: &'a dyn ElementTypeNameGenerator,
}

impl<'a> LogEntryExtraFormatter<'a> {
    pub fn new(
        translator: &'a dyn Translator,
        type_names: &'a dyn ElementTypeNameGenerator,
    ) -> Self {
        Self { translator, type_names }
    }

    /// Rich markup for web views.
    pub fn format(&self, entry: &LogEntry) -> String {
        self.render_with(&HtmlRenderer, entry)
    }

    /// Markup for console output.
    pub fn format_console(&self, entry: &LogEntry) -> String {
        self.render_with(&ConsoleRenderer, entry)
    }

    pub fn render_with(&self, renderer: &dyn MarkupRenderer, entry: &LogEntry) -> String {
        renderer.render(&self.tokens(entry))
    }

    /// The markup-neutral form of `format` / `format_console`.
    pub fn tokens(&self, entry: &LogEntry) -> Vec<Token> {
        let mut tokens = Vec::new();
        for segment in self.segments(entry) {
            if !tokens.is_empty() {
                tokens.push(Token::Separator(SEGMENT_SEPARATOR));
            }
            tokens.extend(segment);
        }
        tokens
    }

    fn segments(&self, entry: &LogEntry) -> Vec<Vec<Token>> {
        let mut segments = Vec::new();

        if let Some(undo) = entry.as_undo_reference() {
            segments.extend(self.undo_prefix(undo));
        }
        let comment = entry.as_commented().and_then(|c| c.comment());
        if let Some(comment) = comment.filter(|c| !c.is_empty()) {
            segments.push(vec![Token::text(comment)]);
        }

        let body = self.body(entry.kind());
        if !body.is_empty() {
            segments.push(body);
        }
        segments
    }

    fn undo_prefix(&self, undo: &dyn HasUndoReference) -> Option<Vec<Token>> {
        let reference = match undo.undo_event_id() {
            Some(event) => Token::Reference(event),
            None => Token::text(undo.raw_undo_event()?),
        };
        let key = match undo.undo_mode() {
            UndoMode::Undo => "log.undo_mode.undo",
            UndoMode::Revert => "log.undo_mode.revert",
        };
        Some(vec![
            Token::text(self.t(key)),
            Token::Separator(": "),
            reference,
        ])
    }

    fn body(&self, kind: &LogEntryKind) -> Vec<Token> {
        match kind {
            LogEntryKind::UserLogin(session) | LogEntryKind::UserLogout(session) => {
                self.session_body(session)
            }
            LogEntryKind::Exception(exception) => exception_body(exception),
            LogEntryKind::DatabaseUpdated(update) => self.database_updated_body(update),
            LogEntryKind::ElementCreated(created) => self.element_created_body(created),
            LogEntryKind::ElementDeleted(deleted) => self.element_deleted_body(deleted),
            LogEntryKind::ElementEdited(edited) => self.element_edited_body(edited),
            LogEntryKind::InstockChanged(change) => self.instock_changed_body(change),
            LogEntryKind::CollectionElementDeleted(deleted) => self.collection_deleted_body(deleted),
            LogEntryKind::UserNotAllowed(denied) => vec![Token::text(denied.message())],
            LogEntryKind::SecurityEvent(event) => self.security_body(event),
            LogEntryKind::Opaque(_) => Vec::new(),
        }
    }

    // ── Bodies ────────────────────────────────────────────────────────────────

    fn session_body(&self, session: &UserSession) -> Vec<Token> {
        vec![
            Token::label(self.t("log.user_login.ip")),
            Token::Separator(": "),
            Token::text(session.ip_address()),
        ]
    }

    fn database_updated_body(&self, update: &DatabaseUpdated) -> Vec<Token> {
        let key = if update.is_successful() {
            "log.database_updated.success"
        } else {
            "log.database_updated.failure"
        };
        vec![
            Token::label(self.t(key)),
            Token::Separator(" "),
            Token::text(update.old_version()),
            Token::Separator(" "),
            Token::Arrow,
            Token::Separator(" "),
            Token::text(update.new_version()),
        ]
    }

    fn element_created_body(&self, created: &ElementCreated) -> Vec<Token> {
        match created.creation_instock_value() {
            Some(instock) => vec![
                Token::label(self.t("log.element_created.original_instock")),
                Token::Separator(": "),
                Token::text(instock),
            ],
            None => Vec::new(),
        }
    }

    fn element_deleted_body(&self, deleted: &ElementDeleted) -> Vec<Token> {
        let name = deleted
            .old_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.t("log.element_deleted.old_name.unknown"));
        vec![
            Token::label(self.t("log.element_deleted.old_name")),
            Token::Separator(": "),
            Token::text(name),
        ]
    }

    fn element_edited_body(&self, edited: &ElementEdited) -> Vec<Token> {
        if !edited.has_changed_fields_info() {
            return Vec::new();
        }
        vec![
            Token::label(format!("{}:", self.t("log.element_edited.changed_fields"))),
            Token::Separator(" "),
            Token::text(edited.changed_fields().join(", ")),
        ]
    }

    fn instock_changed_body(&self, change: &InstockChanged) -> Vec<Token> {
        let (key, sign) = if change.is_withdrawal() {
            ("log.instock_changed.withdrawal", '-')
        } else {
            ("log.instock_changed.added", '+')
        };
        vec![
            Token::label(self.t(key)),
            Token::Separator("; "),
            Token::text(change.old_instock().to_string()),
            Token::Separator(" "),
            Token::Arrow,
            Token::Separator(" "),
            Token::text(change.new_instock().to_string()),
            Token::Separator(" ("),
            Token::text(format!("{}{}", sign, change.difference(true))),
            Token::Separator(")"),
            Token::Separator("; "),
            Token::text(self.t("log.instock_changed.comment")),
            Token::Separator(": "),
            Token::text(change.comment()),
        ]
    }

    fn collection_deleted_body(&self, deleted: &CollectionElementDeleted) -> Vec<Token> {
        let name = deleted
            .old_name()
            .map(str::to_string)
            .unwrap_or_else(|| deleted.deleted_element_id().to_string());
        vec![
            Token::label(self.t("log.collection_deleted.deleted")),
            Token::Separator(": "),
            Token::text(
                self.type_names
                    .localized_type_label(deleted.deleted_element_type()),
            ),
            Token::Separator(": "),
            Token::text(name),
            Token::Separator(" ("),
            Token::text(deleted.collection_name()),
            Token::Separator(")"),
        ]
    }

    fn security_body(&self, event: &SecurityEvent) -> Vec<Token> {
        let key = format!("log.security_type.{}", event.event_type().as_str());
        vec![
            Token::label(self.t(&key)),
            Token::Separator("; "),
            Token::label(self.t("log.user_login.ip")),
            Token::Separator(": "),
            Token::text(event.ip_address()),
        ]
    }

    fn t(&self, key: &str) -> String {
        self.translator.translate(key)
    }
}

fn exception_body(exception: &ExceptionRaised) -> Vec<Token> {
    vec![
        Token::label(exception.error_type()),
        Token::Separator(" "),
        Token::text(format!("{}:{}", exception.file(), exception.line())),
        Token::Separator(" : "),
        Token::text(exception.message()),
    ]
}
