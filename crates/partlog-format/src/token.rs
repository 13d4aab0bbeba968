//! Markup-neutral description of a formatted entry.
//!
//! The formatter decides *what* is shown and in which order; a
//! `MarkupRenderer` decides how each piece is marked up and escaped.  Only
//! `Separator` carries trusted text; everything else is escaped by the
//! renderer.

use partlog_contracts::LogEntryId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An emphasized, translated label.
    Label(String),
    /// Plain text from the entry or the catalog.
    Text(String),
    /// A trusted literal such as `"; "` or `": "`.
    Separator(&'static str),
    /// The id of another log entry.
    Reference(LogEntryId),
    /// The "changed to" marker between two values.
    Arrow,
}

impl Token {
    pub fn label(s: impl Into<String>) -> Self {
        Self::Label(s.into())
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}
