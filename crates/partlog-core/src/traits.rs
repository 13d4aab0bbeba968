//! Contracts of the collaborators the log core consumes.
//!
//! - `LogStore`: append-only persistence of entries
//! - `Translator`: localized message lookup
//! - `ElementTypeNameGenerator`: localized labels for element type tags
//!
//! The core never depends on a concrete implementation of any of these.

use partlog_contracts::{ElementRef, ElementType, LogEntry, LogEntryId, LogResult};

/// Append-only storage of log entries.
///
/// Entries are never updated or removed through this interface.
pub trait LogStore: Send + Sync {
    /// Persist `entry` and return the id assigned to it.
    ///
    /// Must be atomic per entry.  Fails with `InvalidArgument` if the entry
    /// already carries an id, and with `StoreFailure` on I/O problems.
    fn append(&self, entry: LogEntry) -> LogResult<LogEntryId>;

    /// Look up a single entry.  A missing entry is `Ok(None)`, not an error.
    fn get_by_id(&self, id: LogEntryId) -> LogResult<Option<LogEntry>>;

    /// All entries concerning `target`, in append order.
    fn list_by_target(&self, target: &ElementRef) -> LogResult<Vec<LogEntry>>;

    /// Every entry, in append order.
    fn entries(&self) -> LogResult<Vec<LogEntry>>;
}

/// Localized message lookup.
///
/// Must be total: a key without a translation yields the key itself.
pub trait Translator: Send + Sync {
    fn translate(&self, key: &str) -> String;
}

impl<T: Translator + ?Sized> Translator for &T {
    fn translate(&self, key: &str) -> String {
        (**self).translate(key)
    }
}

/// Localized, human-readable labels for element type tags.
pub trait ElementTypeNameGenerator: Send + Sync {
    fn localized_type_label(&self, element_type: &ElementType) -> String;
}
