//! Stored record and export types.
//!
//! `StoredEntry` wraps a `PersistedEntry` with its position in the store and
//! the SHA-256 hashes that make later edits to the log detectable.
//! `LogExport` is the snapshot produced by `InMemoryLogStore::export_log()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partlog_contracts::PersistedEntry;

/// One appended log entry as the store keeps it.
///
/// Each record commits to its predecessor via `prev_hash`.  Rewriting any
/// field of `entry` invalidates `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Position in the store, starting at 0.  The entry id is `sequence + 1`.
    pub sequence: u64,

    /// The entry in its storage shape, id included.
    pub entry: PersistedEntry,

    /// `this_hash` of the previous record, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// SHA-256 (hex) over sequence, `prev_hash`, and the canonical JSON of
    /// `entry`.
    pub this_hash: String,
}

impl StoredEntry {
    /// The `prev_hash` of the first record in every store.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// A snapshot of the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExport {
    /// All records in append order.
    pub entries: Vec<StoredEntry>,

    /// Wall-clock time (UTC) the snapshot was taken.
    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last record.  Empty string for an empty store.
    pub terminal_hash: String,
}
