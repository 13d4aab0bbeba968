//! Hash chaining of stored records.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. canonical JSON of the persisted entry (`extra` keys are sorted)

use sha2::{Digest, Sha256};

use partlog_contracts::{LogError, LogResult, PersistedEntry};

use crate::record::StoredEntry;

/// Compute the lowercase hex SHA-256 of one record.
pub fn hash_entry(sequence: u64, entry: &PersistedEntry, prev_hash: &str) -> LogResult<String> {
    let entry_json = serde_json::to_vec(entry).map_err(|e| LogError::Serialization {
        reason: format!("failed to encode log entry for hashing: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&entry_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Check a sequence of records for tampering.
///
/// Returns the position of the first bad record, or `None` if the chain is
/// intact.  A record is bad when its sequence is out of place, its entry id
/// is not `sequence + 1`, its `prev_hash` does not match the previous
/// record's hash, or its own hash does not match its content.  An empty
/// chain is intact.
pub fn find_broken_link(records: &[StoredEntry]) -> Option<usize> {
    let mut expected_prev = StoredEntry::GENESIS_HASH.to_string();

    for (position, record) in records.iter().enumerate() {
        let sequence = position as u64;
        if record.sequence != sequence || record.entry.id != Some(sequence + 1) {
            return Some(position);
        }
        if record.prev_hash != expected_prev {
            return Some(position);
        }
        match hash_entry(record.sequence, &record.entry, &record.prev_hash) {
            Ok(recomputed) if recomputed == record.this_hash => {}
            _ => return Some(position),
        }
        expected_prev.clone_from(&record.this_hash);
    }

    None
}

/// True if `find_broken_link` finds nothing.
pub fn verify_chain(records: &[StoredEntry]) -> bool {
    find_broken_link(records).is_none()
}
