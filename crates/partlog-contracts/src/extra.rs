//! Encoding of variant payloads into the generic `extra` mapping.
//!
//! Storage keeps one schema-free map per entry with short keys (`m`, `u`,
//! `um`, ...).  Each variant reads and writes only the keys it reserves.
//! Readers are strict about value types: a key holding a value of the wrong
//! type is treated as absent by the typed model and survives untouched in
//! the entry's passthrough map.

use serde_json::Value;

use crate::{
    capability::{UndoInfo, UndoMode},
    element::LogEntryId,
};

/// The generic, key-ordered payload map as persisted.
pub type Extra = serde_json::Map<String, Value>;

pub(crate) const KEY_COMMENT: &str = "m";
pub(crate) const KEY_UNDO_EVENT: &str = "u";
pub(crate) const KEY_UNDO_MODE: &str = "um";

/// A variant payload that maps itself to and from its reserved keys.
pub(crate) trait ExtraPayload: Sized {
    /// Decode from `extra`, or `None` if a mandatory key is missing or
    /// malformed.
    fn decode(extra: &Extra) -> Option<Self>;

    fn encode(&self, extra: &mut Extra);
}

pub(crate) fn read_str(extra: &Extra, key: &str) -> Option<String> {
    extra.get(key).and_then(Value::as_str).map(str::to_owned)
}

pub(crate) fn read_int(extra: &Extra, key: &str) -> Option<i64> {
    extra.get(key).and_then(Value::as_i64)
}

pub(crate) fn read_u64(extra: &Extra, key: &str) -> Option<u64> {
    extra.get(key).and_then(Value::as_u64)
}

pub(crate) fn read_bool(extra: &Extra, key: &str) -> Option<bool> {
    extra.get(key).and_then(Value::as_bool)
}

/// A list of strings; `None` if the key is absent or any element is not a
/// string.
pub(crate) fn read_str_list(extra: &Extra, key: &str) -> Option<Vec<String>> {
    extra
        .get(key)?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect()
}

pub(crate) fn write_opt_str(extra: &mut Extra, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        extra.insert(key.to_string(), Value::from(value));
    }
}

/// A stored `u` marks an undo event whatever its type; only `null` counts as
/// absent.
pub(crate) fn read_undo(extra: &Extra) -> UndoInfo {
    let stored = extra.get(KEY_UNDO_EVENT).filter(|v| !v.is_null());
    let event = stored.and_then(Value::as_u64).map(LogEntryId);
    UndoInfo {
        event,
        raw_event: stored.filter(|_| event.is_none()).cloned(),
        mode: read_int(extra, KEY_UNDO_MODE).and_then(UndoMode::from_code),
    }
}

pub(crate) fn write_undo(extra: &mut Extra, info: &UndoInfo) {
    if let Some(event) = info.event {
        extra.insert(KEY_UNDO_EVENT.to_string(), Value::from(event.0));
    } else if let Some(raw) = &info.raw_event {
        extra.insert(KEY_UNDO_EVENT.to_string(), raw.clone());
    }
    if let Some(mode) = info.mode {
        extra.insert(KEY_UNDO_MODE.to_string(), Value::from(mode.code()));
    }
}

/// Keys of `original` whose value the typed re-encoding does not reproduce.
///
/// These are kept verbatim so that unknown keys and uninterpretable values
/// survive a decode/encode cycle.
pub(crate) fn passthrough(original: &Extra, reencoded: &Extra) -> Extra {
    original
        .iter()
        .filter(|(key, value)| reencoded.get(key.as_str()) != Some(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
