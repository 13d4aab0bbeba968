//! JSON Schema for stored records, enforced when importing an export.

use serde_json::{json, Value};
use tracing::warn;

use partlog_contracts::{LogError, LogLevel, LogResult};

/// The schema every stored record's `entry` object must satisfy.
///
/// `extra` values are unconstrained so that payloads written by newer
/// versions still import.
pub fn persisted_entry_schema() -> Value {
    let levels: Vec<&str> = LogLevel::ALL.iter().map(|l| l.as_str()).collect();
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["id", "timestamp", "level", "type", "extra"],
        "properties": {
            "id": { "type": "integer", "minimum": 1 },
            "timestamp": { "type": "string", "minLength": 1 },
            "level": { "enum": levels },
            "type": { "type": "string", "minLength": 1 },
            "target_type": { "type": "string", "minLength": 1 },
            "target_id": { "type": "integer", "minimum": 0 },
            "user_id": { "type": "integer", "minimum": 0 },
            "extra": { "type": "object" }
        },
        "dependentRequired": {
            "target_type": ["target_id"],
            "target_id": ["target_type"]
        },
        "additionalProperties": false
    })
}

/// Validate each element of `records[*].entry` against the schema.
///
/// All violations are collected before returning so the caller sees the
/// full set in one error.
pub fn validate_records(records: &[Value]) -> LogResult<()> {
    let schema = persisted_entry_schema();
    let validator = jsonschema::validator_for(&schema).map_err(|e| LogError::SchemaValidation {
        reason: format!("persisted entry schema failed to compile: {}", e),
    })?;

    let mut failures = Vec::new();
    for (position, record) in records.iter().enumerate() {
        let Some(entry) = record.get("entry") else {
            failures.push(format!("record {}: missing 'entry'", position));
            continue;
        };
        for error in validator.iter_errors(entry) {
            failures.push(format!(
                "record {} at {}: {}",
                position, error.instance_path, error
            ));
        }
    }

    if failures.is_empty() {
        return Ok(());
    }

    warn!(violations = failures.len(), "imported log failed schema validation");
    Err(LogError::SchemaValidation {
        reason: failures.join("; "),
    })
}
