//! Error types for the partlog audit log.
//!
//! All fallible operations across the workspace return `LogResult<T>`.
//! There is no rendering variant: the formatter is total over every stored
//! entry and never produces an error.

use thiserror::Error;

/// The unified error type for the partlog crates.
#[derive(Debug, Error)]
pub enum LogError {
    /// A caller passed a value the operation can never accept (an unknown
    /// undo mode, an unpersisted undo target, an already persisted entry).
    ///
    /// This is a programming error at the call site and is never recovered.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// A log entry the caller required does not exist in the store.
    ///
    /// Plain lookups return `Option` instead; this variant is only raised
    /// where the entry must exist, e.g. when starting an undo.
    #[error("log entry {id} not found")]
    NotFound { id: u64 },

    /// The store could not append or read an entry.
    ///
    /// Propagated unchanged to the operation that triggered the write.
    #[error("log store failure: {reason}")]
    StoreFailure { reason: String },

    /// A configuration file or translation catalog is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A persisted log could not be encoded or decoded.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// An imported record does not match the persisted entry schema.
    #[error("schema validation error: {reason}")]
    SchemaValidation { reason: String },

    /// An imported log failed hash chain verification.
    #[error("integrity violation: {reason}")]
    IntegrityViolation { reason: String },
}

impl LogError {
    /// Shorthand for `LogError::InvalidArgument`.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the partlog crates.
pub type LogResult<T> = Result<T, LogError>;
