//! Identity types and weak references to domain entities.
//!
//! Log entries never own the entities they describe.  A target is recorded
//! as an `(element_type, id)` pair that may stop resolving once the entity
//! is deleted, which is why deletion entries capture the display name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a persisted log entry, assigned by the store on append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogEntryId(pub u64);

impl fmt::Display for LogEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the user who performed the logged action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Type tag of a domain entity, e.g. `"part"`, `"category"`, `"user"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementType(pub String);

impl ElementType {
    /// Construct a type tag from any string-like value.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A weak `(type, id)` reference to a domain entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    pub element_type: ElementType,
    pub id: u64,
}

impl ElementRef {
    pub fn new(element_type: impl Into<String>, id: u64) -> Self {
        Self {
            element_type: ElementType::new(element_type),
            id,
        }
    }
}

/// A domain entity that can be the target of a log entry.
///
/// Implemented by the hosting application's entity types so that entry
/// constructors can capture the reference and, for deletions, the name.
pub trait LoggableElement {
    /// The weak reference recorded as the entry's target.
    fn element_ref(&self) -> ElementRef;

    /// The human-readable name at the time of logging, if the entity has one.
    fn display_name(&self) -> Option<String> {
        None
    }
}

impl LoggableElement for ElementRef {
    fn element_ref(&self) -> ElementRef {
        self.clone()
    }
}
