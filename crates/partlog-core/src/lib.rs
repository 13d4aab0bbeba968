//! # partlog-core
//!
//! Undo coordination and the configurable event logger for partlog.
//!
//! This crate provides:
//! - The collaborator traits (`LogStore`, `Translator`, `ElementTypeNameGenerator`)
//! - `UndoContext`, the per-unit-of-work record of the event being undone
//! - `EventLogger` / `UnitOfWork`, which stamp, filter, and append entries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use partlog_core::{EventLogger, LoggerConfig};
//!
//! let logger = EventLogger::new(store, LoggerConfig::default());
//! let mut unit = logger.begin(Some(user));
//! unit.begin_undo(deleted_event_id, UndoMode::Undo)?;
//! unit.log(LogEntry::element_created(&part, None))?;
//! unit.finish();
//! ```

pub mod config;
pub mod logger;
pub mod traits;
pub mod undo;

pub use config::{LoggerConfig, Rejection};
pub use logger::{EventLogger, UnitOfWork, UnitOfWorkId, UnitOfWorkSummary};
pub use undo::UndoContext;
