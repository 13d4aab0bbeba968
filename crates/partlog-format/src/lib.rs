//! # partlog-format
//!
//! Localized, human-readable rendering of log entry payloads.
//!
//! `LogEntryExtraFormatter` turns an entry into a list of `Token`s, which a
//! `MarkupRenderer` turns into either rich HTML-ish markup or console markup.
//! Labels come from a `Translator`; `CatalogTranslator` reads them from TOML
//! message catalogs and ships with an English default.
//!
//! ```rust,ignore
//! use partlog_format::{CatalogTranslator, LogEntryExtraFormatter, TranslatedTypeNames};
//!
//! let catalog = CatalogTranslator::default();
//! let type_names = TranslatedTypeNames::new(&catalog);
//! let formatter = LogEntryExtraFormatter::new(&catalog, &type_names);
//! println!("{}", formatter.format_console(&entry));
//! ```

pub mod formatter;
pub mod render;
pub mod token;
pub mod translator;

pub use formatter::LogEntryExtraFormatter;
pub use render::{strip_console_tags, ConsoleRenderer, HtmlRenderer, MarkupRenderer};
pub use token::Token;
pub use translator::{CatalogTranslator, TranslatedTypeNames};
