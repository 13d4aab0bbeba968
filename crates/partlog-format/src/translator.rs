//! TOML message catalogs.
//!
//! A catalog is a single `[messages]` table of dotted keys:
//!
//! ```toml
//! [messages]
//! "log.user_login.ip" = "IP"
//! "part.label" = "Part"
//! ```
//!
//! `CatalogTranslator::default()` uses the English catalog compiled into the
//! crate.  Element type labels are looked up in the same catalog under
//! `"<type>.label"`.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use tracing::debug;

use partlog_contracts::{ElementType, LogError, LogResult};
use partlog_core::traits::{ElementTypeNameGenerator, Translator};

const DEFAULT_CATALOG: &str = include_str!("../translations/en.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Catalog {
    #[serde(default)]
    messages: BTreeMap<String, String>,
}

/// A `Translator` backed by a flat key → message map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTranslator {
    messages: BTreeMap<String, String>,
}

impl CatalogTranslator {
    /// Parse `s` as a TOML catalog.
    ///
    /// Returns `LogError::ConfigError` if the TOML is malformed or has
    /// anything besides a `[messages]` table of strings.
    pub fn from_toml_str(s: &str) -> LogResult<Self> {
        let catalog: Catalog = toml::from_str(s).map_err(|e| LogError::ConfigError {
            reason: format!("failed to parse translation catalog: {}", e),
        })?;
        Ok(Self {
            messages: catalog.messages,
        })
    }

    /// Read the file at `path` and parse it as a TOML catalog.
    pub fn from_file(path: &Path) -> LogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LogError::ConfigError {
            reason: format!("failed to read translation catalog '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Layer `other` on top of this catalog; its messages win.
    pub fn merged_with(mut self, other: CatalogTranslator) -> Self {
        self.messages.extend(other.messages);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for CatalogTranslator {
    fn default() -> Self {
        // An empty catalog translates every key to itself.
        Self::from_toml_str(DEFAULT_CATALOG).unwrap_or_else(|_| Self {
            messages: BTreeMap::new(),
        })
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str) -> String {
        match self.messages.get(key) {
            Some(message) => message.clone(),
            None => {
                debug!(key, "no translation for key");
                key.to_string()
            }
        }
    }
}

/// Element type labels looked up through a `Translator` under `"<type>.label"`.
///
/// Falls back to the raw type tag when the catalog has no label.
#[derive(Debug, Clone)]
pub struct TranslatedTypeNames<T> {
    translator: T,
}

impl<T: Translator> TranslatedTypeNames<T> {
    pub fn new(translator: T) -> Self {
        Self { translator }
    }
}

impl<T: Translator> ElementTypeNameGenerator for TranslatedTypeNames<T> {
    fn localized_type_label(&self, element_type: &ElementType) -> String {
        let key = format!("{}.label", element_type.as_str());
        let label = self.translator.translate(&key);
        if label == key {
            element_type.as_str().to_string()
        } else {
            label
        }
    }
}
