//! Event logger configuration, loaded from TOML.
//!
//! Every field is optional; missing fields take the defaults below.
//!
//! ```toml
//! enabled = true
//! min_level = "info"          # entries less severe than this are dropped
//! blacklist = ["user_login"]  # type tags never logged
//! whitelist = []              # when non-empty, only these type tags are logged
//! anonymize_ip_addresses = true
//! ```

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use partlog_contracts::{LogEntry, LogError, LogLevel, LogResult};

/// Which entries the event logger persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Master switch.  When false nothing is written.
    pub enabled: bool,

    /// Least severe level that is still written.
    pub min_level: LogLevel,

    /// When non-empty, only entries with one of these type tags are written.
    pub whitelist: Vec<String>,

    /// Entries with one of these type tags are never written.
    pub blacklist: Vec<String>,

    /// Whether callers should strip the host part of addresses recorded in
    /// login, logout, and security entries.
    pub anonymize_ip_addresses: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_level: LogLevel::Info,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
            anonymize_ip_addresses: true,
        }
    }
}

/// Why the logger refused an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Disabled,
    BelowMinLevel,
    Blacklisted,
    NotWhitelisted,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disabled => "logging disabled",
            Self::BelowMinLevel => "below minimum level",
            Self::Blacklisted => "type is blacklisted",
            Self::NotWhitelisted => "type is not whitelisted",
        })
    }
}

impl LoggerConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `LogError::ConfigError` if the TOML is malformed, has unknown
    /// keys, or names an unknown level.
    pub fn from_toml_str(s: &str) -> LogResult<Self> {
        toml::from_str(s).map_err(|e| LogError::ConfigError {
            reason: format!("failed to parse logger TOML: {}", e),
        })
    }

    /// Read the file at `path` and parse it as logger configuration.
    pub fn from_file(path: &Path) -> LogResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LogError::ConfigError {
            reason: format!("failed to read logger config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Return why `entry` should not be written, or `None` to write it.
    pub fn check(&self, entry: &LogEntry) -> Option<Rejection> {
        let type_tag = entry.type_tag();

        if !self.enabled {
            Some(Rejection::Disabled)
        } else if !entry.level().is_at_least(self.min_level) {
            Some(Rejection::BelowMinLevel)
        } else if self.blacklist.iter().any(|t| t == type_tag) {
            Some(Rejection::Blacklisted)
        } else if !self.whitelist.is_empty() && !self.whitelist.iter().any(|t| t == type_tag) {
            Some(Rejection::NotWhitelisted)
        } else {
            None
        }
    }

    pub fn accepts(&self, entry: &LogEntry) -> bool {
        self.check(entry).is_none()
    }
}
