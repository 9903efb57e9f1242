//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Locate the durable store record.
//! - Provide logging level and directory defaults.
//!
//! # Invariants
//! - Blank variables behave as if unset.
//! - Resolution never fails; unusable values fall back to defaults and are
//!   rejected later by the component that consumes them.

use crate::logging::default_log_level;
use std::path::PathBuf;

/// Durable record location override.
pub const DATA_PATH_ENV: &str = "GUIDEME_DATA_PATH";
/// Log level override (`trace|debug|info|warn|error`).
pub const LOG_LEVEL_ENV: &str = "GUIDEME_LOG_LEVEL";
/// Absolute directory for rolling log files. File logging is off when unset.
pub const LOG_DIR_ENV: &str = "GUIDEME_LOG_DIR";

const DEFAULT_RECORD_FILE_NAME: &str = "guideme_store.json";

/// Settings shared by every front-end of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, applying defaults for blanks.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        let defaults = Self::default();
        Self {
            data_path: value(DATA_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            log_level: value(LOG_LEVEL_ENV).unwrap_or(defaults.log_level),
            log_dir: value(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Record path used when nothing else is configured.
pub fn default_data_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_RECORD_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{default_data_path, CoreConfig, DATA_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.data_path, default_data_path());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn variables_override_defaults_after_trim() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DATA_PATH_ENV, " /srv/guideme/store.json "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/guideme"),
        ]));
        assert_eq!(config.data_path, PathBuf::from("/srv/guideme/store.json"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/guideme")));
    }

    #[test]
    fn blank_variables_are_ignored() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (DATA_PATH_ENV, "   "),
            (LOG_DIR_ENV, ""),
        ]));
        assert_eq!(config.data_path, default_data_path());
        assert!(config.log_dir.is_none());
    }
}
