//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [view_state]
//! views_per_logical_view = 3
//! compression_level = 6
//!
//! [logging]
//! filter = "viewstash=info,warn"
//! json = false
//! directory = "/var/log/viewstash"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default configuration values.
pub mod defaults {
    pub const VIEWS_PER_LOGICAL_VIEW: usize = 3;
    pub const COMPRESSION_LEVEL: u32 = 6;
    pub const MAX_COMPRESSION_LEVEL: u32 = 9;
    pub const CONSOLE_FILTER: &str = "viewstash=info,warn";
    pub const FILE_FILTER: &str = "viewstash=debug,viewstash_session=debug,info";
    pub const LOG_FILE_PREFIX: &str = "viewstash.log";
}

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g. project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewstashConfig {
    /// View state store settings.
    pub view_state: Option<ViewStateConfig>,

    /// Logging settings.
    pub logging: Option<LoggingConfig>,
}

impl ViewstashConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: ViewstashConfig) {
        if other.view_state.is_some() {
            self.view_state = other.view_state;
        }

        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    /// Effective view state settings.
    pub fn view_state(&self) -> ViewStateConfig {
        self.view_state.clone().unwrap_or_default()
    }

    /// Effective logging settings.
    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Check every section for out-of-range values.
    pub fn validate(&self) -> crate::Result<()> {
        if let Some(ref view_state) = self.view_state {
            view_state.validate()?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// View State Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// View state store configuration.
///
/// Fixed for the lifetime of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewStateConfig {
    /// Snapshots retained per logical view (also the number of logical
    /// views retained per session).
    pub views_per_logical_view: usize,

    /// Gzip level for stored snapshots, 0 (none) to 9 (best).
    pub compression_level: u32,
}

impl Default for ViewStateConfig {
    fn default() -> Self {
        Self {
            views_per_logical_view: defaults::VIEWS_PER_LOGICAL_VIEW,
            compression_level: defaults::COMPRESSION_LEVEL,
        }
    }
}

impl ViewStateConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.views_per_logical_view == 0 {
            return Err(ConfigError::Invalid {
                field: "view_state.views_per_logical_view".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.compression_level > defaults::MAX_COMPRESSION_LEVEL {
            return Err(ConfigError::Invalid {
                field: "view_state.compression_level".to_string(),
                reason: format!(
                    "{} exceeds the maximum of {}",
                    self.compression_level,
                    defaults::MAX_COMPRESSION_LEVEL
                ),
            });
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives for console output.
    pub filter: String,

    /// Emit console output as JSON lines.
    pub json: bool,

    /// Directory for a daily-rolling JSON log file. No file when unset.
    pub directory: Option<PathBuf>,

    /// `EnvFilter` directives for the log file.
    pub file_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: defaults::CONSOLE_FILTER.to_string(),
            json: false,
            directory: None,
            file_filter: defaults::FILE_FILTER.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config() {
        let config = ViewstashConfig::from_toml("").unwrap();
        assert!(config.view_state.is_none());
        assert!(config.logging.is_none());
        assert_eq!(config.view_state().views_per_logical_view, 3);
        assert_eq!(config.view_state().compression_level, 6);
        assert_eq!(config.logging().filter, "viewstash=info,warn");
    }

    #[test]
    fn test_parse_full() {
        let config = ViewstashConfig::from_toml(
            r#"
[view_state]
views_per_logical_view = 5
compression_level = 9

[logging]
filter = "viewstash=debug"
json = true
directory = "/tmp/viewstash-logs"
"#,
        )
        .unwrap();

        let view_state = config.view_state();
        assert_eq!(view_state.views_per_logical_view, 5);
        assert_eq!(view_state.compression_level, 9);

        let logging = config.logging();
        assert_eq!(logging.filter, "viewstash=debug");
        assert!(logging.json);
        assert_eq!(logging.directory, Some(PathBuf::from("/tmp/viewstash-logs")));
        assert_eq!(logging.file_filter, defaults::FILE_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config = ViewstashConfig::from_toml("[view_state]\ncompression_level = 1\n").unwrap();
        let view_state = config.view_state();
        assert_eq!(view_state.views_per_logical_view, 3);
        assert_eq!(view_state.compression_level, 1);
    }

    #[test]
    fn test_merge_overrides_sections() {
        let mut base = ViewstashConfig::from_toml(
            "[view_state]\nviews_per_logical_view = 4\n[logging]\njson = true\n",
        )
        .unwrap();
        let overlay = ViewstashConfig::from_toml("[view_state]\nviews_per_logical_view = 2\n").unwrap();

        base.merge(overlay);

        assert_eq!(base.view_state().views_per_logical_view, 2);
        assert!(base.logging().json);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ViewstashConfig::from_toml("[view_state]\nviews_per_logical_view = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "view_state.views_per_logical_view"));
    }

    #[test]
    fn test_validate_rejects_high_compression_level() {
        let config = ViewstashConfig::from_toml("[view_state]\ncompression_level = 12\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let result = ViewstashConfig::from_toml("[view_state]\nviews_per_logical_view = \"three\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
