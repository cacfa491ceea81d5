//! Locating and layering config files.
//!
//! Two layers are read, the later one winning section by section:
//! 1. the user file, `config.toml` in `$VIEWSTASH_CONFIG_DIR` or the
//!    platform config directory (`~/.config/viewstash` on Linux)
//! 2. `viewstash.toml` in the project directory
//!
//! Missing files are skipped silently. A file that cannot be read or parsed
//! is skipped with a warning so one bad layer does not take the host down.

use std::iter;
use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, ViewstashConfig};

const PROJECT_CONFIG_FILE: &str = "viewstash.toml";
const USER_CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "VIEWSTASH_CONFIG_DIR";

/// Which layer a config file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    User,
    Project,
}

/// One candidate config file and whether it contributed.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub layer: Layer,
    pub path: PathBuf,
    pub loaded: bool,
}

/// Merged configuration plus how it was assembled.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: ViewstashConfig,
    /// Candidates in the order they were applied.
    pub sources: Vec<ConfigSource>,
    /// One entry per skipped, broken layer.
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Paths of the files that contributed.
    pub fn loaded_from(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
    }

    fn apply(&mut self, layer: Layer, path: PathBuf) {
        let loaded = path.is_file()
            && match load_config_file(&path) {
                Ok(overlay) => {
                    self.config.merge(overlay);
                    true
                }
                Err(e) => {
                    self.warnings.push(format!("skipped {}: {e}", path.display()));
                    false
                }
            };
        self.sources.push(ConfigSource { layer, path, loaded });
    }
}

/// Discover, merge and validate configuration for a host running in
/// `project_dir` (the working directory when `None`).
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_from(project_dir, user_config_dir().as_deref())
}

/// Like [`load_config`] with an explicit user config directory. `None` skips
/// the user layer.
pub fn load_config_from(project_dir: Option<&Path>, user_dir: Option<&Path>) -> Result<LoadedConfig> {
    let user = user_dir.map(|dir| (Layer::User, dir.join(USER_CONFIG_FILE)));
    let project = (
        Layer::Project,
        project_dir.unwrap_or(Path::new(".")).join(PROJECT_CONFIG_FILE),
    );

    let mut loaded = LoadedConfig::default();
    for (layer, path) in user.into_iter().chain(iter::once(project)) {
        loaded.apply(layer, path);
    }

    loaded.config.validate()?;
    Ok(loaded)
}

/// Parse one config file without layering.
pub fn load_config_file(path: &Path) -> Result<ViewstashConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    ViewstashConfig::from_toml(&contents)
}

/// Directory holding the user config file.
pub fn user_config_dir() -> Option<PathBuf> {
    match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|d| d.join("viewstash")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) {
        fs::write(dir.path().join(name), contents).unwrap();
    }

    #[test]
    fn test_load_config_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "config.toml", "[view_state]\nviews_per_logical_view = 7\n");

        let config = load_config_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.view_state().views_per_logical_view, 7);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/viewstash.toml"));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn test_project_overrides_user() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write(
            &user,
            USER_CONFIG_FILE,
            "[view_state]\nviews_per_logical_view = 5\n[logging]\njson = true\n",
        );
        write(&project, PROJECT_CONFIG_FILE, "[view_state]\nviews_per_logical_view = 2\n");

        let loaded = load_config_from(Some(project.path()), Some(user.path())).unwrap();

        assert_eq!(loaded.config.view_state().views_per_logical_view, 2);
        assert!(loaded.config.logging().json);
        assert_eq!(loaded.loaded_from().count(), 2);
        assert_eq!(loaded.sources[0].layer, Layer::User);
        assert_eq!(loaded.sources[1].layer, Layer::Project);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let project = TempDir::new().unwrap();

        let loaded = load_config_from(Some(project.path()), None).unwrap();

        assert_eq!(loaded.loaded_from().count(), 0);
        assert_eq!(loaded.sources.len(), 1);
        assert_eq!(loaded.config.view_state().views_per_logical_view, 3);
    }

    #[test]
    fn test_broken_layer_is_skipped_with_warning() {
        let user = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        write(&user, USER_CONFIG_FILE, "[view_state\n");
        write(&project, PROJECT_CONFIG_FILE, "[logging]\njson = true\n");

        let loaded = load_config_from(Some(project.path()), Some(user.path())).unwrap();

        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.loaded_from().count(), 1);
        assert!(loaded.config.logging().json);
    }

    #[test]
    fn test_invalid_merged_config_is_rejected() {
        let project = TempDir::new().unwrap();
        write(&project, PROJECT_CONFIG_FILE, "[view_state]\nviews_per_logical_view = 0\n");

        let result = load_config_from(Some(project.path()), None);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
