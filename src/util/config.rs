//! Configuration file support for bru.
//!
//! bru reads two configuration file locations:
//! - Global: `~/.bru/config.toml` - User-wide defaults
//! - Project: `.bru/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// bru configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog settings
    pub catalog: CatalogConfig,

    /// Settings for `bru make`
    pub make: MakeConfig,
}

/// Catalog-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Root directory of the catalog (`<module>/<version>.bru` files)
    pub path: Option<PathBuf>,
}

/// Build-generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeConfig {
    /// Default build configuration (e.g. `Release`)
    pub config: Option<String>,

    /// gyp executable name or path
    pub gyp: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.catalog.path.is_some() {
            self.catalog.path = other.catalog.path;
        }
        if other.make.config.is_some() {
            self.make.config = other.make.config;
        }
        if other.make.gyp.is_some() {
            self.make.gyp = other.make.gyp;
        }
    }

    /// The gyp executable to run.
    pub fn gyp(&self) -> &str {
        self.make.gyp.as_deref().unwrap_or("gyp")
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.bru/config.toml)
/// 2. Global config (~/.bru/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the project config path (.bru/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".bru").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.catalog.path.is_none());
        assert!(config.make.config.is_none());
        assert_eq!(config.gyp(), "gyp");
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[catalog]
path = "/opt/bru/library"

[make]
config = "Debug"
gyp = "/usr/local/bin/gyp"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.catalog.path, Some(PathBuf::from("/opt/bru/library")));
        assert_eq!(config.make.config.as_deref(), Some("Debug"));
        assert_eq!(config.gyp(), "/usr/local/bin/gyp");
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(&global, "[catalog]\npath = \"/global\"\n[make]\nconfig = \"Release\"\n")
            .unwrap();
        std::fs::write(&project, "[make]\nconfig = \"Debug\"\n").unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.catalog.path, Some(PathBuf::from("/global")));
        assert_eq!(config.make.config.as_deref(), Some("Debug"));
    }

    #[test]
    fn test_unreadable_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.catalog.path.is_none());
    }
}
