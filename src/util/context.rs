//! Global context for bru operations.
//!
//! Provides centralized access to configuration, paths, and terminal output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{self, Config};
use crate::util::shell::Shell;

/// Environment variable overriding the user-level home (`~/.bru`).
pub const HOME_ENV: &str = "BRU_HOME";

/// Environment variable overriding the catalog location.
pub const CATALOG_ENV: &str = "BRU_CATALOG";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory (the project root)
    cwd: PathBuf,

    /// Home directory for user-level data (~/.bru/)
    home: PathBuf,

    /// Catalog root given on the command line
    catalog_override: Option<PathBuf>,

    /// Merged global + project configuration
    config: Config,

    shell: Shell,
}

impl GlobalContext {
    /// Create a new GlobalContext for the current directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_paths(cwd, default_home()))
    }

    /// Create a GlobalContext with a specific working directory and home.
    pub fn with_paths(cwd: PathBuf, home: PathBuf) -> Self {
        let config = config::load_config(
            &home.join("config.toml"),
            &config::project_config_path(&cwd),
        );
        GlobalContext {
            cwd,
            home,
            catalog_override: None,
            config,
            shell: Shell::default(),
        }
    }

    /// Use `catalog` as the catalog root regardless of environment and config.
    pub fn with_catalog(mut self, catalog: PathBuf) -> Self {
        self.catalog_override = Some(catalog);
        self
    }

    pub fn set_catalog(&mut self, catalog: Option<PathBuf>) {
        self.catalog_override = catalog;
    }

    pub fn set_shell(&mut self, shell: Shell) {
        self.shell = shell;
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the bru home directory (~/.bru/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the shared download cache directory.
    pub fn downloads_dir(&self) -> PathBuf {
        self.home.join("downloads")
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Locate the catalog root.
    ///
    /// Order: explicit override, `$BRU_CATALOG`, `catalog.path` from config,
    /// `library/` next to the executable, `<home>/library`.
    pub fn catalog_dir(&self) -> PathBuf {
        if let Some(dir) = &self.catalog_override {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(CATALOG_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = &self.config.catalog.path {
            return dir.clone();
        }
        if let Some(dir) = beside_executable("library") {
            return dir;
        }
        self.home.join("library")
    }
}

/// `$BRU_HOME`, else `~/.bru`.
fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".bru"))
        .unwrap_or_else(|| PathBuf::from(".bru"))
}

fn beside_executable(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join(name);
    dir.is_dir().then_some(dir)
}
