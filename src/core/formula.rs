//! Catalog formulas.
//!
//! A formula (`<catalog>/<module>/<version>.bru`) describes one module at one
//! version: where its source comes from, what it depends on, and optionally
//! a per-platform shell command that builds it in place.

use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::locator::SourceLocator;
use crate::core::BruError;
use crate::util::jsonc;

/// A single locator string or an ordered list of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// Formula document as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawFormula {
    module: Option<String>,
    version: Option<String>,
    url: Option<OneOrMany>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    make_command: IndexMap<String, String>,
}

/// A validated formula.
#[derive(Debug, Clone)]
pub struct Formula {
    pub module: String,
    pub version: String,
    /// Source locators, applied in order into the same module-version directory.
    pub locators: Vec<SourceLocator>,
    /// Module name to exact version string.
    pub dependencies: IndexMap<String, String>,
    /// Host platform name (`Linux`, `Darwin`, `Windows`) to shell command.
    pub make_command: IndexMap<String, String>,
}

impl Formula {
    /// Load and validate a formula file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw: RawFormula = jsonc::load(path)?;
        Self::from_raw(raw, path)
    }

    /// Parse and validate a formula from text; `path` is used in errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let raw: RawFormula = jsonc::from_str(text).map_err(|e| BruError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_raw(raw, path)
    }

    fn from_raw(raw: RawFormula, path: &Path) -> Result<Self> {
        let invalid = |reason: &str| BruError::InvalidManifest {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let module = raw
            .module
            .filter(|m| !m.is_empty())
            .ok_or_else(|| invalid("missing `module`"))?;
        let version = raw
            .version
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("missing `version`"))?;
        let urls = raw
            .url
            .map(OneOrMany::into_vec)
            .unwrap_or_default();
        if urls.is_empty() {
            return Err(invalid("missing `url`").into());
        }

        let locators = urls
            .iter()
            .map(|u| SourceLocator::parse(u))
            .collect::<Result<Vec<_>>>()?;

        Ok(Formula {
            module,
            version,
            locators,
            dependencies: raw.dependencies,
            make_command: raw.make_command,
        })
    }

    /// The legacy build command for `platform`, if this formula has one.
    ///
    /// A formula with commands for other platforms only is an error.
    pub fn make_command_for(&self, platform: &str) -> Result<Option<&str>> {
        if self.make_command.is_empty() {
            return Ok(None);
        }
        match self.make_command.get(platform) {
            Some(cmd) => Ok(Some(cmd.as_str())),
            None => Err(BruError::UnsupportedPlatform {
                platform: platform.to_string(),
                context: format!("make_command of {}/{}", self.module, self.version),
            }
            .into()),
        }
    }
}

/// The host platform name used as a key in `make_command`.
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Darwin",
        "windows" => "Windows",
        other => other,
    }
}
