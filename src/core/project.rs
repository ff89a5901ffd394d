//! The project dependency manifest (`*.bru` in the project root).

use std::path::Path;

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::BruError;
use crate::util::jsonc;

/// Default name for a newly created project manifest.
pub const DEFAULT_PROJECT_MANIFEST: &str = "package.bru";

/// A project's `*.bru` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Module name to exact version string.
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectManifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = crate::util::fs::read_to_string(path)?;
        jsonc::from_str(&text).map_err(|e| {
            BruError::InvalidManifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        jsonc::save(path, self)
    }

    /// Record `module` at `version`, replacing any earlier version.
    pub fn add_dependency(&mut self, module: &str, version: &str) {
        self.dependencies
            .insert(module.to_string(), version.to_string());
    }
}
