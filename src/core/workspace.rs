//! Workspace - the project root and its `bru_modules` working tree.
//!
//! ```text
//! <project>/
//!   package.bru                    project dependency manifest
//!   package.gyp                    companion build manifest
//!   bru_common.gypi                shared gyp settings
//!   bru_modules/
//!     zlib/
//!       zlib.gyp                   rewritten build manifest
//!       bru-version.json           {"version": "1.2.8"}
//!       1.2.8/                     unpacked sources and marker files
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::catalog::COMMON_SETTINGS;
use crate::core::BruError;
use crate::util::fs;

/// Name of the working tree directory.
pub const MODULES_DIR: &str = "bru_modules";

/// A project and its working tree.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    modules_dir: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let modules_dir = root.join(MODULES_DIR);
        Workspace { root, modules_dir }
    }

    /// Get the project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the `bru_modules` directory.
    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    /// `bru_modules/<module>`: holds the rewritten manifest.
    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.modules_dir.join(module)
    }

    /// `bru_modules/<module>/<version>`: holds sources and markers.
    pub fn module_version_dir(&self, module: &str, version: &str) -> PathBuf {
        self.module_dir(module).join(version)
    }

    /// `bru_modules/<module>/<module>.gyp`
    pub fn build_manifest_path(&self, module: &str) -> PathBuf {
        self.module_dir(module).join(format!("{}.gyp", module))
    }

    /// `bru_modules/<module>/bru-version.json`
    pub fn version_record_path(&self, module: &str) -> PathBuf {
        self.module_dir(module).join("bru-version.json")
    }

    pub fn common_settings_path(&self) -> PathBuf {
        self.root.join(COMMON_SETTINGS)
    }

    /// Modules with a rewritten build manifest in the working tree, sorted.
    pub fn installed_modules(&self) -> Result<Vec<String>> {
        Ok(fs::subdirectory_names(&self.modules_dir)?
            .into_iter()
            .filter(|m| self.build_manifest_path(m).is_file())
            .collect())
    }

    /// Find the single `*.bru` file in the project root.
    pub fn find_project_manifest(&self) -> Result<Option<PathBuf>> {
        let pattern = format!(
            "{}/*.bru",
            glob::Pattern::escape(&self.root.to_string_lossy())
        );
        let mut found = glob::glob(&pattern)
            .with_context(|| format!("invalid search pattern: {}", pattern))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        found.sort();

        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(BruError::AmbiguousProjectManifest {
                dir: self.root.clone(),
                found: found
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect(),
            }
            .into()),
        }
    }

    /// Like [`Workspace::find_project_manifest`] but a missing file is an error.
    pub fn project_manifest(&self) -> Result<PathBuf> {
        self.find_project_manifest()?
            .ok_or_else(|| {
                BruError::NoProjectManifest {
                    dir: self.root.clone(),
                }
                .into()
            })
    }
}

/// The `*.gyp` next to a `*.bru` project manifest.
pub fn companion_build_manifest(project_manifest: &Path) -> PathBuf {
    project_manifest.with_extension("gyp")
}
