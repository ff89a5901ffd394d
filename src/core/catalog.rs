//! The catalog: a read-only directory tree of formulas and build-manifest
//! templates.
//!
//! ```text
//! <catalog>/
//!   bru_common.gypi
//!   zlib/
//!     1.2.8.bru        formula
//!     1.2.8.gyp        build manifest template
//!     patch.tar.gz     archives referenced by `file:` locators
//! ```

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;

use crate::core::build_manifest::BuildManifest;
use crate::core::formula::Formula;
use crate::core::BruError;

/// Name of the shared gyp settings file at the catalog root.
pub const COMMON_SETTINGS: &str = "bru_common.gypi";

/// Anything formulas can be looked up in.
pub trait FormulaSource {
    /// Load the formula for `module` at exactly `version`.
    fn load_formula(&self, module: &str, version: &str) -> Result<Formula>;
}

/// A catalog rooted at a directory.
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Catalog { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.root.join(module)
    }

    pub fn formula_path(&self, module: &str, version: &str) -> PathBuf {
        self.module_dir(module).join(format!("{}.bru", version))
    }

    pub fn build_manifest_path(&self, module: &str, version: &str) -> PathBuf {
        self.module_dir(module).join(format!("{}.gyp", version))
    }

    pub fn common_settings_path(&self) -> PathBuf {
        self.root.join(COMMON_SETTINGS)
    }

    pub fn has_module(&self, module: &str) -> bool {
        self.module_dir(module).is_dir()
    }

    /// All versions of `module` that have a formula, oldest first.
    pub fn versions(&self, module: &str) -> Result<Vec<String>> {
        let dir = self.module_dir(module);
        if !dir.is_dir() {
            return Err(self.module_not_found(module).into());
        }

        let mut versions = Vec::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("failed to read catalog directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "bru") {
                if let Some(stem) = path.file_stem() {
                    versions.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        sort_versions(&mut versions);
        Ok(versions)
    }

    /// The newest version of `module`.
    pub fn latest_version(&self, module: &str) -> Result<String> {
        self.versions(module)?
            .pop()
            .ok_or_else(|| self.module_not_found(module).into())
    }

    /// Load the build manifest template for `module` at `version`.
    pub fn load_build_manifest(&self, module: &str, version: &str) -> Result<BuildManifest> {
        let path = self.build_manifest_path(module, version);
        if !path.is_file() {
            return Err(BruError::InvalidManifest {
                path,
                reason: "build manifest template is missing".to_string(),
            }
            .into());
        }
        BuildManifest::load(&path)
    }

    fn module_not_found(&self, module: &str) -> BruError {
        BruError::ModuleNotFound {
            module: module.to_string(),
            catalog: self.root.clone(),
        }
    }
}

impl FormulaSource for Catalog {
    fn load_formula(&self, module: &str, version: &str) -> Result<Formula> {
        if !self.has_module(module) {
            return Err(self.module_not_found(module).into());
        }
        let path = self.formula_path(module, version);
        if !path.is_file() {
            return Err(BruError::VersionNotFound {
                module: module.to_string(),
                version: version.to_string(),
                catalog: self.root.clone(),
            }
            .into());
        }

        let formula = Formula::load(&path)?;
        if formula.module != module || formula.version != version {
            return Err(BruError::InvalidManifest {
                path,
                reason: format!(
                    "declares {}@{} but is stored as {}@{}",
                    formula.module, formula.version, module, version
                ),
            }
            .into());
        }
        Ok(formula)
    }
}

/// Sort by semver when every version parses as one, else lexically.
fn sort_versions(versions: &mut [String]) {
    let parsed: Option<Vec<Version>> = versions.iter().map(|v| Version::parse(v).ok()).collect();
    match parsed {
        Some(_) => versions.sort_by(|a, b| compare_semver(a, b)),
        None => versions.sort(),
    }
}

fn compare_semver(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
