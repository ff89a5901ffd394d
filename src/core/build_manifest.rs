//! gyp build manifests.
//!
//! Catalog templates (`<catalog>/<module>/<version>.gyp`) and the rewritten
//! manifests in the working tree share this shape. Only the keys bru reads or
//! rewrites are typed; every other gyp setting (`include_dirs`, `defines`,
//! `direct_dependent_settings`, ...) is carried through untouched in `extra`.

use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::BruError;
use crate::util::jsonc;

/// A gyp file: optional includes plus an ordered list of targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<String>>,

    pub targets: Vec<BuildTarget>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One gyp target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTarget {
    #[serde(rename = "target_name")]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: TargetKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,

    /// Exclusion list, expanded with the same rules as `sources`.
    #[serde(rename = "sources!", default, skip_serializing_if = "Option::is_none")]
    pub excluded_sources: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test: Option<TestSpec>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// How to run a test target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSpec {
    /// Working directory relative to the manifest's directory (default `./`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Literal input piped to the test, after which stdin is closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

/// gyp target type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetKind {
    Executable,
    StaticLibrary,
    SharedLibrary,
    LoadableModule,
    None,
    /// Anything else, such as a gyp variable like `<(library)`.
    Other(String),
}

impl From<String> for TargetKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "executable" => TargetKind::Executable,
            "static_library" => TargetKind::StaticLibrary,
            "shared_library" => TargetKind::SharedLibrary,
            "loadable_module" => TargetKind::LoadableModule,
            "none" => TargetKind::None,
            _ => TargetKind::Other(s),
        }
    }
}

impl From<TargetKind> for String {
    fn from(kind: TargetKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TargetKind::Executable => "executable",
            TargetKind::StaticLibrary => "static_library",
            TargetKind::SharedLibrary => "shared_library",
            TargetKind::LoadableModule => "loadable_module",
            TargetKind::None => "none",
            TargetKind::Other(s) => s,
        };
        f.write_str(s)
    }
}

impl BuildManifest {
    /// Load and validate a gyp file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = crate::util::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// Parse a gyp document; `path` is used in errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let manifest: BuildManifest =
            jsonc::from_str(text).map_err(|e| BruError::InvalidManifest {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(target) = manifest.targets.iter().find(|t| t.name.is_empty()) {
            return Err(BruError::InvalidManifest {
                path: path.to_path_buf(),
                reason: format!("target of type `{}` has an empty target_name", target.kind),
            }
            .into());
        }
        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        jsonc::save(path, self)
    }

    /// Targets that carry a `test` spec.
    pub fn test_targets(&self) -> impl Iterator<Item = (&BuildTarget, &TestSpec)> {
        self.targets
            .iter()
            .filter_map(|t| t.test.as_ref().map(|spec| (t, spec)))
    }
}

impl BuildTarget {
    /// A target with no sources, dependencies or extra settings.
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        BuildTarget {
            name: name.into(),
            kind,
            sources: None,
            excluded_sources: None,
            dependencies: None,
            test: None,
            extra: Map::new(),
        }
    }

    pub fn dependencies(&self) -> &[String] {
        self.dependencies.as_deref().unwrap_or_default()
    }
}
