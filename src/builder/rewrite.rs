//! Materialize a module's build manifest in the working tree.
//!
//! The catalog template for `<module>/<version>.gyp` is turned into
//! `bru_modules/<module>/<module>.gyp`: cross-module references are checked
//! against the resolved-version map, source patterns are expanded, and the
//! shared settings file is included unless the template lists its own
//! includes.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::builder::expand::expand_sources;
use crate::core::catalog::COMMON_SETTINGS;
use crate::core::{BruError, BuildManifest, BuildTarget, Catalog, DependencyRef, Formula, Workspace};
use crate::util::{fs, jsonc};

/// Side-car written next to each rewritten manifest.
#[derive(Debug, Serialize)]
struct VersionRecord<'a> {
    version: &'a str,
}

/// Rewrites catalog templates against one resolution.
pub struct ManifestRewriter<'a> {
    catalog: &'a Catalog,
    workspace: &'a Workspace,
    versions: &'a IndexMap<String, String>,
}

impl<'a> ManifestRewriter<'a> {
    pub fn new(
        catalog: &'a Catalog,
        workspace: &'a Workspace,
        versions: &'a IndexMap<String, String>,
    ) -> Self {
        ManifestRewriter {
            catalog,
            workspace,
            versions,
        }
    }

    /// Rewrite and persist `formula`'s manifest. Returns the written path.
    pub fn rewrite(&self, formula: &Formula) -> Result<PathBuf> {
        let template = self
            .catalog
            .load_build_manifest(&formula.module, &formula.version)?;
        let module_dir = self.workspace.module_dir(&formula.module);

        let manifest = rewrite_manifest(template, formula, self.versions, &module_dir)?;

        let path = self.workspace.build_manifest_path(&formula.module);
        manifest.save(&path)?;
        jsonc::save(
            &self.workspace.version_record_path(&formula.module),
            &VersionRecord {
                version: &formula.version,
            },
        )?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// Apply reference resolution, source expansion and settings injection to
/// `template`. Source patterns are expanded against `module_dir`.
pub fn rewrite_manifest(
    mut template: BuildManifest,
    formula: &Formula,
    versions: &IndexMap<String, String>,
    module_dir: &Path,
) -> Result<BuildManifest> {
    for target in &mut template.targets {
        resolve_references(target, formula, versions)?;

        if let Some(sources) = &target.sources {
            target.sources = Some(expand_sources(&formula.module, module_dir, sources)?);
        }
        if let Some(excluded) = &target.excluded_sources {
            target.excluded_sources = Some(expand_sources(&formula.module, module_dir, excluded)?);
        }
    }

    if template.includes.is_none() {
        template.includes = Some(vec![format!("../../{}", COMMON_SETTINGS)]);
    }

    Ok(template)
}

fn resolve_references(
    target: &mut BuildTarget,
    formula: &Formula,
    versions: &IndexMap<String, String>,
) -> Result<()> {
    let Some(dependencies) = &target.dependencies else {
        return Ok(());
    };

    let mut resolved = Vec::with_capacity(dependencies.len());
    for entry in dependencies {
        let reference = DependencyRef::parse(entry)?;
        if let DependencyRef::CrossModule {
            module,
            target: upstream,
        } = &reference
        {
            let Some(version) = versions.get(module) else {
                bail!(BruError::UnresolvedReference {
                    referenced: module.clone(),
                    module: formula.module.clone(),
                    version: formula.version.clone(),
                    target: target.name.clone(),
                });
            };
            debug!(
                "{}:{} -> {}@{}:{}",
                formula.module, target.name, module, version, upstream
            );
        }
        resolved.push(reference.to_string());
    }

    target.dependencies = Some(resolved);
    Ok(())
}

/// Make sure the project root has the shared settings file, copying the
/// catalog's copy or writing a default. Never overwrites. Returns true if a
/// file was written.
pub fn ensure_common_settings(catalog: &Catalog, workspace: &Workspace) -> Result<bool> {
    let dest = workspace.common_settings_path();
    if dest.exists() {
        return Ok(false);
    }

    let src = catalog.common_settings_path();
    if src.is_file() {
        return fs::copy_file_if_absent(&src, &dest);
    }
    fs::write_string(&dest, DEFAULT_COMMON_SETTINGS)?;
    Ok(true)
}

/// Written when the catalog ships no `bru_common.gypi`.
pub const DEFAULT_COMMON_SETTINGS: &str = r#"{
    "target_defaults": {
        "default_configuration": "Release",
        "configurations": {
            "Debug": {
                "defines": ["DEBUG", "_DEBUG"],
                "cflags": ["-g", "-O0"],
                "msvs_settings": {
                    "VCCLCompilerTool": {"RuntimeLibrary": 1, "Optimization": 0}
                }
            },
            "Release": {
                "defines": ["NDEBUG"],
                "cflags": ["-O2"],
                "msvs_settings": {
                    "VCCLCompilerTool": {"RuntimeLibrary": 0, "Optimization": 2}
                }
            }
        }
    }
}
"#;
