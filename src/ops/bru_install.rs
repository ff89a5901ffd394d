//! Implementation of `bru install`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::builder::{ensure_common_settings, ManifestRewriter};
use crate::core::catalog::COMMON_SETTINGS;
use crate::core::project::DEFAULT_PROJECT_MANIFEST;
use crate::core::workspace::{companion_build_manifest, MODULES_DIR};
use crate::core::{
    BuildManifest, BuildTarget, Catalog, Installable, ProjectManifest, TargetKind, Workspace,
};
use crate::resolver::{Resolution, Resolver};
use crate::sources::{Acquirer, DownloadCache, Downloader};
use crate::util::fs;
use crate::util::shell::{format_duration, Status};
use crate::util::GlobalContext;

/// Options for the install command.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Modules to add to the project manifest first (empty = install what is
    /// already listed).
    pub installables: Vec<Installable>,
}

/// What an install did.
#[derive(Debug)]
pub struct InstallResult {
    /// The project manifest that was installed from.
    pub manifest: PathBuf,
    /// Modules added to the project manifest, with their pinned versions.
    pub added: Vec<(String, String)>,
    pub resolution: Resolution,
}

/// Install the project's dependencies, adding `opts.installables` first.
pub fn install(
    ctx: &GlobalContext,
    opts: &InstallOptions,
    downloader: &dyn Downloader,
) -> Result<InstallResult> {
    let catalog = Catalog::new(ctx.catalog_dir());
    let workspace = Workspace::new(ctx.cwd());

    let (manifest, added) = if opts.installables.is_empty() {
        (workspace.project_manifest()?, Vec::new())
    } else {
        add_installables(ctx, &catalog, &workspace, &opts.installables)?
    };

    let resolution = install_from_manifest(ctx, &catalog, &workspace, &manifest, downloader)?;

    Ok(InstallResult {
        manifest,
        added,
        resolution,
    })
}

/// Pin `installables` and record them in the project manifest and its
/// companion build manifest, creating either file when missing.
fn add_installables(
    ctx: &GlobalContext,
    catalog: &Catalog,
    workspace: &Workspace,
    installables: &[Installable],
) -> Result<(PathBuf, Vec<(String, String)>)> {
    // Validate every argument before touching any file.
    let pinned = installables
        .iter()
        .map(|installable| installable.resolve(catalog))
        .collect::<Result<Vec<_>>>()?;

    let manifest_path = match workspace.find_project_manifest()? {
        Some(path) => path,
        None => {
            let path = workspace.root().join(DEFAULT_PROJECT_MANIFEST);
            ProjectManifest::default().save(&path)?;
            ctx.shell().status(Status::Created, display_name(&path));
            path
        }
    };

    let gyp_path = companion_build_manifest(&manifest_path);
    if !gyp_path.exists() {
        create_companion_build_manifest(&gyp_path)?;
        ctx.shell().status(Status::Created, display_name(&gyp_path));
    }

    let mut manifest = ProjectManifest::load(&manifest_path)?;
    for (module, version) in &pinned {
        manifest.add_dependency(module, version);
    }
    manifest.save(&manifest_path)?;

    add_module_dependencies(
        &gyp_path,
        pinned.iter().map(|(module, _)| module.as_str()),
    )?;

    for (module, version) in &pinned {
        ctx.shell().status(
            Status::Added,
            format!(
                "{} v{} to {} and {}",
                module,
                version,
                display_name(&manifest_path),
                display_name(&gyp_path)
            ),
        );
    }

    Ok((manifest_path, pinned))
}

/// Resolve, acquire and rewrite everything `manifest_path` depends on.
pub fn install_from_manifest(
    ctx: &GlobalContext,
    catalog: &Catalog,
    workspace: &Workspace,
    manifest_path: &Path,
    downloader: &dyn Downloader,
) -> Result<Resolution> {
    let shell = ctx.shell();
    let start = Instant::now();
    let manifest = ProjectManifest::load(manifest_path)?;
    let root = display_name(manifest_path);

    shell.status(Status::Resolving, format!("dependencies of {}", root));
    let resolution = Resolver::new(catalog).resolve(&root, &manifest.dependencies)?;

    let cache = DownloadCache::new(ctx.downloads_dir());
    let acquirer = Acquirer::new(catalog, workspace, &cache, downloader, shell);
    let versions = resolution.version_map();
    let rewriter = ManifestRewriter::new(catalog, workspace, &versions);

    for (dep, formula) in resolution.iter() {
        shell.status(
            Status::Installing,
            format!("{} v{} (requested by {})", dep.module, dep.version, dep.requestor),
        );
        debug!(
            "processing dependency {} version {} requested by {}",
            dep.module, dep.version, dep.requestor
        );
        acquirer
            .acquire(formula)
            .with_context(|| format!("failed to acquire {} {}", dep.module, dep.version))?;
        rewriter.rewrite(formula)?;
    }

    if ensure_common_settings(catalog, workspace)? {
        shell.status(Status::Created, COMMON_SETTINGS);
    }

    shell.status(
        Status::Finished,
        format!(
            "{} modules into {} in {}",
            resolution.len(),
            MODULES_DIR,
            format_duration(start.elapsed())
        ),
    );
    Ok(resolution)
}

/// Write the skeleton build manifest that accompanies a new project manifest.
pub fn create_companion_build_manifest(path: &Path) -> Result<()> {
    let manifest = BuildManifest {
        includes: Some(vec![COMMON_SETTINGS.to_string()]),
        targets: vec![skeleton_target()],
        extra: Map::new(),
    };
    manifest.save(path)
}

fn skeleton_target() -> BuildTarget {
    let mut target = BuildTarget::new("foo", TargetKind::None);
    target.sources = Some(Vec::new());
    target
        .extra
        .insert("include_dirs".to_string(), Value::Array(Vec::new()));
    target.dependencies = Some(Vec::new());
    target
}

/// Make the first target of the project build manifest depend on every
/// target of each module in `modules`.
pub fn add_module_dependencies<'m>(
    gyp_path: &Path,
    modules: impl IntoIterator<Item = &'m str>,
) -> Result<()> {
    let mut manifest = BuildManifest::load(gyp_path)?;
    if manifest.targets.is_empty() {
        manifest.targets.push(skeleton_target());
    }

    let first = &mut manifest.targets[0];
    let deps = first.dependencies.get_or_insert_with(Vec::new);
    for module in modules {
        let entry = format!("bru_modules/{}/{}.gyp:*", module, module);
        if !deps.contains(&entry) {
            deps.push(entry);
        }
    }

    manifest.save(gyp_path)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| fs::to_slash(path))
}
