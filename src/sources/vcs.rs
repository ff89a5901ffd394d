//! git and svn checkouts.
//!
//! A `git+`/`svn+` locator is checked out into
//! `<module-version dir>/<repository name>`. The client runs against a
//! staging directory that is renamed into place only when it exits with
//! status zero. An existing checkout is never updated or re-validated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::SourceLocator;
use crate::sources::staging::{AcquisitionUnit, Outcome};
use crate::util::process::{tool, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Final checkout path for `locator` inside `module_version_dir`.
pub fn checkout_path(locator: &SourceLocator, module_version_dir: &Path) -> Result<PathBuf> {
    let name = locator
        .checkout_name()
        .with_context(|| format!("cannot derive a checkout directory from `{}`", locator))?;
    Ok(module_version_dir.join(name))
}

/// The client invocation that checks `locator` out into `dest`.
pub fn checkout_command(locator: &SourceLocator, dest: &Path) -> Option<ProcessBuilder> {
    match locator {
        SourceLocator::Git(url) => Some(
            ProcessBuilder::new(tool("git"))
                .args(["clone", url.as_str()])
                .arg(dest),
        ),
        SourceLocator::Svn(url) => Some(
            ProcessBuilder::new(tool("svn"))
                .args(["checkout", url.as_str()])
                .arg(dest),
        ),
        _ => None,
    }
}

/// Check `locator` out under `module_version_dir` unless already present.
pub fn checkout_once(
    locator: &SourceLocator,
    module_version_dir: &Path,
    shell: &Shell,
) -> Result<Outcome> {
    let unit = AcquisitionUnit::directory(checkout_path(locator, module_version_dir)?);
    unit.ensure(|staged| {
        shell.status(Status::Cloning, locator);
        info!("checking out {} into {}", locator, unit.path().display());
        checkout_command(locator, staged)
            .with_context(|| format!("`{}` is not a version-control locator", locator))?
            .status_checked()
    })
}
