//! Module acquisition: fetch, unpack and legacy-build one resolved module.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::core::formula::host_platform;
use crate::core::{Catalog, Formula, SourceLocator, Workspace};
use crate::sources::archive;
use crate::sources::download::{DownloadCache, Downloader};
use crate::sources::staging::{AcquisitionUnit, Outcome};
use crate::sources::vcs;
use crate::util::fs;
use crate::util::process::ProcessBuilder;
use crate::util::shell::{Shell, Status};

/// Marker written after a formula's `make_command` succeeds.
pub const MAKE_DONE_MARKER: &str = "make_command.done";

/// Brings modules into a workspace's working tree.
pub struct Acquirer<'a> {
    catalog: &'a Catalog,
    workspace: &'a Workspace,
    cache: &'a DownloadCache,
    downloader: &'a dyn Downloader,
    shell: &'a Shell,
    platform: String,
}

impl<'a> Acquirer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        workspace: &'a Workspace,
        cache: &'a DownloadCache,
        downloader: &'a dyn Downloader,
        shell: &'a Shell,
    ) -> Self {
        Acquirer {
            catalog,
            workspace,
            cache,
            downloader,
            shell,
            platform: host_platform().to_string(),
        }
    }

    /// Select `make_command` entries for `platform` instead of the host.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Make sure `formula`'s sources are unpacked (and legacy-built, if it
    /// has a `make_command`) under `bru_modules/<module>/<version>`.
    pub fn acquire(&self, formula: &Formula) -> Result<()> {
        let dir = self
            .workspace
            .module_version_dir(&formula.module, &formula.version);
        fs::ensure_dir(&dir)?;

        for locator in &formula.locators {
            self.acquire_locator(formula, locator, &dir)?;
        }

        self.legacy_build(formula, &dir)
    }

    fn acquire_locator(&self, formula: &Formula, locator: &SourceLocator, dir: &Path) -> Result<()> {
        match locator {
            SourceLocator::Archive(url) => {
                let file = locator
                    .file_name()
                    .with_context(|| format!("cannot derive a file name from `{}`", url))?;
                let archive = self.cache.fetch(
                    self.downloader,
                    self.shell,
                    &formula.module,
                    &formula.version,
                    url,
                    &file,
                )?;
                self.unpack(&archive, dir)
            }
            SourceLocator::CatalogFile(path) => {
                let archive = self.catalog.module_dir(&formula.module).join(path);
                self.unpack(&archive, dir)
            }
            SourceLocator::Git(_) | SourceLocator::Svn(_) => {
                vcs::checkout_once(locator, dir, self.shell)?;
                Ok(())
            }
        }
    }

    fn unpack(&self, archive: &Path, dir: &Path) -> Result<()> {
        if archive::unpack_once(archive, dir)? == Outcome::Performed {
            self.shell.status(
                Status::Unpacking,
                format!(
                    "{} into {}",
                    archive.file_name().unwrap_or_default().to_string_lossy(),
                    fs::relative_path(self.workspace.root(), dir).display()
                ),
            );
        }
        Ok(())
    }

    fn legacy_build(&self, formula: &Formula, dir: &Path) -> Result<()> {
        if formula.make_command.is_empty() {
            return Ok(());
        }

        AcquisitionUnit::marker(dir.join(MAKE_DONE_MARKER)).ensure(|dir| {
            let Some(command) = formula.make_command_for(&self.platform)? else {
                return Ok(());
            };
            self.shell.status(
                Status::Building,
                format!("{} {} via `{}`", formula.module, formula.version, command),
            );
            info!("running make_command in {}", dir.display());
            ProcessBuilder::shell(command).cwd(dir).status_checked()
        })?;
        Ok(())
    }
}
