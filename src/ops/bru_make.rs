//! Implementation of `bru make`.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::builder::BuildDriver;
use crate::core::workspace::companion_build_manifest;
use crate::core::Workspace;
use crate::util::shell::Status;
use crate::util::GlobalContext;

/// Options for the make command.
#[derive(Debug, Clone, Default)]
pub struct MakeOptions {
    /// Build configuration, e.g. `Release` or `Debug`. Falls back to
    /// `make.config` from the configuration files.
    pub config: Option<String>,
}

/// Generate build files for the project's companion `*.gyp` and build them.
///
/// Returns the build manifest that was built.
pub fn make(ctx: &GlobalContext, opts: &MakeOptions, driver: &dyn BuildDriver) -> Result<PathBuf> {
    let workspace = Workspace::new(ctx.cwd());
    let config = opts
        .config
        .as_deref()
        .or(ctx.config().make.config.as_deref());

    let gyp = project_build_manifest(&workspace)?;
    ctx.shell().status(
        Status::Building,
        format!(
            "{}{}",
            gyp.file_name().unwrap_or_default().to_string_lossy(),
            config.map(|c| format!(" ({})", c)).unwrap_or_default()
        ),
    );

    driver.build(workspace.root(), &gyp, config)?;

    ctx.shell().status(Status::Finished, "build complete");
    Ok(gyp)
}

/// The `*.gyp` next to the project's `*.bru`.
pub fn project_build_manifest(workspace: &Workspace) -> Result<PathBuf> {
    let manifest = workspace.project_manifest()?;
    let gyp = companion_build_manifest(&manifest);
    if !gyp.is_file() {
        bail!(
            "{} has no companion {}\n\
             help: recreate one with `bru install <module>`",
            manifest.display(),
            gyp.file_name().unwrap_or_default().to_string_lossy()
        );
    }
    Ok(gyp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BruError;
    use crate::util::Shell;
    use std::cell::RefCell;
    use std::path::Path;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingDriver {
        builds: RefCell<Vec<(PathBuf, Option<String>)>>,
    }

    impl BuildDriver for RecordingDriver {
        fn build(&self, _root: &Path, build_manifest: &Path, config: Option<&str>) -> Result<()> {
            self.builds
                .borrow_mut()
                .push((build_manifest.to_path_buf(), config.map(str::to_string)));
            Ok(())
        }
    }

    fn ctx(project: &Path, home: &Path) -> GlobalContext {
        let mut ctx = GlobalContext::with_paths(project.to_path_buf(), home.to_path_buf());
        ctx.set_shell(Shell::quiet());
        ctx
    }

    #[test]
    fn test_make_builds_companion_manifest() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join("app.bru"), "{}").unwrap();
        std::fs::write(project.path().join("app.gyp"), "{\"targets\": []}").unwrap();
        let driver = RecordingDriver::default();

        let opts = MakeOptions {
            config: Some("Debug".to_string()),
        };
        let gyp = make(&ctx(project.path(), home.path()), &opts, &driver).unwrap();

        assert_eq!(gyp, project.path().join("app.gyp"));
        assert_eq!(
            driver.builds.borrow().as_slice(),
            &[(project.path().join("app.gyp"), Some("Debug".to_string()))]
        );
    }

    #[test]
    fn test_config_file_supplies_default() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join("app.bru"), "{}").unwrap();
        std::fs::write(project.path().join("app.gyp"), "{\"targets\": []}").unwrap();
        std::fs::create_dir_all(project.path().join(".bru")).unwrap();
        std::fs::write(
            project.path().join(".bru/config.toml"),
            "[make]\nconfig = \"Release\"\n",
        )
        .unwrap();
        let driver = RecordingDriver::default();

        make(&ctx(project.path(), home.path()), &MakeOptions::default(), &driver).unwrap();
        assert_eq!(driver.builds.borrow()[0].1.as_deref(), Some("Release"));
    }

    #[test]
    fn test_make_requires_project_manifest() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();

        let err = make(
            &ctx(project.path(), home.path()),
            &MakeOptions::default(),
            &RecordingDriver::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BruError>(),
            Some(BruError::NoProjectManifest { .. })
        ));
    }

    #[test]
    fn test_make_requires_companion_manifest() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        std::fs::write(project.path().join("app.bru"), "{}").unwrap();

        let err = make(
            &ctx(project.path(), home.path()),
            &MakeOptions::default(),
            &RecordingDriver::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("app.gyp"));
    }
}
