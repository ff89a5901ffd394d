//! gyp project generation and toolchain invocation.
//!
//! `bru make` and the build gate of `bru test` both go through a
//! [`BuildDriver`]. The stock driver, [`GypMake`], generates Makefiles on
//! Linux and macOS and a Visual Studio solution on Windows, then runs the
//! matching build tool from the project root.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::{info, warn};

use crate::core::formula::host_platform;
use crate::core::BruError;
use crate::util::process::{find_executable, tool, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Visual Studio release assumed when none can be detected.
pub const DEFAULT_MSVS_YEAR: u32 = 2012;

static MSVS_TOOLS_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^VS(\d+)COMNTOOLS$").expect("msvs env regex"));

/// Generates build files for a project manifest and builds them.
pub trait BuildDriver {
    /// Build `build_manifest` (a `*.gyp` directly inside `root`).
    fn build(&self, root: &Path, build_manifest: &Path, config: Option<&str>) -> Result<()>;
}

/// gyp plus make or msbuild.
#[derive(Debug, Clone)]
pub struct GypMake {
    gyp: PathBuf,
    make: PathBuf,
    platform: String,
    shell: Shell,
}

impl GypMake {
    /// Use `gyp` (a name on PATH or a path) for the current host.
    pub fn new(gyp: &str, shell: Shell) -> Self {
        GypMake {
            gyp: tool(gyp),
            make: tool("make"),
            platform: host_platform().to_string(),
            shell,
        }
    }

    /// Use a different `make` executable.
    pub fn with_make(mut self, make: impl Into<PathBuf>) -> Self {
        self.make = make.into();
        self
    }

    /// Generate for `platform` instead of the host.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// The gyp invocation for this platform.
    pub fn generate_command(&self, root: &Path, file_name: &str) -> Result<ProcessBuilder> {
        let gyp = ProcessBuilder::new(&self.gyp).cwd(root).arg("--depth=.");
        match self.platform.as_str() {
            "Linux" | "Darwin" => Ok(gyp.args(["-f", "make", file_name])),
            "Windows" => {
                let year = msvs_year(std::env::vars().map(|(k, _)| k));
                Ok(gyp
                    .arg(file_name)
                    .args(["-G", &format!("msvs_version={}", year)]))
            }
            other => bail!(unsupported(other)),
        }
    }

    fn build_unix(&self, root: &Path, config: Option<&str>) -> Result<()> {
        if !root.join("Makefile").is_file() {
            bail!(
                "gyp did not generate {}\n\
                 hint: run gyp manually to generate build files for your toolchain",
                root.join("Makefile").display()
            );
        }

        let mut make = ProcessBuilder::new(&self.make).cwd(root);
        if let Some(config) = config {
            make = make.arg(format!("BUILDTYPE={}", config));
        }
        self.run(make)
    }

    fn build_windows(&self, root: &Path, build_manifest: &Path, config: Option<&str>) -> Result<()> {
        let sln = build_manifest.with_extension("sln");
        if !sln.is_file() {
            bail!(
                "gyp did not generate {}\n\
                 hint: set GYP_GENERATORS=msvs and run gyp manually",
                sln.display()
            );
        }

        let msbuild = locate_msbuild().context(
            "msbuild not found; it ships with the .NET framework and Visual Studio",
        )?;
        let build = ProcessBuilder::new(msbuild)
            .cwd(root)
            .arg(&sln)
            .arg(format!("/p:Configuration={}", config.unwrap_or("Release")));
        self.run(build)
    }

    fn run(&self, cmd: ProcessBuilder) -> Result<()> {
        self.shell.status(Status::Running, cmd.display_command());
        info!("running `{}`", cmd.display_command());
        cmd.status_checked()
    }
}

impl BuildDriver for GypMake {
    fn build(&self, root: &Path, build_manifest: &Path, config: Option<&str>) -> Result<()> {
        // gyp mis-generates when handed `./name.gyp`, so pass the bare file name.
        let file_name = build_manifest
            .file_name()
            .with_context(|| format!("not a file: {}", build_manifest.display()))?
            .to_string_lossy()
            .into_owned();

        self.run(self.generate_command(root, &file_name)?)?;

        match self.platform.as_str() {
            "Windows" => self.build_windows(root, build_manifest, config),
            _ => self.build_unix(root, config),
        }
    }
}

fn unsupported(platform: &str) -> BruError {
    BruError::UnsupportedPlatform {
        platform: platform.to_string(),
        context: "the gyp driver (supported: Linux, Darwin, Windows)".to_string(),
    }
}

/// Pick the newest Visual Studio year among `VS<nn>COMNTOOLS` names.
pub fn msvs_year<I>(env_names: I) -> u32
where
    I: IntoIterator<Item = String>,
{
    let latest = env_names
        .into_iter()
        .filter_map(|name| {
            MSVS_TOOLS_VAR
                .captures(&name)
                .and_then(|caps| caps[1].parse::<u32>().ok())
        })
        .max();

    let Some(latest) = latest else {
        warn!(
            "no Visual Studio installation detected, assuming {}",
            DEFAULT_MSVS_YEAR
        );
        return DEFAULT_MSVS_YEAR;
    };

    match latest {
        80 => 2005,
        90 => 2008,
        100 => 2010,
        110 => 2012,
        120 => 2013,
        140 => 2015,
        other => {
            warn!(
                "cannot map VC{} to a Visual Studio release, assuming {}",
                other, DEFAULT_MSVS_YEAR
            );
            DEFAULT_MSVS_YEAR
        }
    }
}

fn locate_msbuild() -> Option<PathBuf> {
    if let Some(path) = find_executable("msbuild") {
        return Some(path);
    }

    let windir = std::env::var("SystemRoot")
        .or_else(|_| std::env::var("windir"))
        .ok()?;
    let pattern = format!(
        "{}/Microsoft.NET/Framework/**/msbuild.exe",
        glob::Pattern::escape(&windir)
    );
    glob::glob(&pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .max()
}
