//! Error taxonomy for bru operations.
//!
//! Every fatal condition the resolver, acquirer, rewriter and test runner can
//! hit is a variant of [`BruError`]. Operations return `anyhow::Result` and
//! raise these with `bail!`, so callers can still `downcast_ref::<BruError>()`
//! to inspect the kind.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by the core of bru.
#[derive(Debug, Error, Diagnostic)]
pub enum BruError {
    #[error("no module `{module}` in catalog {}", catalog.display())]
    #[diagnostic(
        code(bru::catalog::module_not_found),
        help("refresh the local catalog (e.g. `git pull`) if this module was added very recently")
    )]
    ModuleNotFound { module: String, catalog: PathBuf },

    #[error("no version `{version}` of module `{module}` in catalog {}", catalog.display())]
    #[diagnostic(
        code(bru::catalog::version_not_found),
        help("refresh the local catalog (e.g. `git pull`) if this version was added very recently")
    )]
    VersionNotFound {
        module: String,
        version: String,
        catalog: PathBuf,
    },

    #[error("invalid manifest {}: {reason}", path.display())]
    #[diagnostic(code(bru::catalog::invalid_manifest))]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("malformed cross-module reference `{reference}`: {reason}")]
    #[diagnostic(
        code(bru::catalog::malformed_reference),
        help("cross-module references have the form ../<module>/<module>.gyp:<target>")
    )]
    MalformedReference { reference: String, reason: String },

    #[error("no *.bru file in {}", dir.display())]
    #[diagnostic(
        code(bru::project::no_manifest),
        help("run `bru install <module>` to create one")
    )]
    NoProjectManifest { dir: PathBuf },

    #[error("there are multiple *.bru files in {}: {}", dir.display(), found.join(", "))]
    #[diagnostic(code(bru::project::ambiguous_manifest))]
    AmbiguousProjectManifest { dir: PathBuf, found: Vec<String> },

    #[error("module `{module}` has no build manifest in {}", modules_dir.display())]
    #[diagnostic(
        code(bru::project::module_not_installed),
        help("run `bru install` first")
    )]
    ModuleNotInstalled { module: String, modules_dir: PathBuf },

    #[error("module `{referenced}` listed in {module}/{version}.gyp's target `{target}` not found")]
    #[diagnostic(
        code(bru::rewrite::unresolved_reference),
        help("add `{referenced}` to {module}/{version}.bru:dependencies")
    )]
    UnresolvedReference {
        referenced: String,
        module: String,
        version: String,
        target: String,
    },

    #[error("unsupported scheme in source locator `{locator}`")]
    #[diagnostic(
        code(bru::acquire::unsupported_scheme),
        help("supported schemes are http, https, ftp, file, git+http(s) and svn+http(s)")
    )]
    UnsupportedScheme { locator: String },

    #[error("no entry for platform `{platform}` in {context}")]
    #[diagnostic(code(bru::acquire::unsupported_platform))]
    UnsupportedPlatform { platform: String, context: String },

    #[error("unrecognized archive format: {}", path.display())]
    #[diagnostic(
        code(bru::acquire::unsupported_archive),
        help("supported archives are .tar.gz, .tar and .zip")
    )]
    UnsupportedArchive { path: PathBuf },

    #[error("failed to download {url}: HTTP {status}")]
    #[diagnostic(code(bru::acquire::download_failed))]
    DownloadFailed { url: String, status: u16 },

    #[error("`{command}` failed with {}", exit_code_label(.code))]
    #[diagnostic(code(bru::acquire::command_failed))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("no matches for glob `{pattern}` in module `{module}`")]
    #[diagnostic(
        code(bru::rewrite::empty_expansion),
        help("fix the source pattern in the module's build manifest template")
    )]
    EmptyExpansion { pattern: String, module: String },

    #[error("{failed} tests failed and {not_run} tests failed building")]
    #[diagnostic(code(bru::test::failed))]
    TestsFailed { failed: usize, not_run: usize },
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
