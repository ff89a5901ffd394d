//! The user-level download cache.
//!
//! Archives fetched from `http`, `https` and `ftp` locators are stored once
//! per machine under `<home>/downloads/<module>/<version>/<file>` and shared
//! by every project.
//!
//! The cache is not locked. Two concurrent installs may both download the
//! same archive; each stages its own temporary file and the last rename
//! wins, so a reader never sees a partial archive.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use tracing::info;
use url::Url;

use crate::core::BruError;
use crate::sources::staging::{AcquisitionUnit, Outcome};
use crate::util::process::{tool, ProcessBuilder};
use crate::util::shell::{Shell, Status};

/// Fetches a URL into a local file.
pub trait Downloader {
    fn download(&self, url: &Url, dest: &Path) -> Result<()>;
}

/// `reqwest` for http(s), `curl` for ftp.
///
/// The HTTP client has no overall timeout; a stalled download is retried by
/// running the install again.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    shell: Shell,
}

impl HttpDownloader {
    pub fn new(shell: Shell) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .context("failed to build HTTP client")?;
        Ok(HttpDownloader { client, shell })
    }

    fn download_http(&self, url: &Url, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .with_context(|| format!("failed to download {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!(BruError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let progress = self
            .shell
            .bytes_progress(file_label(url), response.content_length());
        let mut reader = progress.wrap_read(response);
        let mut file =
            File::create(dest).with_context(|| format!("failed to create {}", dest.display()))?;
        io::copy(&mut reader, &mut file)
            .with_context(|| format!("failed to read response body from {}", url))?;
        progress.finish();
        Ok(())
    }

    fn download_ftp(&self, url: &Url, dest: &Path) -> Result<()> {
        ProcessBuilder::new(tool("curl"))
            .args(["--fail", "--silent", "--show-error", "--location", "--output"])
            .arg(dest)
            .arg(url.as_str())
            .status_checked()
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &Url, dest: &Path) -> Result<()> {
        info!("downloading {}", url);
        match url.scheme() {
            "ftp" => self.download_ftp(url, dest),
            _ => self.download_http(url, dest),
        }
    }
}

fn file_label(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut s| s.next_back())
        .unwrap_or(url.as_str())
        .to_string()
}

/// One cached archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArchive {
    pub module: String,
    pub version: String,
    pub file: String,
}

/// The shared download cache.
#[derive(Debug, Clone)]
pub struct DownloadCache {
    root: PathBuf,
}

impl DownloadCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DownloadCache { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<module>/<version>/<file>`
    pub fn path_for(&self, module: &str, version: &str, file: &str) -> PathBuf {
        self.root.join(module).join(version).join(file)
    }

    /// Return the cached archive for `url`, downloading it first if absent.
    pub fn fetch(
        &self,
        downloader: &dyn Downloader,
        shell: &Shell,
        module: &str,
        version: &str,
        url: &Url,
        file: &str,
    ) -> Result<PathBuf> {
        let unit = AcquisitionUnit::file(self.path_for(module, version, file));
        let outcome = unit.ensure(|staged| {
            shell.status(Status::Fetching, url);
            downloader.download(url, staged)
        })?;
        if outcome == Outcome::AlreadyDone {
            tracing::debug!("using cached {}", unit.path().display());
        }
        Ok(unit.path().to_path_buf())
    }

    /// Every cached archive, sorted by module, version and file.
    pub fn list(&self) -> Result<Vec<CachedArchive>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut archives = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(3)
            .max_depth(3)
            .sort_by_file_name()
        {
            let entry = entry
                .with_context(|| format!("failed to read cache: {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.file_name().to_string_lossy().into_owned();
            if file.starts_with(".bru-stage-") {
                continue;
            }
            let rel = entry.path().strip_prefix(&self.root)?;
            let mut parts = rel.components().map(|c| c.as_os_str().to_string_lossy());
            if let (Some(module), Some(version)) = (parts.next(), parts.next()) {
                archives.push(CachedArchive {
                    module: module.into_owned(),
                    version: version.into_owned(),
                    file,
                });
            }
        }
        Ok(archives)
    }
}
