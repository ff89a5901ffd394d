//! Test utilities and mocks for bru unit tests.
//!
//! This module provides stand-ins for the two interfaces that would
//! otherwise need the network or a populated catalog: a [`Downloader`] that
//! serves bytes from memory and counts requests, and a [`FormulaSource`]
//! backed by a map.
//!
//! # Example
//!
//! ```rust,ignore
//! use bru::test_support::{CountingDownloader, tar_gz_bytes};
//!
//! let downloader = CountingDownloader::new()
//!     .serve("http://zlib.net/zlib-1.2.8.tar.gz", tar_gz_bytes(&[("zlib.h", "")]));
//! // ... acquire twice ...
//! assert_eq!(downloader.requests(), 1);
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use indexmap::IndexMap;
use url::Url;

use crate::core::{BruError, Formula, FormulaSource, SourceLocator};
use crate::sources::Downloader;

// Re-export fixtures for convenience
pub use fixtures::*;

/// Serves URLs from memory and records every request.
#[derive(Debug, Default)]
pub struct CountingDownloader {
    responses: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl CountingDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    pub fn serve(mut self, url: &str, body: Vec<u8>) -> Self {
        self.responses.insert(url.to_string(), body);
        self
    }

    /// Number of download requests made so far.
    pub fn requests(&self) -> usize {
        self.requests.borrow().len()
    }

    /// URLs requested, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Downloader for CountingDownloader {
    fn download(&self, url: &Url, dest: &Path) -> Result<()> {
        self.requests.borrow_mut().push(url.to_string());
        match self.responses.get(url.as_str()) {
            Some(body) => {
                std::fs::write(dest, body)?;
                Ok(())
            }
            None => bail!(BruError::DownloadFailed {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// In-memory formulas keyed by module and version.
#[derive(Debug, Default)]
pub struct MemoryFormulas {
    formulas: HashMap<(String, String), Formula>,
    loads: RefCell<HashMap<(String, String), usize>>,
}

impl MemoryFormulas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `module@version` depending on `deps`.
    pub fn with(mut self, module: &str, version: &str, deps: &[(&str, &str)]) -> Self {
        let formula = Formula {
            module: module.to_string(),
            version: version.to_string(),
            locators: vec![SourceLocator::CatalogFile(format!("{}.tar.gz", module))],
            dependencies: deps
                .iter()
                .map(|(m, v)| (m.to_string(), v.to_string()))
                .collect::<IndexMap<_, _>>(),
            make_command: IndexMap::new(),
        };
        self.formulas
            .insert((module.to_string(), version.to_string()), formula);
        self
    }

    /// How many times `module@version` was loaded.
    pub fn loads(&self, module: &str, version: &str) -> usize {
        self.loads
            .borrow()
            .get(&(module.to_string(), version.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

impl FormulaSource for MemoryFormulas {
    fn load_formula(&self, module: &str, version: &str) -> Result<Formula> {
        let key = (module.to_string(), version.to_string());
        *self.loads.borrow_mut().entry(key.clone()).or_default() += 1;

        if let Some(formula) = self.formulas.get(&key) {
            return Ok(formula.clone());
        }
        if self.formulas.keys().any(|(m, _)| m == module) {
            bail!(BruError::VersionNotFound {
                module: module.to_string(),
                version: version.to_string(),
                catalog: PathBuf::from("<memory>"),
            });
        }
        bail!(BruError::ModuleNotFound {
            module: module.to_string(),
            catalog: PathBuf::from("<memory>"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_counting_downloader() {
        let tmp = TempDir::new().unwrap();
        let downloader = CountingDownloader::new().serve("http://example.com/a.tgz", b"abc".to_vec());
        let dest = tmp.path().join("a.tgz");

        downloader
            .download(&Url::parse("http://example.com/a.tgz").unwrap(), &dest)
            .unwrap();
        assert!(downloader
            .download(&Url::parse("http://example.com/b.tgz").unwrap(), &dest)
            .is_err());

        assert_eq!(std::fs::read(&dest).unwrap(), b"abc");
        assert_eq!(downloader.requests(), 2);
        assert_eq!(downloader.requested_urls()[1], "http://example.com/b.tgz");
    }

    #[test]
    fn test_memory_formulas() {
        let source = MemoryFormulas::new().with("a", "1.0", &[("b", "2.0")]);

        let formula = source.load_formula("a", "1.0").unwrap();
        assert_eq!(formula.dependencies["b"], "2.0");
        assert_eq!(source.loads("a", "1.0"), 1);

        assert!(source.load_formula("a", "9.9").is_err());
        assert!(source.load_formula("zz", "1.0").is_err());
    }

    #[test]
    fn test_catalog_fixture_formula() {
        let fixture = CatalogFixture::new();
        let path = fixture.formula("zlib", "1.2.8", r#""url": "http://zlib.net/z.tar.gz""#);

        let formula = Formula::load(&path).unwrap();
        assert_eq!(formula.module, "zlib");
    }
}
