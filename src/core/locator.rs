//! Source locators.
//!
//! A formula's `url` entries say where a module's source comes from. Each
//! entry is parsed once, at formula load time, into a [`SourceLocator`] so an
//! unsupported scheme is reported before anything is fetched.

use std::fmt;

use anyhow::Result;
use url::Url;

use crate::core::BruError;

/// Where one piece of a module's source comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// `http`, `https` or `ftp` archive, cached in the user-level download cache.
    Archive(Url),

    /// Archive shipped inside the catalog's module directory (`file:patch.tar.gz`).
    CatalogFile(String),

    /// `git+http(s)://...`; holds the URL without the `git+` prefix.
    Git(String),

    /// `svn+http(s)://...`; holds the URL without the `svn+` prefix.
    Svn(String),
}

impl SourceLocator {
    /// Parse a locator string from a formula.
    pub fn parse(locator: &str) -> Result<Self> {
        let unsupported = || BruError::UnsupportedScheme {
            locator: locator.to_string(),
        };

        if let Some(path) = locator
            .strip_prefix("file://")
            .or_else(|| locator.strip_prefix("file:"))
        {
            if path.is_empty() {
                return Err(unsupported().into());
            }
            return Ok(SourceLocator::CatalogFile(path.to_string()));
        }

        for (prefix, make) in [
            ("git+", SourceLocator::Git as fn(String) -> SourceLocator),
            ("svn+", SourceLocator::Svn),
        ] {
            if let Some(rest) = locator.strip_prefix(prefix) {
                let url = Url::parse(rest).map_err(|_| unsupported())?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(unsupported().into());
                }
                return Ok(make(rest.to_string()));
            }
        }

        let url = Url::parse(locator).map_err(|_| unsupported())?;
        match url.scheme() {
            "http" | "https" | "ftp" => Ok(SourceLocator::Archive(url)),
            _ => Err(unsupported().into()),
        }
    }

    /// File name an archive is stored under: the last non-empty path segment.
    pub fn file_name(&self) -> Option<String> {
        match self {
            SourceLocator::Archive(url) => url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string),
            SourceLocator::CatalogFile(path) => path
                .rsplit(['/', '\\'])
                .find(|s| !s.is_empty())
                .map(str::to_string),
            SourceLocator::Git(_) | SourceLocator::Svn(_) => None,
        }
    }

    /// Directory name a clone is checked out into: the last URL segment
    /// without a `.git` suffix.
    pub fn checkout_name(&self) -> Option<String> {
        match self {
            SourceLocator::Git(url) | SourceLocator::Svn(url) => {
                let trimmed = url.trim_end_matches('/');
                let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
                let name = last.strip_suffix(".git").unwrap_or(last);
                (!name.is_empty()).then(|| name.to_string())
            }
            _ => None,
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::Archive(url) => write!(f, "{}", url),
            SourceLocator::CatalogFile(path) => write!(f, "file:{}", path),
            SourceLocator::Git(url) => write!(f, "git+{}", url),
            SourceLocator::Svn(url) => write!(f, "svn+{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_archive() {
        let loc = SourceLocator::parse("http://zlib.net/zlib-1.2.8.tar.gz").unwrap();
        assert!(matches!(loc, SourceLocator::Archive(_)));
        assert_eq!(loc.file_name().as_deref(), Some("zlib-1.2.8.tar.gz"));

        let loc = SourceLocator::parse("ftp://ftp.example.org/pub/foo.zip").unwrap();
        assert_eq!(loc.file_name().as_deref(), Some("foo.zip"));
    }

    #[test]
    fn test_parse_catalog_file() {
        assert_eq!(
            SourceLocator::parse("file://patch.tar.gz").unwrap(),
            SourceLocator::CatalogFile("patch.tar.gz".into())
        );
        assert_eq!(
            SourceLocator::parse("file:1.3/patch.tar.gz").unwrap().file_name().as_deref(),
            Some("patch.tar.gz")
        );
    }

    #[test]
    fn test_parse_vcs() {
        let loc = SourceLocator::parse("git+https://github.com/google/googletest.git").unwrap();
        assert_eq!(
            loc,
            SourceLocator::Git("https://github.com/google/googletest.git".into())
        );
        assert_eq!(loc.checkout_name().as_deref(), Some("googletest"));

        let loc = SourceLocator::parse("svn+http://svn.example.org/repo/trunk/").unwrap();
        assert_eq!(loc.checkout_name().as_deref(), Some("trunk"));
    }

    #[test]
    fn test_unsupported_schemes() {
        for locator in ["s3://bucket/x.tar.gz", "git+ssh://host/repo.git", "file:", "nonsense"] {
            let err = SourceLocator::parse(locator).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<BruError>(),
                    Some(BruError::UnsupportedScheme { .. })
                ),
                "{} should be rejected",
                locator
            );
        }
    }

    #[test]
    fn test_display_round_trips_prefixes() {
        let loc = SourceLocator::parse("git+https://example.com/a.git").unwrap();
        assert_eq!(loc.to_string(), "git+https://example.com/a.git");
    }
}
