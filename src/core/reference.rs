//! Build-target dependency references.
//!
//! An entry in a gyp target's `dependencies` either names a target in the
//! same file (`zlib`) or a target in a sibling module's manifest
//! (`../boost-regex/boost-regex.gyp:boost-regex`).

use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::core::BruError;

static CROSS_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\.\./([^/]+)/([^/]+)\.gyp:(.+)$").expect("cross-module reference regex")
});

/// A parsed dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRef {
    /// A target in the same manifest, or any other entry passed through as-is.
    Local(String),
    /// A target in another module's manifest.
    CrossModule { module: String, target: String },
}

impl DependencyRef {
    /// Parse a dependency entry.
    ///
    /// Entries starting with `../` must follow
    /// `../<module>/<module>.gyp:<target>`.
    pub fn parse(entry: &str) -> Result<Self> {
        if !entry.starts_with("../") {
            return Ok(DependencyRef::Local(entry.to_string()));
        }

        let malformed = |reason: &str| BruError::MalformedReference {
            reference: entry.to_string(),
            reason: reason.to_string(),
        };

        let caps = CROSS_MODULE
            .captures(entry)
            .ok_or_else(|| malformed("expected ../<module>/<module>.gyp:<target>"))?;

        let module = &caps[1];
        let file_stem = &caps[2];
        if module != file_stem {
            return Err(malformed(&format!(
                "gyp file `{}.gyp` does not match module directory `{}`",
                file_stem, module
            ))
            .into());
        }

        Ok(DependencyRef::CrossModule {
            module: module.to_string(),
            target: caps[3].to_string(),
        })
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyRef::Local(name) => f.write_str(name),
            DependencyRef::CrossModule { module, target } => {
                write!(f, "../{}/{}.gyp:{}", module, module, target)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_reference() {
        assert_eq!(
            DependencyRef::parse("zlib").unwrap(),
            DependencyRef::Local("zlib".into())
        );
        assert_eq!(
            DependencyRef::parse("bru_modules/zlib/zlib.gyp:*").unwrap(),
            DependencyRef::Local("bru_modules/zlib/zlib.gyp:*".into())
        );
    }

    #[test]
    fn test_cross_module_reference() {
        let dep = DependencyRef::parse("../boost-regex/boost-regex.gyp:boost-regex").unwrap();
        assert_eq!(
            dep,
            DependencyRef::CrossModule {
                module: "boost-regex".into(),
                target: "boost-regex".into(),
            }
        );
        assert_eq!(dep.to_string(), "../boost-regex/boost-regex.gyp:boost-regex");
    }

    #[test]
    fn test_malformed_references() {
        for entry in [
            "../zlib",
            "../zlib/zlib.gyp",
            "../zlib/zlib.gyp:",
            "../zlib/other.gyp:zlib",
            "../a/b/c.gyp:x",
        ] {
            let err = DependencyRef::parse(entry).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<BruError>(),
                    Some(BruError::MalformedReference { .. })
                ),
                "{} should be malformed",
                entry
            );
        }
    }
}
