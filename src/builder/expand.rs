//! Source-list expansion.
//!
//! gyp accepts wildcard entries in `sources` without complaint but compiles
//! nothing for them, so every pattern is expanded into concrete paths before
//! a manifest lands in the working tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glob::{MatchOptions, Pattern};

use crate::core::BruError;
use crate::util::fs::{relative_path, to_slash};

/// Prefix marking a recursive (`**`) pattern.
pub const RECURSIVE_PREFIX: &str = "ant:";

const WILDCARDS: [char; 3] = ['*', '?', '['];

/// The glob to expand for `entry`, or `None` if the entry is a plain path.
pub fn pattern_of(entry: &str) -> Option<&str> {
    if let Some(rest) = entry.strip_prefix(RECURSIVE_PREFIX) {
        return Some(rest);
    }
    entry.contains(WILDCARDS).then_some(entry)
}

/// True if `entry` still contains anything the expander would act on.
pub fn is_pattern(entry: &str) -> bool {
    pattern_of(entry).is_some()
}

/// Expand `entries` against `base` into a sorted, de-duplicated list.
///
/// Matches are rendered relative to `base` with `/` separators. Plain
/// entries pass through unchanged. A pattern matching no file fails with
/// [`BruError::EmptyExpansion`].
pub fn expand_sources(module: &str, base: &Path, entries: &[String]) -> Result<Vec<String>> {
    let mut expanded = BTreeSet::new();

    for entry in entries {
        let Some(pattern) = pattern_of(entry) else {
            expanded.insert(entry.clone());
            continue;
        };

        let matches = glob_files(base, pattern)?;
        if matches.is_empty() {
            bail!(BruError::EmptyExpansion {
                pattern: entry.clone(),
                module: module.to_string(),
            });
        }

        expanded.extend(
            matches
                .iter()
                .map(|path| to_slash(&relative_path(base, path))),
        );
    }

    Ok(expanded.into_iter().collect())
}

fn glob_files(base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = format!(
        "{}/{}",
        Pattern::escape(&base.to_string_lossy()),
        pattern.trim_start_matches("./")
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut files = Vec::new();
    for entry in glob::glob_with(&full, options)
        .with_context(|| format!("invalid source pattern `{}`", pattern))?
    {
        let path = entry.with_context(|| format!("failed to expand `{}`", pattern))?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for file in files {
            let path = tmp.path().join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, "").unwrap();
        }
        tmp
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pattern_detection() {
        assert_eq!(pattern_of("1.2.8/*.c"), Some("1.2.8/*.c"));
        assert_eq!(pattern_of("src/file?.c"), Some("src/file?.c"));
        assert_eq!(pattern_of("src/[ab].c"), Some("src/[ab].c"));
        assert_eq!(pattern_of("ant:src/**/*.cc"), Some("src/**/*.cc"));
        assert_eq!(pattern_of("1.2.8/zlib.h"), None);
    }

    #[test]
    fn test_expand_wildcards_sorted() {
        let tmp = tree(&["1.2.8/inflate.c", "1.2.8/adler32.c", "1.2.8/zlib.h"]);

        let sources = expand_sources("zlib", tmp.path(), &strings(&["1.2.8/*.c"])).unwrap();
        assert_eq!(sources, vec!["1.2.8/adler32.c", "1.2.8/inflate.c"]);
    }

    #[test]
    fn test_plain_entries_pass_through() {
        let tmp = tree(&["src/a.c"]);

        let sources = expand_sources(
            "m",
            tmp.path(),
            &strings(&["src/generated.c", "src/*.c", "src/a.c"]),
        )
        .unwrap();
        assert_eq!(sources, vec!["src/a.c", "src/generated.c"]);
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let tmp = tree(&["src/a.c", "src/sub/b.c"]);

        let sources = expand_sources("m", tmp.path(), &strings(&["src/*.c"])).unwrap();
        assert_eq!(sources, vec!["src/a.c"]);
    }

    #[test]
    fn test_recursive_marker() {
        let tmp = tree(&["src/a.cc", "src/sub/deep/b.cc", "src/sub/c.h"]);

        let sources = expand_sources("m", tmp.path(), &strings(&["ant:src/**/*.cc"])).unwrap();
        assert_eq!(sources, vec!["src/a.cc", "src/sub/deep/b.cc"]);
        assert!(sources.iter().all(|s| !is_pattern(s)));
    }

    #[test]
    fn test_hidden_files_are_skipped() {
        let tmp = tree(&[
            "1.2.8/adler32.c",
            "1.2.8/.bru-stage-a1b2.c",
            "1.2.8/.tmpXYZ.c",
            "src/.hidden/b.c",
            "src/c.c",
        ]);

        let sources = expand_sources("zlib", tmp.path(), &strings(&["1.2.8/*.c"])).unwrap();
        assert_eq!(sources, vec!["1.2.8/adler32.c"]);

        let sources = expand_sources("zlib", tmp.path(), &strings(&["ant:src/**/*.c"])).unwrap();
        assert_eq!(sources, vec!["src/c.c"]);
    }

    #[test]
    fn test_directories_are_not_sources() {
        let tmp = tree(&["src/x.d/file.c"]);

        let err = expand_sources("m", tmp.path(), &strings(&["src/*.d"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BruError>(),
            Some(BruError::EmptyExpansion { .. })
        ));
    }

    #[test]
    fn test_empty_expansion_is_an_error() {
        let tmp = tree(&["src/a.c"]);

        let err = expand_sources("zlib", tmp.path(), &strings(&["src/*.cpp"])).unwrap_err();
        match err.downcast_ref::<BruError>() {
            Some(BruError::EmptyExpansion { pattern, module }) => {
                assert_eq!(pattern, "src/*.cpp");
                assert_eq!(module, "zlib");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
