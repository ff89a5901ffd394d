//! JSON with `#` line comments.
//!
//! Formulas, project manifests and gyp build manifests are JSON documents in
//! which any line whose first non-blank character is `#` is a comment.
//! Comments are dropped on load and are not written back on save.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::util::fs;

/// Remove `#` comment lines from a document.
pub fn strip_comments(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a commented JSON document from a string.
pub fn from_str<T: DeserializeOwned>(text: &str) -> serde_json::Result<T> {
    serde_json::from_str(&strip_comments(text))
}

/// Load and deserialize a commented JSON file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Serialize with four-space indentation and a trailing newline.
pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut ser)
        .context("failed to serialize JSON document")?;
    let mut text = String::from_utf8(buf).context("serialized JSON is not UTF-8")?;
    text.push('\n');
    Ok(text)
}

/// Serialize and write a JSON file, creating parent directories.
pub fn save<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    fs::write_string(path, &to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    #[test]
    fn test_comment_lines_are_dropped() {
        let text = r#"
# top comment
{
    # the module name
    "module": "zlib",
      #indented comment
    "version": "1.2.8"
}
"#;
        let value: Value = from_str(text).unwrap();
        assert_eq!(value["module"], "zlib");
        assert_eq!(value["version"], "1.2.8");
    }

    #[test]
    fn test_hash_inside_string_is_kept() {
        let value: Value = from_str(r#"{"url": "http://example.com/a#b"}"#).unwrap();
        assert_eq!(value["url"], "http://example.com/a#b");
    }

    #[test]
    fn test_save_uses_four_space_indent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("doc.json");

        save(&path, &serde_json::json!({"version": "1.2.8"})).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n    \"version\": \"1.2.8\"\n}\n");
    }
}
