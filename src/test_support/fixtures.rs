//! Test fixtures for common test scenarios.
//!
//! This module provides an on-disk catalog builder and in-memory archive
//! generators for tests that exercise resolution, acquisition and rewriting.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use crate::core::Catalog;

/// A temporary catalog directory.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    /// Create an empty catalog.
    pub fn new() -> Self {
        CatalogFixture {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.dir.path())
    }

    /// Write a file relative to the catalog root.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        self.archive(rel, contents.as_bytes())
    }

    /// Write raw bytes relative to the catalog root.
    pub fn archive(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("fixture path has a parent"))
            .expect("failed to create fixture dir");
        std::fs::write(&path, bytes).expect("failed to write fixture file");
        path
    }

    /// Write `<module>/<version>.bru`; `fields` are extra JSON members such
    /// as `"url": "..."`.
    pub fn formula(&self, module: &str, version: &str, fields: &str) -> PathBuf {
        let mut body = format!(
            "{{\n    \"module\": \"{}\",\n    \"version\": \"{}\"",
            module, version
        );
        if !fields.trim().is_empty() {
            body.push_str(",\n    ");
            body.push_str(fields);
        }
        body.push_str("\n}\n");
        self.write(&format!("{}/{}.bru", module, version), &body)
    }

    /// Write `<module>/<version>.gyp`.
    pub fn build_manifest(&self, module: &str, version: &str, gyp: &str) -> PathBuf {
        self.write(&format!("{}/{}.gyp", module, version), gyp)
    }
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// An uncompressed tar archive holding `files`.
pub fn tar_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, path, contents.as_bytes())
            .expect("failed to append tar entry");
    }
    builder.into_inner().expect("failed to finish tar")
}

/// A gzip-compressed tar archive holding `files`.
pub fn tar_gz_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&tar_bytes(files))
        .expect("failed to compress tar");
    encoder.finish().expect("failed to finish gzip")
}

/// A zip archive holding `files`.
pub fn zip_bytes(files: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::<()>::default();
    for (path, contents) in files {
        writer
            .start_file(*path, options)
            .expect("failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("failed to write zip entry");
    }
    writer
        .finish()
        .expect("failed to finish zip")
        .into_inner()
}
