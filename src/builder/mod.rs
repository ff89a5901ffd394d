//! gyp build manifests in the working tree.
//!
//! This module rewrites catalog templates into concrete per-module manifests
//! and drives gyp plus the native toolchain over the project manifest.

pub mod expand;
pub mod gyp;
pub mod rewrite;

pub use expand::expand_sources;
pub use gyp::{BuildDriver, GypMake};
pub use rewrite::{ensure_common_settings, rewrite_manifest, ManifestRewriter};
