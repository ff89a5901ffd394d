//! bru - an npm-like dependency manager for gyp-built native modules
//!
//! This crate provides the core library functionality for bru: resolving a
//! project's dependencies against a catalog of formulas, acquiring module
//! sources into `bru_modules/`, rewriting per-module gyp manifests, and
//! running the modules' tests.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for bru unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an on-disk catalog fixture, archive builders,
/// an in-memory formula source and a request-counting downloader.
#[cfg(test)]
pub mod test_support;

pub use core::{
    BruError, BuildManifest, Catalog, Formula, Installable, ProjectManifest, SourceLocator,
    Workspace,
};

pub use resolver::{Resolution, Resolver};
pub use util::context::GlobalContext;
