//! Core data structures for bru.
//!
//! This module contains the foundational types used throughout bru:
//! - Catalog formulas and their source locators
//! - gyp build manifests and cross-module references
//! - The project manifest and its working tree
//! - The error taxonomy

pub mod build_manifest;
pub mod catalog;
pub mod error;
pub mod formula;
pub mod installable;
pub mod locator;
pub mod project;
pub mod reference;
pub mod workspace;

pub use build_manifest::{BuildManifest, BuildTarget, TargetKind, TestSpec};
pub use catalog::{Catalog, FormulaSource};
pub use error::BruError;
pub use formula::Formula;
pub use installable::Installable;
pub use locator::SourceLocator;
pub use project::ProjectManifest;
pub use reference::DependencyRef;
pub use workspace::Workspace;
