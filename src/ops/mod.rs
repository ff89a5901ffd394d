//! High-level operations.
//!
//! This module contains the implementation of bru commands.

pub mod bru_install;
pub mod bru_make;
pub mod tree;

pub use bru_install::{install, InstallOptions, InstallResult};
pub use bru_make::{make, MakeOptions};
pub use bru_test::{test, TestOptions, TestResult, TestRun, TestSummary};
pub use tree::{render_tree, resolve_project};
