//! Command implementations

pub mod cache;
pub mod completions;
pub mod install;
pub mod make;
pub mod tree;
