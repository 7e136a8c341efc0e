//! lpm - A package manager for Lua modules
//!
//! This crate provides the core library functionality for lpm: version
//! selection, dependency resolution against cached repository indexes,
//! artifact download, archive installation, and the installed-package
//! ledger.

pub mod core;
pub mod ledger;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for lpm unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock HTTP client and archive and index
/// builders.
#[cfg(test)]
pub mod test_support;

pub use core::{
    dependency::DependencySpec, manifest::RepositoryManifest, package::ArchiveKind,
    package::ResolvedPackage, repository::RepositoryDescriptor,
};

pub use ledger::Ledger;
pub use resolver::{find_dependency, try_find_dependency};
pub use util::context::GlobalContext;
