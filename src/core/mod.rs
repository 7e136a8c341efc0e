//! Core data structures for lpm.
//!
//! - Dependency specifiers and version requests
//! - Repository descriptors and their cached manifests
//! - Resolved packages and archive kinds
//! - The `packages.toml` project manifest

pub mod dependency;
pub mod manifest;
pub mod package;
pub mod project;
pub mod repository;

pub use dependency::{validate_name, DependencySpec, InvalidName, VersionRequest};
pub use manifest::{ManifestError, ManifestPackage, RepositoryManifest};
pub use package::{ArchiveKind, ResolvedPackage};
pub use project::{ProjectManifest, PROJECT_MANIFEST};
pub use repository::RepositoryDescriptor;
