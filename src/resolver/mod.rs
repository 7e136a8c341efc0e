//! Dependency resolution.
//!
//! Resolution works on one dependency at a time against flat repository
//! indexes. Repositories are searched in the order given and the first
//! one that defines the package with a matching version wins; there is no
//! merging across repositories and no transitive solving.
//!
//! Every repository must have a cached index. A missing cache anywhere in
//! the list fails the whole resolution, even if a later repository would
//! have matched.

pub mod errors;
pub mod version;

use crate::core::dependency::DependencySpec;
use crate::core::manifest::RepositoryManifest;
use crate::core::package::ResolvedPackage;
use crate::core::repository::RepositoryDescriptor;
use crate::util::env::EnvLookup;

pub use errors::ResolveError;
pub use version::{compare_versions, select_version};

/// Resolve `dep` against `repositories`, returning why it failed.
pub fn try_find_dependency(
    dep: &DependencySpec,
    repositories: &[RepositoryDescriptor],
    env: &dyn EnvLookup,
) -> Result<ResolvedPackage, ResolveError> {
    let mut searched = Vec::new();

    for repository in repositories {
        let cache_path = match repository.cache_path(env) {
            Some(path) if path.exists() => path,
            other => {
                return Err(ResolveError::MissingCache {
                    repository: repository.name.clone(),
                    path: other.map(|p| p.display().to_string()),
                });
            }
        };

        tracing::debug!("Loading manifest from: {}", cache_path.display());

        let manifest =
            RepositoryManifest::load(&cache_path).map_err(|source| ResolveError::ManifestLoad {
                repository: repository.name.clone(),
                source,
            })?;
        searched.push(repository.name.clone());

        let Some(package) = manifest.package(dep.name()) else {
            continue;
        };

        tracing::debug!(
            "Package {} is defined in repository {}",
            dep.name(),
            repository.name
        );

        let Some((version, artifact_url)) = select_version(dep.version(), &package.versions)
        else {
            tracing::debug!(
                "Repository {} has no version {} of {}",
                repository.name,
                dep.version(),
                dep.name()
            );
            continue;
        };

        if dep.version().is_latest() {
            tracing::debug!("Latest version of {}: {}", dep.name(), version);
        }

        return Ok(ResolvedPackage {
            name: package.name.clone(),
            version: version.to_string(),
            manifest_url: repository.url.clone(),
            artifact_url: artifact_url.to_string(),
            package_type: package.package_type.clone(),
            repository_id: repository.id,
        });
    }

    Err(ResolveError::PackageNotFound {
        package: dep.name().to_string(),
        requirement: dep.version().to_string(),
        searched,
    })
}

/// Resolve `dep` against `repositories`.
///
/// Returns `None` when the dependency cannot be resolved; the reason is
/// logged. Use [`try_find_dependency`] to inspect it.
pub fn find_dependency(
    dep: &DependencySpec,
    repositories: &[RepositoryDescriptor],
    env: &dyn EnvLookup,
) -> Option<ResolvedPackage> {
    match try_find_dependency(dep, repositories, env) {
        Ok(package) => Some(package),
        Err(err @ ResolveError::PackageNotFound { .. }) => {
            tracing::debug!("{}", err);
            None
        }
        Err(err) => {
            tracing::error!("{}", err);
            None
        }
    }
}
