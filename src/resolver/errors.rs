//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::manifest::ManifestError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Why a dependency could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no cache path found for repository `{repository}`")]
    MissingCache {
        repository: String,
        path: Option<String>,
    },

    #[error("failed to load manifest for repository `{repository}`")]
    ManifestLoad {
        repository: String,
        #[source]
        source: ManifestError,
    },

    #[error("package not found: `{package}` (version `{requirement}`)")]
    PackageNotFound {
        package: String,
        requirement: String,
        searched: Vec<String>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::MissingCache { repository, path } => {
                let mut diag = Diagnostic::error(format!(
                    "no cache path found for repository `{}`",
                    repository
                ));

                if let Some(path) = path {
                    diag = diag.with_context(format!("expected cached index at {}", path));
                }

                diag.with_suggestion(
                    "Make sure all repositories are cached before browsing them",
                )
                .with_suggestion(suggestions::UPDATE_CACHES)
            }

            ResolveError::ManifestLoad { repository, source } => Diagnostic::error(format!(
                "failed to load manifest for repository `{}`",
                repository
            ))
            .with_context(source.to_string())
            .with_suggestion(suggestions::UPDATE_CACHES),

            ResolveError::PackageNotFound {
                package,
                requirement,
                searched,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "could not find `{}` version `{}`",
                    package, requirement
                ));

                if !searched.is_empty() {
                    diag = diag.with_context(format!("searched: {}", searched.join(", ")));
                }

                diag.with_suggestion("Check that the package name is spelled correctly")
                    .with_suggestion(suggestions::UPDATE_CACHES)
            }
        }
    }
}
