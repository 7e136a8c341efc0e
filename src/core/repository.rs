//! Repository descriptors.

use std::path::PathBuf;

use crate::util::env::{fill_env_vars, EnvLookup};

/// A package repository: a remote index plus its locally cached copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    /// Stable numeric identity, recorded in ledger rows
    pub id: i64,

    /// Human-readable name (e.g., "main")
    pub name: String,

    /// URL of the remote index
    pub url: String,

    /// Path of the cached index. May contain `${VAR}` placeholders and
    /// is empty until the repository has been downloaded once.
    pub cache: String,
}

impl RepositoryDescriptor {
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        RepositoryDescriptor {
            id,
            name: name.into(),
            url: url.into(),
            cache: String::new(),
        }
    }

    pub fn with_cache(mut self, cache: impl Into<String>) -> Self {
        self.cache = cache.into();
        self
    }

    /// The cache path with placeholders substituted, or `None` if no
    /// cache has been recorded.
    pub fn cache_path(&self, env: &dyn EnvLookup) -> Option<PathBuf> {
        let filled = fill_env_vars(&self.cache, env, true);
        if filled.is_empty() {
            None
        } else {
            Some(PathBuf::from(filled))
        }
    }
}
