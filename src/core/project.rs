//! `packages.toml` project manifest.
//!
//! ```toml
//! [project]
//! name = "my-app"
//! version = "0.1.0"
//! main = "init.lua"
//! lua_version = "5.4"
//!
//! [dependencies]
//! luasocket = "3.1.0"
//! lpeg = "latest"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::dependency::DependencySpec;
use crate::core::manifest::ManifestError;

/// Default file name of the project manifest.
pub const PROJECT_MANIFEST: &str = "packages.toml";

/// Metadata from the `[project]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub license: String,
    pub homepage: String,
    pub repository: String,
    pub main: String,
    pub lua_version: String,
}

/// A parsed `packages.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    #[serde(default)]
    pub project: ProjectMetadata,

    /// Package name to version request
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

impl ProjectManifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = ManifestError::read(path)?;
        let manifest: ProjectManifest =
            toml::from_str(&contents).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(
            "Loaded project '{}' with {} dependencies",
            manifest.project.name,
            manifest.dependencies.len()
        );

        Ok(manifest)
    }

    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let contents = toml::to_string_pretty(self).map_err(|source| ManifestError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        ManifestError::write(path, &contents)
    }

    /// Dependency specifiers in name order.
    pub fn dependency_specs(&self) -> Vec<DependencySpec> {
        self.dependencies
            .iter()
            .map(|(name, request)| DependencySpec::from_entry(name, request))
            .collect()
    }
}
