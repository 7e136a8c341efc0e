//! Repository manifest parsing and schema.
//!
//! A repository manifest is the index a repository publishes and lpm
//! caches locally:
//!
//! ```toml
//! [repository]
//! name = "main"
//! summary = "The main Lua package index"
//!
//! [packages.luasocket]
//! summary = "Network support for Lua"
//! package_type = "zip"
//!
//! [packages.luasocket.versions]
//! "3.0.0" = "https://example.org/luasocket-3.0.0.zip"
//! "3.1.0" = "https://example.org/luasocket-3.1.0.zip"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error reading or writing a TOML manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize manifest {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
}

impl ManifestError {
    pub(crate) fn read(path: &Path) -> Result<String, ManifestError> {
        std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }

    pub(crate) fn write(path: &Path, contents: &str) -> Result<(), ManifestError> {
        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        std::fs::write(path, contents).map_err(io_err)
    }
}

/// One package entry in a repository manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestPackage {
    pub name: String,
    pub summary: String,
    pub package_type: String,

    /// Version string to artifact URL
    pub versions: BTreeMap<String, String>,
}

/// A parsed repository index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryManifest {
    pub name: String,
    pub summary: String,
    pub packages: BTreeMap<String, ManifestPackage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawManifest {
    #[serde(default)]
    repository: RawRepository,
    #[serde(default)]
    packages: BTreeMap<String, RawPackage>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawRepository {
    #[serde(default)]
    name: String,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawPackage {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    package_type: String,
    #[serde(default)]
    versions: BTreeMap<String, String>,
}

impl RepositoryManifest {
    /// Load a manifest from a cached index file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = ManifestError::read(path)?;
        let manifest = Self::parse_str(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            "Loaded repository manifest '{}' from {} ({} packages)",
            manifest.name,
            path.display(),
            manifest.packages.len()
        );

        Ok(manifest)
    }

    /// Parse a manifest from TOML text.
    pub fn parse_str(contents: &str) -> Result<Self, toml::de::Error> {
        let raw: RawManifest = toml::from_str(contents)?;

        let packages = raw
            .packages
            .into_iter()
            .map(|(name, pkg)| {
                let package = ManifestPackage {
                    name: name.clone(),
                    summary: pkg.summary,
                    package_type: pkg.package_type,
                    versions: pkg.versions,
                };
                (name, package)
            })
            .collect();

        Ok(RepositoryManifest {
            name: raw.repository.name,
            summary: raw.repository.summary,
            packages,
        })
    }

    /// Write the manifest back to disk.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let raw = RawManifest {
            repository: RawRepository {
                name: self.name.clone(),
                summary: self.summary.clone(),
            },
            packages: self
                .packages
                .iter()
                .map(|(name, pkg)| {
                    let raw = RawPackage {
                        summary: pkg.summary.clone(),
                        package_type: pkg.package_type.clone(),
                        versions: pkg.versions.clone(),
                    };
                    (name.clone(), raw)
                })
                .collect(),
        };

        let contents = toml::to_string_pretty(&raw).map_err(|source| ManifestError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        ManifestError::write(path, &contents)
    }

    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&ManifestPackage> {
        self.packages.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
[repository]
name = "main"
summary = "Main index"

[packages.luasocket]
summary = "Network support for Lua"
package_type = "zip"

[packages.luasocket.versions]
"3.0.0" = "https://example.org/luasocket-3.0.0.zip"
"3.1.0" = "https://example.org/luasocket-3.1.0.zip"

[packages.empty]
summary = "Nothing published yet"
package_type = "zip"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = RepositoryManifest::parse_str(MANIFEST).unwrap();
        assert_eq!(manifest.name, "main");
        assert_eq!(manifest.packages.len(), 2);

        let socket = manifest.package("luasocket").unwrap();
        assert_eq!(socket.name, "luasocket");
        assert_eq!(socket.package_type, "zip");
        assert_eq!(
            socket.versions.get("3.1.0").map(String::as_str),
            Some("https://example.org/luasocket-3.1.0.zip")
        );

        assert!(manifest.package("empty").unwrap().versions.is_empty());
        assert!(manifest.package("lpeg").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = RepositoryManifest::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
    }

    #[test]
    fn test_load_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[packages.x\nbroken").unwrap();

        let err = RepositoryManifest::load(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache/main.toml");

        let manifest = RepositoryManifest::parse_str(MANIFEST).unwrap();
        manifest.save(&path).unwrap();

        assert_eq!(RepositoryManifest::load(&path).unwrap(), manifest);
    }
}
