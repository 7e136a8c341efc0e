//! Test fixtures for common test scenarios.
//!
//! Repository indexes and configurations shaped like the ones lpm reads
//! in production.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use crate::util::config::{Config, LpmSection, SourceEntry, SQLITE_BACKEND};

/// A package entry for a generated repository index.
#[derive(Debug, Clone)]
pub struct RepoPackage {
    pub name: String,
    pub package_type: String,
    /// (version, artifact URL) pairs
    pub versions: Vec<(String, String)>,
}

impl RepoPackage {
    /// A zip package whose artifacts live at `https://example.org/<name>-<version>.zip`.
    pub fn zip(name: &str, versions: &[&str]) -> Self {
        Self::with_type(name, "zip", versions)
    }

    /// A tarball package whose artifacts live at `https://example.org/<name>-<version>.tar.gz`.
    pub fn tar_gz(name: &str, versions: &[&str]) -> Self {
        Self::with_type(name, "tar.gz", versions)
    }

    pub fn with_type(name: &str, package_type: &str, versions: &[&str]) -> Self {
        let ext = if package_type == "zip" { "zip" } else { "tar.gz" };
        RepoPackage {
            name: name.to_string(),
            package_type: package_type.to_string(),
            versions: versions
                .iter()
                .map(|v| {
                    (
                        v.to_string(),
                        format!("https://example.org/{}-{}.{}", name, v, ext),
                    )
                })
                .collect(),
        }
    }
}

/// Render a repository index as TOML.
pub fn repository_manifest_toml(name: &str, packages: &[RepoPackage]) -> String {
    let mut out = String::new();
    writeln!(out, "[repository]").unwrap();
    writeln!(out, "name = \"{}\"", name).unwrap();
    writeln!(out, "summary = \"Test repository {}\"", name).unwrap();

    for package in packages {
        writeln!(out).unwrap();
        writeln!(out, "[packages.{}]", package.name).unwrap();
        writeln!(out, "summary = \"{} for tests\"", package.name).unwrap();
        writeln!(out, "package_type = \"{}\"", package.package_type).unwrap();
        writeln!(out).unwrap();
        writeln!(out, "[packages.{}.versions]", package.name).unwrap();
        for (version, url) in &package.versions {
            writeln!(out, "\"{}\" = \"{}\"", version, url).unwrap();
        }
    }

    out
}

/// Write a repository index to `path`, creating parent directories.
pub fn write_repository_manifest(path: &Path, name: &str, packages: &[RepoPackage]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, repository_manifest_toml(name, packages)).unwrap();
}

/// A valid configuration rooted at `root`.
///
/// Sources are given as (name, url) and get priorities in list order.
pub fn test_config(root: &str, sources: &[(&str, &str)]) -> Config {
    let lpm = LpmSection {
        db_backend: Some(SQLITE_BACKEND.to_string()),
        packages_db: Some(format!("{}/packages.db", root)),
        repositories_cache: Some(format!("{}/cache/repositories", root)),
        packages_cache: Some(format!("{}/cache/packages", root)),
        modules_path: Some(format!("{}/modules", root)),
    };

    let luas = BTreeMap::from([("default".to_string(), "lua5.4".to_string())]);

    let sources = sources
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            (
                name.to_string(),
                SourceEntry::new(*url).with_priority(i as i32),
            )
        })
        .collect();

    Config { lpm, luas, sources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest::RepositoryManifest;

    #[test]
    fn test_generated_manifest_parses() {
        let text = repository_manifest_toml(
            "main",
            &[
                RepoPackage::zip("lpeg", &["1.0.0", "1.1.0"]),
                RepoPackage::tar_gz("penlight", &[]),
            ],
        );

        let manifest = RepositoryManifest::parse_str(&text).unwrap();
        assert_eq!(manifest.name, "main");
        assert_eq!(manifest.package("lpeg").unwrap().versions.len(), 2);
        assert_eq!(manifest.package("penlight").unwrap().package_type, "tar.gz");
    }

    #[test]
    fn test_config_is_valid() {
        let config = test_config("/tmp/lpm", &[("main", "https://example.org/main.toml")]);
        config.validate().unwrap();
        assert_eq!(config.sources["main"].priority, 0);
    }
}
