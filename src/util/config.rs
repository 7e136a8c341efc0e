//! Configuration file support for lpm.
//!
//! The configuration lives in `lpm.toml`:
//!
//! ```toml
//! [lpm]
//! db_backend = "sqlite3"
//! packages_db = "${HOME}/.lpm/packages.db"
//! repositories_cache = "${HOME}/.lpm/cache/repositories"
//! packages_cache = "${HOME}/.lpm/cache/packages"
//! modules_path = "${HOME}/.lpm/modules"
//!
//! [luas]
//! default = "lua5.4"
//!
//! [sources.main]
//! url = "https://example.org/lpm/main.toml"
//! priority = 0
//! ```
//!
//! Path values may contain `${VAR}` placeholders, resolved through an
//! injected [`EnvLookup`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::dependency::validate_name;
use crate::util::env::{fill_env_vars, EnvLookup};

/// The only supported ledger backend.
pub const SQLITE_BACKEND: &str = "sqlite3";

/// lpm configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core paths and backend
    #[serde(default)]
    pub lpm: LpmSection,

    /// Lua interpreters by name; `default` is required
    #[serde(default)]
    pub luas: BTreeMap<String, String>,

    /// Package sources by name
    #[serde(default)]
    pub sources: BTreeMap<String, SourceEntry>,
}

/// The `[lpm]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LpmSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_db: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repositories_cache: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_cache: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules_path: Option<String>,
}

/// A configured package source.
///
/// Sources are searched in priority order (lower = higher priority).
/// The first source to define a package wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    /// URL of the repository index
    pub url: String,

    /// Priority for resolution (lower = higher priority)
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    100
}

impl SourceEntry {
    pub fn new(url: impl Into<String>) -> Self {
        SourceEntry {
            url: url.into(),
            priority: default_priority(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Filesystem locations after placeholder substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LpmPaths {
    pub packages_db: PathBuf,
    pub repositories_cache: PathBuf,
    pub packages_cache: PathBuf,
    pub modules_path: PathBuf,
}

impl Config {
    /// Load and validate configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to open config file: {}", path.display()))?;

        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config file: {}", path.display()))?;

        tracing::debug!(
            "Loaded config from {}: {} lua(s), {} source(s)",
            path.display(),
            config.luas.len(),
            config.sources.len()
        );

        Ok(config)
    }

    /// Parse and validate configuration from a string.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to parse lpm.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every required key is present and source names are plain.
    pub fn validate(&self) -> Result<()> {
        let lpm = &self.lpm;
        let required = [
            ("db_backend", &lpm.db_backend),
            ("packages_db", &lpm.packages_db),
            ("repositories_cache", &lpm.repositories_cache),
            ("packages_cache", &lpm.packages_cache),
            ("modules_path", &lpm.modules_path),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            bail!(
                "the 'lpm' section of lpm.toml is missing the following parameters: {}",
                missing.join(" ")
            );
        }

        if lpm.db_backend.as_deref() != Some(SQLITE_BACKEND) {
            bail!(
                "unsupported db_backend '{}'; only '{}' is available",
                lpm.db_backend.as_deref().unwrap_or_default(),
                SQLITE_BACKEND
            );
        }

        if self.luas.is_empty() {
            bail!("no Lua interpreters specified in lpm.toml; add them under a 'luas' section");
        }
        if !self.luas.contains_key("default") {
            bail!("a 'default' Lua interpreter must be specified in the 'luas' section of lpm.toml");
        }

        for name in self.sources.keys() {
            validate_name("repository", name)?;
        }

        Ok(())
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize lpm config")?;
        crate::util::fs::write_string(path, &contents)
    }

    /// Resolve configured paths, substituting `${VAR}` placeholders.
    pub fn paths(&self, env: &dyn EnvLookup) -> Result<LpmPaths> {
        let resolve = |key: &str, value: &Option<String>| -> Result<PathBuf> {
            let raw = value
                .as_deref()
                .with_context(|| format!("missing lpm.{} in config", key))?;
            let filled = fill_env_vars(raw, env, true);
            if filled.is_empty() {
                bail!("lpm.{} resolves to an empty path ('{}')", key, raw);
            }
            Ok(PathBuf::from(filled))
        };

        Ok(LpmPaths {
            packages_db: resolve("packages_db", &self.lpm.packages_db)?,
            repositories_cache: resolve("repositories_cache", &self.lpm.repositories_cache)?,
            packages_cache: resolve("packages_cache", &self.lpm.packages_cache)?,
            modules_path: resolve("modules_path", &self.lpm.modules_path)?,
        })
    }

    /// Configured sources in resolution order.
    pub fn sources_by_priority(&self) -> Vec<(&str, &SourceEntry)> {
        let mut sources: Vec<_> = self
            .sources
            .iter()
            .map(|(name, entry)| (name.as_str(), entry))
            .collect();
        sources.sort_by_key(|(_, entry)| entry.priority);
        sources
    }

    /// The default Lua interpreter.
    pub fn default_lua(&self) -> Option<&str> {
        self.luas.get("default").map(String::as_str)
    }
}
