//! Global context for lpm operations.
//!
//! Provides centralized access to configuration, resolved paths, and the
//! environment used for placeholder substitution.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::core::dependency::{validate_name, InvalidName};
use crate::core::package::{ArchiveKind, ResolvedPackage};
use crate::core::project::PROJECT_MANIFEST;
use crate::ledger::Ledger;
use crate::util::config::{Config, LpmPaths};
use crate::util::env::{format_template, EnvLookup, ProcessEnv};
use crate::util::hash::Fingerprint;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "LPM_CONFIG";

/// Template for cached archive file names.
const ARCHIVE_FILE_TEMPLATE: &str = "${name}-${version}.${ext}";

/// Directory under `modules_path` holding per-slot install locks.
const LOCK_DIR: &str = ".lpm-locks";

/// Global context containing configuration and paths.
#[derive(Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Where the configuration was loaded from
    config_path: PathBuf,

    config: Config,

    /// Config paths after placeholder substitution
    paths: LpmPaths,

    /// Lookup used for placeholder substitution
    env: Arc<dyn EnvLookup + Send + Sync>,

    /// Whether to use verbose output
    verbose: bool,

    /// Whether to use colors in output
    color: bool,
}

impl fmt::Debug for GlobalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalContext")
            .field("cwd", &self.cwd)
            .field("config_path", &self.config_path)
            .field("paths", &self.paths)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl GlobalContext {
    /// The configuration file to use when none is given explicitly:
    /// `$LPM_CONFIG`, else `~/.lpm/lpm.toml`.
    pub fn default_config_path(env: &dyn EnvLookup) -> Option<PathBuf> {
        if let Some(path) = env.get(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        BaseDirs::new().map(|dirs| dirs.home_dir().join(".lpm").join("lpm.toml"))
    }

    /// Load the configuration at `config_path`, resolving paths against
    /// the process environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = Config::load(config_path)?;
        Self::from_config(config, config_path, Arc::new(ProcessEnv))
    }

    /// Build a context from an already parsed configuration.
    pub fn from_config(
        config: Config,
        config_path: &Path,
        env: Arc<dyn EnvLookup + Send + Sync>,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let paths = config.paths(env.as_ref())?;

        Ok(GlobalContext {
            cwd,
            config_path: config_path.to_path_buf(),
            config,
            paths,
            env,
            verbose: false,
            color: true,
        })
    }

    /// Use a specific working directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = cwd;
        self
    }

    /// Set verbose mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Set color output.
    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn paths(&self) -> &LpmPaths {
        &self.paths
    }

    pub fn env(&self) -> &dyn EnvLookup {
        self.env.as_ref()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Open the package ledger configured by `packages_db`.
    pub fn open_ledger(&self) -> Result<Ledger> {
        Ledger::open(&self.paths.packages_db).with_context(|| {
            format!(
                "failed to open package database {}",
                self.paths.packages_db.display()
            )
        })
    }

    /// The `packages.toml` of the project in the working directory.
    pub fn project_manifest_path(&self) -> PathBuf {
        self.cwd.join(PROJECT_MANIFEST)
    }

    /// Install slot for a package: `<modules_path>/<name>`.
    ///
    /// Fails for names that would resolve outside `modules_path`.
    pub fn install_dir(&self, name: &str) -> Result<PathBuf, InvalidName> {
        validate_name("package", name)?;
        Ok(self.paths.modules_path.join(name))
    }

    /// Directory cached repository indexes are written to.
    pub fn index_cache_dir(&self) -> &Path {
        &self.paths.repositories_cache
    }

    /// Where a downloaded archive is kept:
    /// `<packages_cache>/<repository id>/<name>-<version>.<ext>`.
    pub fn archive_cache_path(&self, package: &ResolvedPackage, kind: ArchiveKind) -> Result<PathBuf> {
        let args = HashMap::from([
            ("name", package.name.clone()),
            ("version", package.version.clone()),
            ("ext", kind.extension().to_string()),
        ]);
        let file_name = format_template(ARCHIVE_FILE_TEMPLATE, &args)?;
        validate_name("archive", &file_name)?;

        Ok(self
            .paths
            .packages_cache
            .join(package.repository_id.to_string())
            .join(file_name))
    }

    /// Lock file guarding an install slot.
    pub fn lock_path(&self, id: &Fingerprint) -> PathBuf {
        self.paths
            .modules_path
            .join(LOCK_DIR)
            .join(format!("{}.lock", id))
    }
}
