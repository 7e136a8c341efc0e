//! Implementation of `lpm install`.
//!
//! Installing a dependency runs resolve, fetch, install and record in
//! that order. Each install slot (`<modules_path>/<name>`) is guarded by
//! an exclusive advisory lock for the fetch/install/record steps, so two
//! processes installing into the same slot run one after the other.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::FileExt;
use thiserror::Error;

use crate::core::dependency::{DependencySpec, InvalidName};
use crate::core::package::ResolvedPackage;
use crate::core::project::ProjectManifest;
use crate::core::repository::RepositoryDescriptor;
use crate::ledger::{Ledger, LedgerError};
use crate::ops::lpm_update::configured_repositories;
use crate::resolver::{try_find_dependency, ResolveError};
use crate::sources::archive::{install_archive, InstallError};
use crate::sources::fetch::{fetch_artifact, FetchError, HttpClient};
use crate::util::hash::{sha256_bytes, Fingerprint};
use crate::util::{ErrorList, GlobalContext};

/// The step of an install that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Fetch,
    Install,
    Ledger,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Fetch => "fetch",
            Stage::Install => "install",
            Stage::Ledger => "ledger",
        }
    }
}

/// Why a single dependency failed to install.
#[derive(Debug, Error)]
pub enum InstallFailure {
    #[error(transparent)]
    Name(#[from] InvalidName),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl InstallFailure {
    pub fn stage(&self) -> Stage {
        match self {
            InstallFailure::Name(_) | InstallFailure::Resolve(_) => Stage::Resolve,
            InstallFailure::Fetch(_) => Stage::Fetch,
            InstallFailure::Install(_) => Stage::Install,
            InstallFailure::Ledger(_) => Stage::Ledger,
        }
    }
}

/// Result of installing one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The slot already holds a recorded install; nothing was done.
    AlreadyInstalled { path: PathBuf },

    /// The package was downloaded, extracted and recorded.
    Installed {
        package: ResolvedPackage,
        path: PathBuf,
        fingerprint: Fingerprint,
    },
}

/// Outcome of installing every dependency of a project.
#[derive(Debug, Default)]
pub struct ProjectInstallReport {
    pub outcomes: Vec<(DependencySpec, InstallOutcome)>,

    /// Failures grouped by stage
    pub errors: ErrorList,
}

/// Hold an exclusive lock on an install slot until dropped.
fn lock_slot(lock_path: &Path) -> Result<File, InstallError> {
    let lock_err = |source| InstallError::Lock {
        path: lock_path.to_path_buf(),
        source,
    };

    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent).map_err(lock_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)
        .map_err(lock_err)?;
    file.lock_exclusive().map_err(lock_err)?;
    Ok(file)
}

/// Install one dependency into `<modules_path>/<name>`.
pub fn install_dependency(
    ctx: &GlobalContext,
    ledger: &Ledger,
    client: &dyn HttpClient,
    repositories: &[RepositoryDescriptor],
    dep: &DependencySpec,
) -> Result<InstallOutcome, InstallFailure> {
    let dest = ctx.install_dir(dep.name())?;

    if ledger.is_added(&dest)? {
        tracing::info!("{} is already installed at {}", dep.name(), dest.display());
        return Ok(InstallOutcome::AlreadyInstalled { path: dest });
    }

    let package = try_find_dependency(dep, repositories, ctx.env())?;
    let kind = package.archive_kind().map_err(InstallError::from)?;

    let slot = Fingerprint::of_path(&dest);
    let _lock = lock_slot(&ctx.lock_path(&slot))?;

    // Another process may have finished this slot while we waited
    if ledger.is_added(&dest)? {
        tracing::info!("{} was installed concurrently", dep.name());
        return Ok(InstallOutcome::AlreadyInstalled { path: dest });
    }

    tracing::info!("Downloading {} from {}", package, package.artifact_url);
    let bytes = fetch_artifact(client, &package.artifact_url)?;
    tracing::debug!("sha256 {}", sha256_bytes(&bytes));

    let cache_path =
        ctx.archive_cache_path(&package, kind)
            .map_err(|e| InstallError::CachePath {
                package: package.to_string(),
                message: format!("{:#}", e),
            })?;

    let fingerprint = install_archive(kind, &bytes, &cache_path, &dest)?;
    ledger.insert(&fingerprint, &package)?;

    tracing::info!("Installed {} to {}", package, dest.display());

    Ok(InstallOutcome::Installed {
        package,
        path: dest,
        fingerprint,
    })
}

/// Install every dependency listed in the project's `packages.toml`.
///
/// Failures do not stop the remaining dependencies; they are collected
/// in the report by stage.
pub fn install_project(
    ctx: &GlobalContext,
    ledger: &mut Ledger,
    client: &dyn HttpClient,
) -> Result<ProjectInstallReport> {
    let manifest_path = ctx.project_manifest_path();
    let manifest = ProjectManifest::load(&manifest_path)
        .with_context(|| format!("failed to load {}", manifest_path.display()))?;

    let repositories = configured_repositories(ctx, ledger)?;
    let mut report = ProjectInstallReport::default();

    for dep in manifest.dependency_specs() {
        match install_dependency(ctx, ledger, client, &repositories, &dep) {
            Ok(outcome) => report.outcomes.push((dep, outcome)),
            Err(e) => {
                tracing::error!("{}: {}", dep, e);
                report
                    .errors
                    .push(e.stage().as_str(), format!("{}: {}", dep, e));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::HttpResponse;
    use crate::test_support::{
        test_config, write_repository_manifest, zip_archive, ArchiveEntry, MockHttpClient,
        RepoPackage,
    };
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        ctx: GlobalContext,
        ledger: Ledger,
        repos: Vec<RepositoryDescriptor>,
    }

    fn fixture(packages: &[RepoPackage]) -> Fixture {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_string_lossy().into_owned();
        let config = test_config(&root, &[("main", "https://example.org/main.toml")]);
        let env: HashMap<String, String> = HashMap::new();
        let ctx = GlobalContext::from_config(config, &tmp.path().join("lpm.toml"), Arc::new(env))
            .unwrap()
            .with_cwd(tmp.path().to_path_buf());

        let cache = ctx.index_cache_dir().join("main.toml");
        write_repository_manifest(&cache, "main", packages);

        let mut ledger = Ledger::open_in_memory().unwrap();
        let repos = configured_repositories(&ctx, &mut ledger).unwrap();
        ledger
            .update_repository_cache(repos[0].id, &cache.to_string_lossy())
            .unwrap();
        let repos = configured_repositories(&ctx, &mut ledger).unwrap();

        Fixture {
            _tmp: tmp,
            ctx,
            ledger,
            repos,
        }
    }

    fn lpeg_zip() -> Vec<u8> {
        zip_archive(&[
            ArchiveEntry::dir("lpeg/"),
            ArchiveEntry::file("lpeg/init.lua", "return {}"),
        ])
    }

    #[test]
    fn test_install_then_already_installed() {
        let f = fixture(&[RepoPackage::zip("lpeg", &["1.0.0", "1.1.0"])]);
        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.org/lpeg-1.1.0.zip",
            HttpResponse::new(200, lpeg_zip()),
        );

        let dep = DependencySpec::latest("lpeg");
        let outcome = install_dependency(&f.ctx, &f.ledger, &client, &f.repos, &dep).unwrap();

        let dest = f.ctx.install_dir("lpeg").unwrap();
        match &outcome {
            InstallOutcome::Installed {
                package,
                fingerprint,
                ..
            } => {
                assert_eq!(package.version, "1.1.0");
                assert_eq!(fingerprint, &Fingerprint::of_path(&dest));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(dest.join("lpeg/init.lua").exists());
        assert!(f.ledger.is_added(&dest).unwrap());

        let again = install_dependency(&f.ctx, &f.ledger, &client, &f.repos, &dep).unwrap();
        assert_eq!(again, InstallOutcome::AlreadyInstalled { path: dest });
        assert_eq!(client.requests().len(), 1);
    }

    #[test]
    fn test_dependency_named_parent_dir_is_rejected() {
        let f = fixture(&[RepoPackage::zip("lpeg", &["1.0.0"])]);
        let client = MockHttpClient::new();
        let keep = f.ctx.paths().packages_db.clone();
        std::fs::write(&keep, "ledger").unwrap();

        let err = install_dependency(
            &f.ctx,
            &f.ledger,
            &client,
            &f.repos,
            &DependencySpec::latest(".."),
        )
        .unwrap_err();

        assert!(matches!(err, InstallFailure::Name(_)));
        assert_eq!(err.stage(), Stage::Resolve);
        assert!(client.requests().is_empty());
        assert!(keep.exists());
    }

    #[test]
    fn test_fetch_failure_records_nothing() {
        let f = fixture(&[RepoPackage::zip("lpeg", &["1.0.0"])]);
        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.org/lpeg-1.0.0.zip",
            HttpResponse::new(404, "not found"),
        );

        let err = install_dependency(
            &f.ctx,
            &f.ledger,
            &client,
            &f.repos,
            &DependencySpec::latest("lpeg"),
        )
        .unwrap_err();

        assert_eq!(err.stage(), Stage::Fetch);
        assert!(err.to_string().contains("404"));
        assert!(!f.ctx.install_dir("lpeg").unwrap().exists());
        assert!(f.ledger.list().unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_package_type() {
        let f = fixture(&[RepoPackage::with_type("lpeg", "rock", &["1.0.0"])]);
        let client = MockHttpClient::new();

        let err = install_dependency(
            &f.ctx,
            &f.ledger,
            &client,
            &f.repos,
            &DependencySpec::latest("lpeg"),
        )
        .unwrap_err();

        assert_eq!(err.stage(), Stage::Install);
        assert!(err.to_string().contains("unsupported package type 'rock'"));
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_reinstall_after_external_removal() {
        let f = fixture(&[RepoPackage::zip("lpeg", &["1.0.0"])]);
        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.org/lpeg-1.0.0.zip",
            HttpResponse::new(200, lpeg_zip()),
        );
        let dep = DependencySpec::latest("lpeg");

        install_dependency(&f.ctx, &f.ledger, &client, &f.repos, &dep).unwrap();
        std::fs::remove_dir_all(f.ctx.install_dir("lpeg").unwrap()).unwrap();

        let outcome = install_dependency(&f.ctx, &f.ledger, &client, &f.repos, &dep).unwrap();
        assert!(matches!(outcome, InstallOutcome::Installed { .. }));
        assert_eq!(f.ledger.list().unwrap().len(), 1);
    }

    #[test]
    fn test_install_project_collects_errors_by_stage() {
        let mut f = fixture(&[
            RepoPackage::zip("lpeg", &["1.0.0"]),
            RepoPackage::zip("luasocket", &["3.1.0"]),
        ]);
        std::fs::write(
            f.ctx.project_manifest_path(),
            r#"
[project]
name = "app"

[dependencies]
lpeg = "latest"
luasocket = "3.1.0"
penlight = "latest"
"#,
        )
        .unwrap();

        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.org/lpeg-1.0.0.zip",
            HttpResponse::new(200, lpeg_zip()),
        );

        let report = install_project(&f.ctx, &mut f.ledger, &client).unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].0.name(), "lpeg");
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors.stage("fetch").len(), 1);
        assert!(report.errors.stage("fetch")[0].starts_with("luasocket:3.1.0"));
        assert_eq!(report.errors.stage("resolve").len(), 1);
        assert!(report.errors.stage("resolve")[0].starts_with("penlight:latest"));
    }

    #[test]
    fn test_install_project_without_manifest() {
        let mut f = fixture(&[]);
        let client = MockHttpClient::new();

        let err = install_project(&f.ctx, &mut f.ledger, &client).unwrap_err();
        assert!(format!("{:#}", err).contains("packages.toml"));
    }
}
