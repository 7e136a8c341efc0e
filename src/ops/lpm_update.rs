//! Implementation of `lpm update`.

use anyhow::{Context, Result};

use crate::core::repository::RepositoryDescriptor;
use crate::ledger::Ledger;
use crate::sources::fetch::HttpClient;
use crate::sources::index::download_repository;
use crate::util::{ErrorList, GlobalContext};

/// Outcome of refreshing repository indexes.
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Names of repositories whose cache was refreshed
    pub updated: Vec<String>,

    /// Failures, under the `update` stage
    pub errors: ErrorList,
}

/// The configured repositories in resolution order, with stable ids and
/// their recorded cache paths.
pub fn configured_repositories(
    ctx: &GlobalContext,
    ledger: &mut Ledger,
) -> Result<Vec<RepositoryDescriptor>> {
    let sources = ctx.config().sources_by_priority();
    let repositories = ledger
        .sync_repositories(&sources)
        .context("failed to sync configured sources")?;

    tracing::debug!("{} repositories configured", repositories.len());
    Ok(repositories)
}

/// Download every configured repository's index into the cache.
///
/// A failing repository is recorded and the rest are still updated.
pub fn update_repositories(
    ctx: &GlobalContext,
    ledger: &mut Ledger,
    client: &dyn HttpClient,
) -> Result<UpdateReport> {
    let mut report = UpdateReport::default();

    for repository in configured_repositories(ctx, ledger)? {
        match download_repository(client, &repository, ctx.index_cache_dir()) {
            Ok(path) => {
                ledger
                    .update_repository_cache(repository.id, &path.to_string_lossy())
                    .with_context(|| {
                        format!("failed to record cache for repository {}", repository.name)
                    })?;
                report.updated.push(repository.name);
            }
            Err(e) => {
                tracing::error!("{}", e);
                report.errors.push("update", e.to_string());
            }
        }
    }

    Ok(report)
}
