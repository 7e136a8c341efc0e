//! Implementation of `lpm status` and `lpm list`.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::dependency::DependencySpec;
use crate::core::package::ResolvedPackage;
use crate::ledger::{Ledger, LedgerRecord};
use crate::ops::lpm_update::configured_repositories;
use crate::resolver::find_dependency;
use crate::util::hash::Fingerprint;
use crate::util::GlobalContext;

/// Installation state of one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub path: PathBuf,
    pub installed: bool,

    /// Ledger row, when installed
    pub record: Option<LedgerRecord>,

    /// Newest version in the configured repositories, if resolvable
    pub latest: Option<ResolvedPackage>,
}

/// Report whether `name` is installed and what the repositories offer.
///
/// Checking installation heals the ledger if the slot was deleted.
pub fn package_status(ctx: &GlobalContext, ledger: &mut Ledger, name: &str) -> Result<PackageStatus> {
    let path = ctx.install_dir(name)?;
    let installed = ledger.is_added(&path)?;
    let record = if installed {
        ledger.get(&Fingerprint::of_path(&path))?
    } else {
        None
    };

    let repositories = configured_repositories(ctx, ledger)?;
    let latest = find_dependency(&DependencySpec::latest(name), &repositories, ctx.env());

    Ok(PackageStatus {
        name: name.to_string(),
        path,
        installed,
        record,
        latest,
    })
}

/// Every ledger record whose install slot still exists.
///
/// Records for slots deleted outside lpm are dropped along the way.
pub fn list_installed(ctx: &GlobalContext, ledger: &Ledger) -> Result<Vec<LedgerRecord>> {
    let mut installed = Vec::new();
    for record in ledger.list()? {
        let path = match ctx.install_dir(&record.name) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("Skipping ledger record {}: {}", record.id, e);
                continue;
            }
        };
        if ledger.is_added(&path)? {
            installed.push(record);
        }
    }
    Ok(installed)
}
