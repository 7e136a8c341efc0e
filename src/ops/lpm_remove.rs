//! Implementation of `lpm remove`.

use anyhow::{Context, Result};

use crate::ledger::Ledger;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::hash::Fingerprint;
use crate::util::GlobalContext;

/// Uninstall a package: delete its install slot and its ledger record.
///
/// Returns `false` if there was nothing to remove.
pub fn uninstall(ctx: &GlobalContext, ledger: &Ledger, name: &str) -> Result<bool> {
    let dest = ctx.install_dir(name)?;
    let id = Fingerprint::of_path(&dest);
    let existed = dest.exists();

    remove_dir_all_if_exists(&dest)?;
    let recorded = ledger
        .delete(&id)
        .with_context(|| format!("failed to remove ledger record for {}", name))?;

    if existed || recorded {
        tracing::info!("Removed {} from {}", name, dest.display());
    } else {
        tracing::debug!("{} is not installed", name);
    }

    Ok(existed || recorded)
}
