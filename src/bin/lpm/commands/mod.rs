//! Command implementations

use anyhow::{Context, Result};

use crate::GlobalOptions;
use lpm::util::{GlobalContext, ProcessEnv};

pub mod add;
pub mod install;
pub mod list;
pub mod remove;
pub mod status;
pub mod update;

/// Load the global context from `--config`, `$LPM_CONFIG` or the
/// default location.
pub fn load_context(global_opts: &GlobalOptions) -> Result<GlobalContext> {
    let path = match &global_opts.config {
        Some(path) => path.clone(),
        None => GlobalContext::default_config_path(&ProcessEnv)
            .context("could not determine the home directory; pass --config")?,
    };

    let mut ctx = GlobalContext::load(&path)?;
    ctx.set_verbose(global_opts.verbose);
    ctx.set_color(global_opts.shell.use_color());
    Ok(ctx)
}
