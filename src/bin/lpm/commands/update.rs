//! `lpm update` command

use anyhow::{Context, Result};

use crate::cli::UpdateArgs;
use crate::commands::load_context;
use crate::GlobalOptions;
use lpm::ops::update_repositories;
use lpm::sources::ReqwestClient;
use lpm::util::Status;

pub fn execute(_args: UpdateArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = load_context(global_opts)?;
    let mut ledger = ctx.open_ledger()?;
    let client = ReqwestClient::new().context("failed to create HTTP client")?;

    let report = update_repositories(&ctx, &mut ledger, &client)?;
    for name in &report.updated {
        shell.status(Status::Updated, format!("repository `{}`", name));
    }

    report.errors.into_result().map_err(Into::into)
}
