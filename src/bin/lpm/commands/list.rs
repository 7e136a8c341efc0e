//! `lpm list` command

use anyhow::{Context, Result};

use crate::cli::ListArgs;
use crate::commands::load_context;
use crate::GlobalOptions;
use lpm::ops::list_installed;

pub fn execute(args: ListArgs, global_opts: &GlobalOptions) -> Result<()> {
    let ctx = load_context(global_opts)?;
    let ledger = ctx.open_ledger()?;

    let records = list_installed(&ctx, &ledger)?;

    if args.json {
        let json = serde_json::to_string_pretty(&records).context("failed to serialize records")?;
        println!("{}", json);
        return Ok(());
    }

    if records.is_empty() {
        global_opts.shell.note("no packages installed");
        return Ok(());
    }

    for record in &records {
        println!("{} {} ({})", record.name, record.version, record.id);
    }

    Ok(())
}
