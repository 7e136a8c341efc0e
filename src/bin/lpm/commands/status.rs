//! `lpm status` command

use anyhow::Result;

use crate::cli::StatusArgs;
use crate::commands::load_context;
use crate::GlobalOptions;
use lpm::ops::package_status;
use lpm::util::diagnostic::suggestions;
use lpm::util::{Diagnostic, Status};

pub fn execute(args: StatusArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = load_context(global_opts)?;
    let mut ledger = ctx.open_ledger()?;

    let status = package_status(&ctx, &mut ledger, &args.name)?;

    match &status.record {
        Some(record) => println!(
            "{} v{} is installed at {}",
            record.name,
            record.version,
            status.path.display()
        ),
        None if status.installed => println!(
            "{} is installed at {}",
            status.name,
            status.path.display()
        ),
        None => println!("{} is not installed", status.name),
    }

    match &status.latest {
        Some(latest) => {
            let newer = status
                .record
                .as_ref()
                .is_some_and(|r| r.version != latest.version);
            if newer {
                shell.status(Status::Info, format!("{} is available", latest));
            } else if shell.is_verbose() {
                shell.note(format!("latest is {}", latest));
            }
        }
        None => {
            let diag = Diagnostic::warning(format!(
                "`{}` was not found in the cached repositories",
                status.name
            ))
            .with_location(&ctx.paths().repositories_cache)
            .with_suggestion(suggestions::UPDATE_CACHES);
            shell.print_raw(&diag.format(shell.use_color()));
        }
    }

    Ok(())
}
