//! `lpm remove` command

use anyhow::Result;

use crate::cli::RemoveArgs;
use crate::commands::load_context;
use crate::GlobalOptions;
use lpm::ops::{remove_dependency, uninstall};
use lpm::util::Status;

pub fn execute(args: RemoveArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = load_context(global_opts)?;
    let ledger = ctx.open_ledger()?;

    if uninstall(&ctx, &ledger, &args.name)? {
        shell.status(Status::Removed, &args.name);
    } else {
        shell.warn(format!("package `{}` is not installed", args.name));
    }

    if args.save {
        let manifest_path = ctx.project_manifest_path();
        if manifest_path.exists() {
            remove_dependency(&manifest_path, &args.name)?;
            shell.status(
                Status::Removed,
                format!("{} from {}", args.name, manifest_path.display()),
            );
        }
    }

    Ok(())
}
