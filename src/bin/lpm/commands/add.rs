//! `lpm add` command

use anyhow::{Context, Result};

use crate::cli::AddArgs;
use crate::GlobalOptions;
use lpm::core::project::PROJECT_MANIFEST;
use lpm::ops::{add_dependency, AddResult};
use lpm::util::Status;

pub fn execute(args: AddArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let manifest_path = cwd.join(PROJECT_MANIFEST);

    match add_dependency(&manifest_path, &args.name, args.version.as_deref())? {
        AddResult::Added { name, version } => {
            shell.status(Status::Added, format!("{} {} to {}", name, version, PROJECT_MANIFEST));
        }
        AddResult::Updated { name, from, to } => {
            shell.status(Status::Updated, format!("{} {} -> {}", name, from, to));
        }
        AddResult::Unchanged { name, version } => {
            shell.status(
                Status::Skipped,
                format!("{} {} is already a dependency", name, version),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::AddArgs;
    use clap::Parser;

    fn parse_add_args(args: &[&str]) -> AddArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            add: AddArgs,
        }
        TestCli::parse_from(args).add
    }

    #[test]
    fn test_add_args_defaults() {
        let args = parse_add_args(&["test", "lpeg"]);
        assert_eq!(args.name, "lpeg");
        assert!(args.version.is_none());
    }

    #[test]
    fn test_add_args_version() {
        let args = parse_add_args(&["test", "luasocket", "--version", "3.1.0"]);
        assert_eq!(args.name, "luasocket");
        assert_eq!(args.version.as_deref(), Some("3.1.0"));
    }
}
