//! `lpm install` command

use anyhow::{anyhow, Context, Result};

use crate::cli::InstallArgs;
use crate::commands::load_context;
use crate::GlobalOptions;
use lpm::core::dependency::{DependencySpec, VersionRequest};
use lpm::ops::{
    configured_repositories, install_dependency, install_project, InstallFailure, InstallOutcome,
};
use lpm::sources::ReqwestClient;
use lpm::util::diagnostic::suggestions;
use lpm::util::{Diagnostic, Shell, Status};

pub fn execute(args: InstallArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;
    let ctx = load_context(global_opts)?;
    let mut ledger = ctx.open_ledger()?;
    let client = ReqwestClient::new().context("failed to create HTTP client")?;

    let Some(name) = args.name else {
        let manifest_path = ctx.project_manifest_path();
        if !manifest_path.exists() {
            let diag = Diagnostic::error("no project manifest in the current directory")
                .with_location(&manifest_path)
                .with_suggestion(suggestions::NO_PROJECT)
                .with_suggestion("Or name a package: `lpm install <name>`");
            shell.print_raw(&diag.format(shell.use_color()));
            return Err(anyhow!("nothing to install"));
        }

        let report = install_project(&ctx, &mut ledger, &client)?;
        for (dep, outcome) in &report.outcomes {
            print_outcome(shell, dep, outcome);
        }
        return report.errors.into_result().map_err(Into::into);
    };

    let request = args
        .version
        .as_deref()
        .map(VersionRequest::parse)
        .unwrap_or(VersionRequest::Latest);
    let dep = DependencySpec::new(name, request);

    let repositories = configured_repositories(&ctx, &mut ledger)?;
    shell.status(Status::Resolving, &dep);

    match install_dependency(&ctx, &ledger, &client, &repositories, &dep) {
        Ok(outcome) => {
            print_outcome(shell, &dep, &outcome);
            Ok(())
        }
        Err(e) => {
            shell.print_raw(&failure_diagnostic(&e).format(shell.use_color()));
            Err(anyhow!("could not install `{}`", dep))
        }
    }
}

fn failure_diagnostic(failure: &InstallFailure) -> Diagnostic {
    match failure {
        InstallFailure::Name(e) => Diagnostic::error(e.to_string()),
        InstallFailure::Resolve(e) => e.to_diagnostic(),
        InstallFailure::Fetch(e) => {
            Diagnostic::error(e.to_string()).with_suggestion(suggestions::FETCH_FAILED)
        }
        InstallFailure::Install(e) => Diagnostic::error(e.to_string()),
        InstallFailure::Ledger(e) => {
            Diagnostic::error(e.to_string()).with_suggestion(suggestions::LEDGER)
        }
    }
}

fn print_outcome(shell: &Shell, dep: &DependencySpec, outcome: &InstallOutcome) {
    match outcome {
        InstallOutcome::AlreadyInstalled { path } => shell.status(
            Status::Skipped,
            format!("{} is already installed at {}", dep.name(), path.display()),
        ),
        InstallOutcome::Installed { package, path, .. } => shell.status(
            Status::Installed,
            format!("{} to {}", package, path.display()),
        ),
    }
}
