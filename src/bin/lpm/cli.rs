//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use lpm::util::ColorChoice;

#[derive(Parser)]
#[command(name = "lpm")]
#[command(author, version, about = "A package manager for Lua modules", long_about = None)]
pub struct Cli {
    /// Path to lpm.toml (defaults to ~/.lpm/lpm.toml)
    #[arg(long, global = true, env = "LPM_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a package, or every dependency in packages.toml
    Install(InstallArgs),

    /// Uninstall a package
    Remove(RemoveArgs),

    /// Download the index of every configured repository
    Update(UpdateArgs),

    /// Show whether a package is installed
    Status(StatusArgs),

    /// List installed packages
    List(ListArgs),

    /// Add a dependency to packages.toml
    Add(AddArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Package to install; omit to install the project's dependencies
    pub name: Option<String>,

    /// Version to install (default: newest)
    #[arg(long = "version", value_name = "VERSION", requires = "name")]
    pub version: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Package to uninstall
    pub name: String,

    /// Also drop the dependency from packages.toml
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Package to inspect
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print records as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Package to add
    pub name: String,

    /// Version requirement (default: latest)
    #[arg(long = "version", value_name = "VERSION")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["lpm", "--config", "/tmp/lpm.toml", "-v", "list"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/lpm.toml")));
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(matches!(cli.command, Commands::List(ListArgs { json: false })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["lpm", "list", "--json", "--color", "never", "-q"]);
        assert!(cli.quiet);
        assert_eq!(cli.color, ColorChoice::Never);
        assert!(matches!(cli.command, Commands::List(ListArgs { json: true })));
    }

    #[test]
    fn test_install_without_name() {
        let cli = Cli::parse_from(["lpm", "install"]);
        match cli.command {
            Commands::Install(args) => {
                assert!(args.name.is_none());
                assert!(args.version.is_none());
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_install_with_version() {
        let cli = Cli::parse_from(["lpm", "install", "lpeg", "--version", "1.1.0"]);
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.name.as_deref(), Some("lpeg"));
                assert_eq!(args.version.as_deref(), Some("1.1.0"));
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_install_version_requires_name() {
        assert!(Cli::try_parse_from(["lpm", "install", "--version", "1.0"]).is_err());
    }

    #[test]
    fn test_remove_requires_name() {
        assert!(Cli::try_parse_from(["lpm", "remove"]).is_err());
        let cli = Cli::parse_from(["lpm", "remove", "lpeg", "--save"]);
        match cli.command {
            Commands::Remove(args) => {
                assert_eq!(args.name, "lpeg");
                assert!(args.save);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert!(Cli::try_parse_from(["lpm", "--color", "sometimes", "update"]).is_err());
    }
}
