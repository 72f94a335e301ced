//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use txflow_types::ColorChoice;

/// txflow - replay transaction plans through the txflow engine
#[derive(Parser)]
#[command(name = "txflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay app install, update and uninstall plans through the transaction engine")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to a file
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a transaction plan
    Run {
        /// Path to the plan file (.toml)
        plan: PathBuf,

        /// Keep running the remaining operations after a fatal error
        #[arg(long)]
        keep_going: bool,

        /// Pull updates without deploying them
        #[arg(long)]
        no_deploy: bool,
    },

    /// Show the operations of a plan without running it
    #[command(alias = "show")]
    Inspect {
        /// Path to the plan file (.toml)
        plan: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::parse_from(["txflow", "run", "plan.toml", "--keep-going", "--json"]);
        assert!(cli.global.json);
        match cli.command {
            Commands::Run {
                plan,
                keep_going,
                no_deploy,
            } => {
                assert_eq!(plan, PathBuf::from("plan.toml"));
                assert!(keep_going);
                assert!(!no_deploy);
            }
            Commands::Inspect { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_inspect_alias_and_color() {
        let cli = Cli::parse_from(["txflow", "--color", "never", "show", "plan.toml"]);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
        assert!(matches!(cli.command, Commands::Inspect { .. }));
    }
}
