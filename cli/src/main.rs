#![deny(missing_docs)]

//! # validgen CLI
//!
//! Command line interface for the beego validator generator.
//!
//! Supported Commands:
//! - `generate`: Writes the validator package for a project.
//! - `routes`: Prints the resolved route table.
//! - `snapshot`: Publishes the route table to the snapshot store.
//! - `project add`: Registers a project in the snapshot store.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::error::CliResult;

mod common;
mod error;
mod generate;
mod project;
mod routes;
mod snapshot;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Validator generator for beego projects")]
struct Cli {
    /// Log level used when `RUST_LOG` is not set.
    #[clap(long, global = true, default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate request validators from controller annotations.
    Generate(generate::GenerateArgs),
    /// Print the resolved route table.
    Routes(routes::RoutesArgs),
    /// Publish the route table as a new snapshot version.
    Snapshot(snapshot::SnapshotArgs),
    /// Manage registered projects.
    #[clap(subcommand)]
    Project(project::ProjectCommand),
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Generate(args) => {
            generate::execute(args)?;
        }
        Commands::Routes(args) => {
            routes::execute(args, &mut std::io::stdout().lock())?;
        }
        Commands::Snapshot(args) => {
            snapshot::execute(args)?;
        }
        Commands::Project(command) => project::execute(command)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "validgen",
            "generate",
            "--project-root",
            "/srv/shop",
            "--force",
            "--no-format",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.force);
                assert!(args.no_format);
                assert_eq!(args.project.project_root, std::path::PathBuf::from("/srv/shop"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_force_conflicts_with_no_overwrite() {
        let res = Cli::try_parse_from(["validgen", "generate", "--force", "--no-overwrite"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_project_add() {
        let cli = Cli::try_parse_from([
            "validgen", "project", "add", "--host", "shop.local", "--name", "shop",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Project(project::ProjectCommand::Add(_))));
    }
}
