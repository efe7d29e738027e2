#![deny(missing_docs)]

//! # Project Command
//!
//! Registers projects in the snapshot store.

use crate::common::StoreArgs;
use crate::error::CliResult;
use validgen_core::{AppError, Project, SnapshotStore, StoreRecord};

/// Project subcommands.
#[derive(clap::Subcommand, Debug, Clone)]
pub enum ProjectCommand {
    /// Registers a project under a host.
    Add(AddArgs),
}

/// Arguments for `project add`.
#[derive(clap::Args, Debug, Clone)]
pub struct AddArgs {
    #[clap(flatten)]
    pub store: StoreArgs,

    /// Host the project answers on.
    #[clap(long)]
    pub host: String,

    /// Display name.
    #[clap(long)]
    pub name: String,
}

/// Executes a project subcommand.
pub fn execute(command: &ProjectCommand) -> CliResult<()> {
    match command {
        ProjectCommand::Add(args) => {
            let project = add(&mut args.store.open(), &args.host, &args.name)?;
            println!("registered {} ({}) as {}", project.name, project.host, project.id);
        }
    }
    Ok(())
}

/// Inserts a project unless `host` is already taken by a live one.
pub fn add(store: &mut dyn SnapshotStore, host: &str, name: &str) -> CliResult<Project> {
    if store.find_project_by_host(host)?.is_some() {
        return Err(AppError::Store(format!("host '{}' is already registered", host)).into());
    }
    let project = Project::new(name, host);
    store.insert(vec![StoreRecord::Project(project.clone())])?;
    Ok(project)
}
