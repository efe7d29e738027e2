#![deny(missing_docs)]

//! # Snapshot Command
//!
//! Publishes the resolved routes of a project to the snapshot store.

use crate::common::{ProjectArgs, StoreArgs};
use crate::error::CliResult;
use validgen_core::{publish_snapshot, resolve_routes, SnapshotOutcome};

/// Arguments for the snapshot command.
#[derive(clap::Args, Debug, Clone)]
pub struct SnapshotArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,

    #[clap(flatten)]
    pub store: StoreArgs,

    /// Host the project is registered under.
    #[clap(long)]
    pub host: String,
}

/// Executes the snapshot command.
pub fn execute(args: &SnapshotArgs) -> CliResult<SnapshotOutcome> {
    let config = args.project.load_config()?;
    let table = resolve_routes(&config)?;
    let mut store = args.store.open();
    let outcome = publish_snapshot(&mut store, &args.host, &table)?;

    match &outcome {
        SnapshotOutcome::Published { version, hash } => {
            println!("published version {} ({})", version, hash)
        }
        SnapshotOutcome::Unchanged { version, .. } => {
            println!("version {} is up to date", version)
        }
    }
    Ok(outcome)
}
