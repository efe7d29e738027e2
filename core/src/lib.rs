#![deny(missing_docs)]

//! # validgen Core
//!
//! Static analysis of beego projects and generation of request validators
//! from controller comment annotations.
//!
//! The router file's namespace registrations are extracted into a
//! registration graph, the imported controller packages are cataloged from
//! their `@router` / `@Param` comments, and the two are resolved into a route
//! table that drives code generation and snapshot publishing.

/// Shared error types.
pub mod error;

/// Run configuration.
pub mod config;

/// Route, operation and parameter models.
pub mod models;

/// Parameter type table.
pub mod type_table;

/// Go source parsing.
pub mod syntax;

/// `@router` / `@Param` comment parsing.
pub mod annotation;

/// Import path to directory resolution.
pub mod locator;

/// Per-run analysis indices.
pub mod context;

/// Controller package cataloging.
pub mod catalog;

/// Namespace registration graph.
pub mod graph;

/// Graph to route table resolution.
pub mod resolver;

/// Identifier and file naming.
pub mod naming;

/// Route grouping per module.
pub mod grouper;

/// Validator source rendering.
pub mod codegen;

/// Generated file output.
pub mod writer;

/// End-to-end generation.
pub mod pipeline;

/// Project and snapshot persistence.
pub mod store;

/// Snapshot publishing.
pub mod snapshot;

pub use codegen::CodeSynthesizer;
pub use config::GenerateConfig;
pub use error::{AppError, AppResult};
pub use pipeline::{generate_validation, resolve_routes, GenerationReport};
pub use resolver::{RouteEntry, RouteTable};
pub use snapshot::{publish_snapshot, SnapshotOutcome};
pub use store::{JsonFileStore, MemoryStore, Project, SnapshotStore, StoreRecord};
pub use writer::{
    FixedAnswer, GoFmt, NoopFormatter, OverwritePrompt, SourceFormatter, StdinPrompt,
    WriteOutcome, WritePolicy,
};
