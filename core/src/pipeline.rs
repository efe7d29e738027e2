#![deny(missing_docs)]

//! # Pipeline
//!
//! One generation run: extract the registration graph from the router file,
//! catalog the imported controller packages, resolve the route table, render
//! the validator package and write it.

use crate::catalog::PackageCatalog;
use crate::codegen::CodeSynthesizer;
use crate::config::GenerateConfig;
use crate::context::AnalysisContext;
use crate::error::AppResult;
use crate::graph::{GoGraphExtractor, GraphExtractor, ImportAliases};
use crate::resolver::{RouteGraphResolver, RouteTable};
use crate::writer::{write_generated, OverwritePrompt, SourceFormatter, WriteOutcome, WritePolicy};
use std::path::PathBuf;
use tracing::{debug, info};

/// Files touched by [`generate_validation`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationReport {
    /// Number of resolved routes.
    pub routes: usize,
    /// Files created or overwritten, in write order.
    pub written: Vec<PathBuf>,
    /// Existing files left untouched.
    pub skipped: Vec<PathBuf>,
}

/// Resolves the route table of the project described by `config`.
pub fn resolve_routes(config: &GenerateConfig) -> AppResult<RouteTable> {
    let router = config.router_path();
    debug!("reading registrations from {}", router.display());
    let graph = GoGraphExtractor::new()?.extract(&router)?;

    let locator = config.locator()?;
    let types = config.type_table();
    let mut ctx = AnalysisContext::new();
    PackageCatalog::new(&locator, &types, &config.skip_packages)?
        .catalog_imports(&mut ctx, &graph.imports)?;
    debug!("{} controllers cataloged", ctx.len());

    let aliases = ImportAliases::from_imports(&graph.imports);
    let table = RouteGraphResolver::new(&ctx, &aliases, &config.controller_suffix).resolve(&graph);
    info!("{} routes resolved", table.len());
    Ok(table)
}

/// Generates the validator package for the project described by `config`.
pub fn generate_validation(
    config: &GenerateConfig,
    policy: WritePolicy,
    prompt: &mut dyn OverwritePrompt,
    formatter: &dyn SourceFormatter,
) -> AppResult<GenerationReport> {
    let table = resolve_routes(config)?;
    let files = CodeSynthesizer::new(config.validator_suffix.as_str()).synthesize(
        &table,
        &config.output_path(),
        policy,
    );

    let mut report = GenerationReport {
        routes: table.len(),
        ..Default::default()
    };
    for file in &files {
        match write_generated(file, prompt, formatter)? {
            WriteOutcome::Created(p) | WriteOutcome::Overwritten(p) => report.written.push(p),
            WriteOutcome::Skipped(p) => report.skipped.push(p),
        }
    }
    Ok(report)
}
