#![deny(missing_docs)]

//! # Package Catalog
//!
//! Parses the controller packages imported by the router file and records
//! every documented method on a pointer receiver into the
//! [`AnalysisContext`].

use crate::annotation::AnnotationParser;
use crate::context::AnalysisContext;
use crate::error::{AppError, AppResult};
use crate::locator::DependencyLocator;
use crate::models::{ControllerKey, Operation};
use crate::syntax::{GoImport, GoParser};
use crate::type_table::TypeTable;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walks packages and fills an [`AnalysisContext`].
pub struct PackageCatalog<'a> {
    locator: &'a dyn DependencyLocator,
    annotations: AnnotationParser<'a>,
    skip_packages: &'a [String],
    parser: GoParser,
}

impl<'a> PackageCatalog<'a> {
    /// Creates a catalog.
    ///
    /// `skip_packages` are import paths never analysed (the web framework
    /// itself, typically).
    pub fn new(
        locator: &'a dyn DependencyLocator,
        types: &'a TypeTable,
        skip_packages: &'a [String],
    ) -> AppResult<Self> {
        Ok(Self {
            locator,
            annotations: AnnotationParser::new(types),
            skip_packages,
            parser: GoParser::new()?,
        })
    }

    /// Catalogs every import of the router file.
    pub fn catalog_imports(
        &mut self,
        ctx: &mut AnalysisContext,
        imports: &[GoImport],
    ) -> AppResult<()> {
        for import in imports {
            self.catalog_import(ctx, &import.path)?;
        }
        Ok(())
    }

    /// Locates and catalogs one import path.
    ///
    /// Standard library and skipped packages are ignored; a package that
    /// cannot be found is reported and ignored.
    pub fn catalog_import(&mut self, ctx: &mut AnalysisContext, import_path: &str) -> AppResult<()> {
        if self.skip_packages.iter().any(|p| p == import_path) {
            debug!("skipping framework package {}", import_path);
            return Ok(());
        }
        if self.locator.is_standard_package(import_path) {
            debug!("skipping standard package {}", import_path);
            return Ok(());
        }
        if !ctx.mark_package(import_path) {
            return Ok(());
        }

        match self.locator.locate(import_path)? {
            Some(dir) => {
                let count = self.catalog_dir(ctx, import_path, &dir)?;
                debug!("{}: {} documented routes", import_path, count);
            }
            None => warn!("Couldn't locate package '{}', skipped", import_path),
        }
        Ok(())
    }

    /// Catalogs the `.go` files directly inside `dir` as package
    /// `import_path`. Returns the number of documented methods found.
    ///
    /// # Errors
    ///
    /// An unreadable directory or any file with a syntax error.
    pub fn catalog_dir(
        &mut self,
        ctx: &mut AnalysisContext,
        import_path: &str,
        dir: &Path,
    ) -> AppResult<usize> {
        let mut count = 0;

        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::parse(dir, format!("Error while parsing dir at '{}': {}", import_path, e))
            })?;
            let name = entry.file_name().to_string_lossy();
            if !entry.file_type().is_file() || name.starts_with('.') || !name.ends_with(".go") {
                continue;
            }

            let source = self.parser.parse_file(entry.path())?;
            for method in source.declarations().methods {
                let Some(receiver) = method.pointer_receiver else {
                    continue;
                };
                let annotation =
                    self.annotations
                        .parse(&receiver, &method.name, &method.doc, &method.params)?;
                if let Some(annotation) = annotation {
                    debug!(
                        "{}:{} {}.{} -> {}",
                        entry.path().display(),
                        method.line,
                        receiver,
                        method.name,
                        annotation.path
                    );
                    ctx.record(
                        ControllerKey::new(import_path, receiver),
                        &annotation.path,
                        &annotation.methods,
                        Operation {
                            function: method.name,
                            parameters: annotation.parameters,
                        },
                    );
                    count += 1;
                }
            }
        }

        Ok(count)
    }
}
