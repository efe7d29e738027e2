//! # Analysis Context
//!
//! Per-run indices built by the package catalog and read by the resolver.
//! One value per generation run; nothing here is global.

use crate::models::{ControllerKey, HttpMethod, Operation, PathItem};
use indexmap::{IndexMap, IndexSet};

/// Everything cataloged for one (controller, route path) pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogedRoute {
    /// Operations per verb.
    pub item: PathItem,
    /// Last Go method documented with this route path.
    pub function: String,
}

/// Controller operations discovered during one run.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    controllers: IndexMap<ControllerKey, IndexMap<String, CatalogedRoute>>,
    packages: IndexSet<String>,
}

impl AnalysisContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `import_path` as cataloged; false if it already was.
    pub fn mark_package(&mut self, import_path: &str) -> bool {
        self.packages.insert(import_path.to_string())
    }

    /// Records one documented method.
    ///
    /// Each verb in `methods` is overwritten; other verbs already recorded
    /// for `path` are kept. The function name is always replaced.
    pub fn record(
        &mut self,
        controller: ControllerKey,
        path: &str,
        methods: &[HttpMethod],
        operation: Operation,
    ) {
        let entry = self
            .controllers
            .entry(controller)
            .or_default()
            .entry(path.to_string())
            .or_default();
        for method in methods {
            entry.item.set(*method, operation.clone());
        }
        entry.function = operation.function;
    }

    /// Routes of `controller` in discovery order.
    pub fn routes(&self, controller: &ControllerKey) -> Option<&IndexMap<String, CatalogedRoute>> {
        self.controllers.get(controller)
    }

    /// Number of cataloged controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// True when nothing was cataloged.
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}
