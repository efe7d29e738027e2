//! # Module Grouper
//!
//! Splits a [`RouteTable`] into per-module groups for code generation.

use crate::models::ParameterDescriptor;
use crate::resolver::{RouteEntry, RouteTable};
use indexmap::IndexMap;

/// The routes of one module, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleGroup<'t> {
    /// Module name (controller type minus its suffix).
    pub module: &'t str,
    /// (canonical path, route) pairs.
    pub routes: Vec<(&'t str, &'t RouteEntry)>,
}

/// A validator method to generate.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMethod<'t> {
    /// Go method name, reused as the validator method name.
    pub function: &'t str,
    /// Parameters to check.
    pub parameters: &'t [ParameterDescriptor],
}

impl<'t> ModuleGroup<'t> {
    /// One method per distinct function name; the first route wins.
    pub fn methods(&self) -> Vec<ModuleMethod<'t>> {
        let mut methods: IndexMap<&'t str, ModuleMethod<'t>> = IndexMap::new();
        for &(_, entry) in &self.routes {
            let function = entry.function.as_str();
            if methods.contains_key(function) {
                continue;
            }
            let parameters = entry
                .operations
                .operation_for(function)
                .map(|op| op.parameters.as_slice())
                .unwrap_or(&[]);
            methods.insert(
                function,
                ModuleMethod {
                    function,
                    parameters,
                },
            );
        }
        methods.into_values().collect()
    }
}

/// Groups routes by module, modules ordered by first appearance.
pub fn group_by_module(table: &RouteTable) -> Vec<ModuleGroup<'_>> {
    let mut groups: IndexMap<&str, Vec<(&str, &RouteEntry)>> = IndexMap::new();
    for (path, entry) in table.iter() {
        groups
            .entry(entry.module.as_str())
            .or_default()
            .push((path.as_str(), entry));
    }
    groups
        .into_iter()
        .map(|(module, routes)| ModuleGroup { module, routes })
        .collect()
}
