#![deny(missing_docs)]

//! # Route Graph Resolver
//!
//! Flattens a [`RegistrationGraph`] into a [`RouteTable`]: every include is
//! replaced by the cataloged routes of its controllers, prefixed by the
//! enclosing namespace paths and rewritten into canonical `{name}` form.

use crate::context::AnalysisContext;
use crate::graph::{ImportAliases, IncludeTarget, RegistrationGraph, RegistrationNode};
use crate::models::{ControllerKey, PathItem};
use crate::naming::module_name;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// One resolved route.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RouteEntry {
    /// Operations per verb.
    pub operations: PathItem,
    /// Generation unit the route belongs to.
    pub module: String,
    /// Go method recorded last for this route.
    pub function: String,
}

/// Canonical path -> resolved route, in traversal order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RouteTable {
    /// Base path of the first top-level namespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Routes keyed by full canonical path.
    pub routes: IndexMap<String, RouteEntry>,
}

impl RouteTable {
    /// Merges one route into the table.
    ///
    /// Verbs of `item` overwrite the same verbs already present; module and
    /// function are replaced. A path keeps its first insertion position.
    pub fn insert(&mut self, path: String, item: &PathItem, module: &str, function: &str) {
        let entry = self.routes.entry(path).or_default();
        entry.operations.merge(item);
        entry.module = module.to_string();
        entry.function = function.to_string();
    }

    /// Route at `path`, if any.
    pub fn get(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    /// Iterates over (path, route) in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RouteEntry)> {
        self.routes.iter()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no route was resolved.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Rewrites beego path parameters into `{name}` placeholders.
///
/// `:id` and `?:id` become `{id}`; type and regex constraints are dropped,
/// so `:id:int` and `:id(\d+)` also become `{id}`.
pub fn canonical_path(path: &str) -> String {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER_RE
        .get_or_init(|| Regex::new(r"^(?:\?:|:|\{)([^:(}]*)").expect("Invalid regex constant"));

    path.split('/')
        .map(|segment| match re.captures(segment) {
            Some(caps) => format!("{{{}}}", &caps[1]),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Joins two path fragments with exactly one `/` between them.
pub fn join_paths(prefix: &str, path: &str) -> String {
    let head = prefix.trim_end_matches('/');
    if path.is_empty() {
        return if head.is_empty() { prefix.to_string() } else { head.to_string() };
    }
    format!("{}/{}", head, path.trim_start_matches('/'))
}

/// Resolves registration graphs against an [`AnalysisContext`].
pub struct RouteGraphResolver<'a> {
    ctx: &'a AnalysisContext,
    aliases: &'a ImportAliases,
    controller_suffix: &'a str,
}

impl<'a> RouteGraphResolver<'a> {
    /// Creates a resolver. `controller_suffix` is stripped from type names
    /// to form module names.
    pub fn new(
        ctx: &'a AnalysisContext,
        aliases: &'a ImportAliases,
        controller_suffix: &'a str,
    ) -> Self {
        Self {
            ctx,
            aliases,
            controller_suffix,
        }
    }

    /// Flattens `graph`, depth first in argument order.
    pub fn resolve(&self, graph: &RegistrationGraph) -> RouteTable {
        let mut table = RouteTable::default();
        for root in &graph.roots {
            if let RegistrationNode::Namespace { base_path, .. } = root {
                if table.base_path.is_none() && !base_path.is_empty() {
                    table.base_path = Some(base_path.clone());
                }
            }
            self.visit(root, "", &mut table);
        }
        table
    }

    fn visit(&self, node: &RegistrationNode, prefix: &str, table: &mut RouteTable) {
        match node {
            RegistrationNode::Namespace {
                base_path,
                children,
            } => {
                let prefix = join_paths(prefix, base_path);
                for child in children {
                    self.visit(child, &prefix, table);
                }
            }
            RegistrationNode::Include { targets } => {
                for target in targets {
                    self.include(target, prefix, table);
                }
            }
        }
    }

    fn include(&self, target: &IncludeTarget, prefix: &str, table: &mut RouteTable) {
        let (alias, type_name) = match target {
            IncludeTarget::Controller {
                package_alias,
                type_name,
            } => (package_alias, type_name),
            IncludeTarget::Unresolved { expression, reason } => {
                warn!("{}: {}, skipped", reason, expression);
                return;
            }
        };

        let Some(package) = self.aliases.resolve(alias) else {
            warn!("Unknown package alias '{}' for {}, skipped", alias, type_name);
            return;
        };

        let key = ControllerKey::new(package, type_name.as_str());
        let Some(routes) = self.ctx.routes(&key) else {
            debug!("{} has no documented routes", key);
            return;
        };

        let module = module_name(type_name, self.controller_suffix);
        for (path, route) in routes {
            let full = canonical_path(&join_paths(prefix, path));
            table.insert(full, &route.item, &module, &route.function);
        }
    }
}
