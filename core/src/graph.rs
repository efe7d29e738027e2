#![deny(missing_docs)]

//! # Registration Graph
//!
//! The router file describes routing as nested calls:
//!
//! ```go
//! ns := beego.NewNamespace("/v1",
//!     beego.NSNamespace("/user",
//!         beego.NSInclude(&controllers.UserController{}),
//!     ),
//!     beego.NSInclude(admin),
//! )
//! ```
//!
//! A [`GraphExtractor`] turns that source shape into an explicit
//! [`RegistrationNode`] tree. Resolution against the package catalog happens
//! later, in `resolver.rs`, and knows nothing about Go syntax.

use crate::error::{AppError, AppResult};
use crate::syntax::{named_children, unquote, GoImport, GoParser, GoSource};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use tree_sitter::Node;

/// Maximum namespace nesting accepted by the extractor.
pub const MAX_NAMESPACE_DEPTH: usize = 32;

/// Maximum identifier indirections followed for an include operand.
const MAX_ALIAS_HOPS: usize = 4;

const NEW_NAMESPACE: &str = "NewNamespace";
const NS_NAMESPACE: &str = "NSNamespace";
const NS_INCLUDE: &str = "NSInclude";

/// One node of the registration graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationNode {
    /// A route group: its base path prefixes everything beneath it.
    Namespace {
        /// Path segment contributed by this namespace.
        base_path: String,
        /// Nested namespaces and includes, in argument order.
        children: Vec<RegistrationNode>,
    },
    /// Controllers mounted at the enclosing namespace.
    Include {
        /// Operands in argument order.
        targets: Vec<IncludeTarget>,
    },
}

/// An include operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeTarget {
    /// `&alias.Type{}`, possibly reached through a variable.
    Controller {
        /// Local package name used in the router file.
        package_alias: String,
        /// Controller type name.
        type_name: String,
    },
    /// Anything whose controller type could not be determined.
    Unresolved {
        /// Source text of the operand.
        expression: String,
        /// Why it could not be resolved.
        reason: String,
    },
}

/// The router file's imports plus its top-level namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationGraph {
    /// Imports of the entry file.
    pub imports: Vec<GoImport>,
    /// Top-level namespaces in source order.
    pub roots: Vec<RegistrationNode>,
}

/// Builds a [`RegistrationGraph`] from a registration entry file.
///
/// One implementation per host language / framework idiom.
pub trait GraphExtractor {
    /// Extracts the graph from the file at `entry`.
    fn extract(&mut self, entry: &Path) -> AppResult<RegistrationGraph>;
}

/// Local import name -> import path, for one entry file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportAliases {
    aliases: IndexMap<String, String>,
}

impl ImportAliases {
    /// Builds the alias table. Blank and dot imports get no alias.
    pub fn from_imports(imports: &[GoImport]) -> Self {
        let mut aliases = IndexMap::new();
        for import in imports {
            let alias = match import.name.as_deref() {
                Some("_") | Some(".") => continue,
                Some(name) => name.to_string(),
                None => default_package_name(&import.path),
            };
            aliases.insert(alias, import.path.clone());
        }
        Self { aliases }
    }

    /// Import path behind `alias`.
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}

/// Package name assumed for an unnamed import: the last path element, or the
/// one before a `/vN` major-version suffix.
fn default_package_name(path: &str) -> String {
    let mut parts = path.rsplit('/');
    let last = parts.next().unwrap_or(path);
    let is_major_version = last.len() > 1
        && last.starts_with('v')
        && last[1..].chars().all(|c| c.is_ascii_digit());
    match parts.next() {
        Some(prev) if is_major_version => prev.to_string(),
        _ => last.to_string(),
    }
}

/// Extractor for the beego `NewNamespace` / `NSNamespace` / `NSInclude` idiom.
pub struct GoGraphExtractor {
    parser: GoParser,
    max_depth: usize,
}

impl GoGraphExtractor {
    /// Creates an extractor with the default nesting bound.
    pub fn new() -> AppResult<Self> {
        Ok(Self {
            parser: GoParser::new()?,
            max_depth: MAX_NAMESPACE_DEPTH,
        })
    }

    /// Overrides the nesting bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Extracts the graph from already-parsed source.
    ///
    /// Include operands that are plain identifiers are looked up among the
    /// assignments of the enclosing function first, then among package-level
    /// `var` declarations.
    pub fn extract_source(&self, source: &GoSource) -> AppResult<RegistrationGraph> {
        let package_vars = named_children(source.root())
            .into_iter()
            .filter(|decl| decl.kind() == "var_declaration")
            .fold(HashMap::new(), |mut vars, decl| {
                collect_assignments(source, decl, &mut vars);
                vars
            });

        let mut roots = Vec::new();
        for decl in named_children(source.root()) {
            if !matches!(decl.kind(), "function_declaration" | "method_declaration") {
                continue;
            }
            let Some(body) = decl.child_by_field_name("body") else {
                continue;
            };
            let mut calls = Vec::new();
            find_namespace_calls(source, body, &mut calls);
            if calls.is_empty() {
                continue;
            }

            let mut locals = HashMap::new();
            collect_assignments(source, body, &mut locals);
            let walker = Walker {
                source,
                locals,
                package_vars: &package_vars,
                max_depth: self.max_depth,
            };
            for call in calls {
                roots.push(walker.namespace(call, 1)?);
            }
        }

        if roots.is_empty() {
            return Err(AppError::Registration(format!(
                "no {} call found in '{}'",
                NEW_NAMESPACE,
                source.path().display()
            )));
        }

        Ok(RegistrationGraph {
            imports: source.declarations().imports,
            roots,
        })
    }
}

impl GraphExtractor for GoGraphExtractor {
    fn extract(&mut self, entry: &Path) -> AppResult<RegistrationGraph> {
        let source = self.parser.parse_file(entry)?;
        self.extract_source(&source)
    }
}

type Assignments<'s> = HashMap<String, Vec<Node<'s>>>;

struct Walker<'s, 'v> {
    source: &'s GoSource,
    locals: Assignments<'s>,
    package_vars: &'v Assignments<'s>,
    max_depth: usize,
}

impl<'s> Walker<'s, '_> {
    fn namespace(&self, call: Node<'s>, depth: usize) -> AppResult<RegistrationNode> {
        if depth > self.max_depth {
            return Err(AppError::Registration(format!(
                "namespace nesting deeper than {} at line {}",
                self.max_depth,
                line_of(call)
            )));
        }

        let args = call_args(call);
        let base_path = args
            .first()
            .filter(|a| matches!(a.kind(), "interpreted_string_literal" | "raw_string_literal"))
            .map(|a| unquote(self.source.node_text(*a)))
            .ok_or_else(|| {
                AppError::Registration(format!(
                    "namespace at line {} must start with a string literal path",
                    line_of(call)
                ))
            })?;

        let mut children = Vec::new();
        for arg in args.iter().skip(1) {
            if arg.kind() != "call_expression" {
                continue;
            }
            match callee_name(self.source, *arg) {
                Some(NS_NAMESPACE) => children.push(self.namespace(*arg, depth + 1)?),
                Some(NS_INCLUDE) => children.push(self.include(*arg)),
                other => debug!(
                    "ignoring namespace option {:?} at line {}",
                    other.unwrap_or("?"),
                    line_of(*arg)
                ),
            }
        }

        Ok(RegistrationNode::Namespace {
            base_path,
            children,
        })
    }

    fn include(&self, call: Node<'s>) -> RegistrationNode {
        let targets = call_args(call)
            .into_iter()
            .map(|operand| self.target(operand, 0))
            .collect();
        RegistrationNode::Include { targets }
    }

    fn target(&self, operand: Node<'s>, hops: usize) -> IncludeTarget {
        let unresolved = |reason: &str| IncludeTarget::Unresolved {
            expression: self.source.node_text(operand).to_string(),
            reason: reason.to_string(),
        };

        match operand.kind() {
            "unary_expression" => {
                let is_address_of = operand
                    .child_by_field_name("operator")
                    .is_some_and(|op| self.source.node_text(op) == "&");
                let literal_type = operand
                    .child_by_field_name("operand")
                    .filter(|o| o.kind() == "composite_literal")
                    .and_then(|lit| lit.child_by_field_name("type"));

                match (is_address_of, literal_type) {
                    (true, Some(ty)) if ty.kind() == "qualified_type" => {
                        let part = |field: &str| {
                            ty.child_by_field_name(field)
                                .map(|n| self.source.node_text(n).to_string())
                                .unwrap_or_default()
                        };
                        IncludeTarget::Controller {
                            package_alias: part("package"),
                            type_name: part("name"),
                        }
                    }
                    (true, Some(_)) => unresolved("controller type is not package-qualified"),
                    _ => unresolved("expected a pointer to a composite literal"),
                }
            }
            "identifier" => {
                if hops >= MAX_ALIAS_HOPS {
                    return unresolved("too many indirections");
                }
                let name = self.source.node_text(operand);
                let values = self
                    .locals
                    .get(name)
                    .or_else(|| self.package_vars.get(name));
                match values.map(Vec::as_slice) {
                    Some([value]) => self.target(*value, hops + 1),
                    Some([]) | None => unresolved("no assignment found"),
                    Some(_) => unresolved("assigned more than once"),
                }
            }
            "parenthesized_expression" => match named_children(operand).first() {
                Some(inner) => self.target(*inner, hops),
                None => unresolved("empty expression"),
            },
            _ => unresolved("Couldn't determine type"),
        }
    }
}

/// Depth-first search for namespace construction calls; does not descend
/// into a match.
fn find_namespace_calls<'s>(source: &'s GoSource, node: Node<'s>, out: &mut Vec<Node<'s>>) {
    if node.kind() == "call_expression" && callee_name(source, node) == Some(NEW_NAMESPACE) {
        out.push(node);
        return;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'s>> = node.named_children(&mut cursor).collect();
    for child in children {
        find_namespace_calls(source, child, out);
    }
}

/// Every `x := expr`, `x = expr` and `var x = expr` beneath `scope`.
fn collect_assignments<'s>(source: &'s GoSource, scope: Node<'s>, out: &mut Assignments<'s>) {
    let mut stack = vec![scope];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "short_var_declaration" | "assignment_statement" => {
                let left = node.child_by_field_name("left").map(named_children);
                let right = node.child_by_field_name("right").map(named_children);
                if let (Some(left), Some(right)) = (left, right) {
                    pair_assignments(source, &left, &right, out);
                }
            }
            "var_spec" => {
                let mut cursor = node.walk();
                let names: Vec<Node<'_>> = node.children_by_field_name("name", &mut cursor).collect();
                if let Some(values) = node.child_by_field_name("value").map(named_children) {
                    pair_assignments(source, &names, &values, out);
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
        // reversed so the stack pops in source order
        stack.extend(children.into_iter().rev());
    }
}

fn pair_assignments<'s>(
    source: &'s GoSource,
    names: &[Node<'s>],
    values: &[Node<'s>],
    out: &mut Assignments<'s>,
) {
    if names.len() != values.len() {
        return;
    }
    for (name, value) in names.iter().zip(values) {
        if name.kind() == "identifier" {
            out.entry(source.node_text(*name).to_string())
                .or_default()
                .push(*value);
        }
    }
}

fn call_args(call: Node<'_>) -> Vec<Node<'_>> {
    call.child_by_field_name("arguments")
        .map(named_children)
        .unwrap_or_default()
}

/// `NewNamespace` for both `beego.NewNamespace(...)` and `NewNamespace(...)`.
fn callee_name<'s>(source: &'s GoSource, call: Node<'_>) -> Option<&'s str> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "selector_expression" => function
            .child_by_field_name("field")
            .map(|f| source.node_text(f)),
        "identifier" => Some(source.node_text(function)),
        _ => None,
    }
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}
