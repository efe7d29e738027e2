#![deny(missing_docs)]

//! # Go Syntax Front End
//!
//! Parses Go source with the tree-sitter Go grammar and exposes the small
//! declaration tree the analysis needs: imports and method
//! declarations with their receiver, formal parameters and doc comment.
//!
//! Nothing here knows about beego; the registration graph walk lives in
//! `graph.rs` and works on the raw tree through [`GoSource::root`].

use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// One `import` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    /// Explicit local name (`_` and `.` included), if any.
    pub name: Option<String>,
    /// Import path without quotes.
    pub path: String,
}

/// One formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncParam {
    /// Declared name, or its positional index when unnamed.
    pub name: String,
    /// Flattened type: `int`, `[]string`, `time.Time`; pointers are dropped
    /// and anything more complex is empty.
    pub ty: String,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMethod {
    /// Method name.
    pub name: String,
    /// Receiver type name when the receiver is a pointer to a named type.
    pub pointer_receiver: Option<String>,
    /// Formal parameters in declaration order.
    pub params: Vec<FuncParam>,
    /// Raw comment texts of the doc comment group, top to bottom.
    pub doc: Vec<String>,
    /// 1-based line of the declaration.
    pub line: usize,
}

/// Declarations of one Go file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GoFile {
    /// Imports in source order.
    pub imports: Vec<GoImport>,
    /// Method declarations in source order.
    pub methods: Vec<GoMethod>,
}

/// A parsed Go file: its text plus the concrete syntax tree.
pub struct GoSource {
    path: PathBuf,
    text: String,
    tree: Tree,
}

/// Reusable tree-sitter parser configured for Go.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Creates a parser with the Go grammar loaded.
    pub fn new() -> AppResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| AppError::General(format!("Failed to load Go grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Reads and parses a file from disk.
    pub fn parse_file(&mut self, path: &Path) -> AppResult<GoSource> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::parse(path, format!("unable to read file: {}", e)))?;
        self.parse_source(path, text)
    }

    /// Parses in-memory source; `path` is only used for diagnostics.
    ///
    /// Any syntax error in the file is fatal.
    pub fn parse_source(&mut self, path: &Path, text: String) -> AppResult<GoSource> {
        let tree = self
            .parser
            .parse(&text, None)
            .ok_or_else(|| AppError::parse(path, "parser produced no tree"))?;

        if let Some(bad) = first_error(tree.root_node()) {
            let pos = bad.start_position();
            let what = if bad.is_missing() {
                format!("missing `{}`", bad.kind())
            } else {
                "unexpected syntax".to_string()
            };
            return Err(AppError::parse(
                path,
                format!("{} at {}:{}", what, pos.row + 1, pos.column + 1),
            ));
        }

        Ok(GoSource {
            path: path.to_path_buf(),
            text,
            tree,
        })
    }
}

impl GoSource {
    /// Path the source was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root `source_file` node.
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node_text(node, &self.text)
    }

    /// Extracts the declaration tree.
    pub fn declarations(&self) -> GoFile {
        let mut file = GoFile::default();
        for node in named_children(self.root()) {
            match node.kind() {
                "import_declaration" => self.collect_imports(node, &mut file.imports),
                "method_declaration" => file.methods.push(self.method(node)),
                _ => {}
            }
        }
        file
    }

    fn collect_imports(&self, node: Node<'_>, out: &mut Vec<GoImport>) {
        for child in named_children(node) {
            match child.kind() {
                "import_spec" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.node_text(n).to_string());
                    let path = child
                        .child_by_field_name("path")
                        .map(|p| unquote(self.node_text(p)))
                        .unwrap_or_default();
                    out.push(GoImport { name, path });
                }
                "import_spec_list" => self.collect_imports(child, out),
                _ => {}
            }
        }
    }

    fn method(&self, node: Node<'_>) -> GoMethod {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.node_text(n).to_string())
            .unwrap_or_default();

        let pointer_receiver = node
            .child_by_field_name("receiver")
            .and_then(|list| {
                named_children(list)
                    .into_iter()
                    .find(|c| c.kind() == "parameter_declaration")
            })
            .and_then(|decl| decl.child_by_field_name("type"))
            .filter(|ty| ty.kind() == "pointer_type")
            .and_then(|ptr| named_children(ptr).into_iter().next())
            .filter(|inner| inner.kind() == "type_identifier")
            .map(|inner| self.node_text(inner).to_string());

        let params = node
            .child_by_field_name("parameters")
            .map(|list| self.params(list))
            .unwrap_or_default();

        GoMethod {
            name,
            pointer_receiver,
            params,
            doc: self.doc_comments(node),
            line: node.start_position().row + 1,
        }
    }

    fn params(&self, list: Node<'_>) -> Vec<FuncParam> {
        let mut params = Vec::new();
        let mut unnamed = 0usize;

        for decl in named_children(list) {
            let ty = match decl.kind() {
                "parameter_declaration" => decl
                    .child_by_field_name("type")
                    .map(|t| self.type_string(t))
                    .unwrap_or_default(),
                // variadic parameters carry no usable type
                "variadic_parameter_declaration" => String::new(),
                _ => continue,
            };

            let mut cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut cursor)
                .map(|n| self.node_text(n).to_string())
                .collect();

            if names.is_empty() {
                params.push(FuncParam {
                    name: unnamed.to_string(),
                    ty,
                });
                unnamed += 1;
            } else {
                for name in names {
                    params.push(FuncParam {
                        name,
                        ty: ty.clone(),
                    });
                }
            }
        }

        params
    }

    /// Flattens a type node the way parameter types are compared against
    /// annotation types.
    fn type_string(&self, node: Node<'_>) -> String {
        match node.kind() {
            "type_identifier" | "identifier" | "package_identifier" => {
                self.node_text(node).to_string()
            }
            "slice_type" | "array_type" | "implicit_length_array_type" => node
                .child_by_field_name("element")
                .map(|e| format!("[]{}", self.type_string(e)))
                .unwrap_or_default(),
            "pointer_type" | "parenthesized_type" => named_children(node)
                .into_iter()
                .next()
                .map(|inner| self.type_string(inner))
                .unwrap_or_default(),
            "qualified_type" => {
                let pkg = node
                    .child_by_field_name("package")
                    .map(|p| self.node_text(p))
                    .unwrap_or_default();
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n))
                    .unwrap_or_default();
                format!("{}.{}", pkg, name)
            }
            _ => String::new(),
        }
    }

    /// The comment group that ends on the line right above `node`.
    fn doc_comments(&self, node: Node<'_>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut expected_end = node.start_position().row;
        let mut current = node.prev_sibling();

        while let Some(prev) = current {
            if prev.kind() != "comment" || prev.end_position().row + 1 != expected_end {
                break;
            }
            lines.push(self.node_text(prev).to_string());
            expected_end = prev.start_position().row;
            current = prev.prev_sibling();
        }

        lines.reverse();
        lines
    }
}

/// Named children of `node`, comments excluded.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

pub(crate) fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or("")
}

/// Strips the delimiters of an interpreted or raw string literal.
pub(crate) fn unquote(literal: &str) -> String {
    literal
        .trim()
        .trim_matches(|c| c == '"' || c == '`')
        .to_string()
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> GoFile {
        let mut parser = GoParser::new().unwrap();
        parser
            .parse_source(Path::new("test.go"), code.to_string())
            .unwrap()
            .declarations()
    }

    #[test]
    fn test_imports_with_aliases() {
        let file = parse(
            r#"
package routers

import (
	"github.com/astaxie/beego"
	ctl "myapp/controllers"
	_ "myapp/docs"
)
"#,
        );
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.imports[0].name, None);
        assert_eq!(file.imports[0].path, "github.com/astaxie/beego");
        assert_eq!(file.imports[1].name.as_deref(), Some("ctl"));
        assert_eq!(file.imports[2].name.as_deref(), Some("_"));
    }

    #[test]
    fn test_single_import_without_parens() {
        let file = parse("package main\n\nimport \"fmt\"\n");
        assert_eq!(file.imports.len(), 1);
        assert_eq!(file.imports[0].path, "fmt");
    }

    #[test]
    fn test_method_receiver_params_and_doc() {
        let file = parse(
            r#"
package controllers

// unrelated comment

// Get fetches a user
// @router /:id [get]
func (c *UserController) Get(id int, tags []string, at *time.Time, a, b string) {
}

func (c UserController) ByValue() {}
"#,
        );
        assert_eq!(file.methods.len(), 2);
        let get = &file.methods[0];
        assert_eq!(get.name, "Get");
        assert_eq!(get.pointer_receiver.as_deref(), Some("UserController"));
        assert_eq!(
            get.doc,
            vec!["// Get fetches a user".to_string(), "// @router /:id [get]".to_string()]
        );
        let params: Vec<(&str, &str)> = get
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.ty.as_str()))
            .collect();
        assert_eq!(
            params,
            vec![
                ("id", "int"),
                ("tags", "[]string"),
                ("at", "time.Time"),
                ("a", "string"),
                ("b", "string"),
            ]
        );

        assert_eq!(file.methods[1].pointer_receiver, None);
        assert!(file.methods[1].doc.is_empty());
    }

    #[test]
    fn test_doc_requires_adjacent_comment() {
        let file = parse(
            r#"
package controllers

// @router /detached [get]

func (c *UserController) Detached() {}
"#,
        );
        assert!(file.methods[0].doc.is_empty());
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let mut parser = GoParser::new().unwrap();
        let res = parser.parse_source(Path::new("broken.go"), "package x\nfunc (".to_string());
        match res {
            Err(AppError::Parse { path, .. }) => assert_eq!(path, PathBuf::from("broken.go")),
            _ => panic!("expected parse error"),
        }
    }
}
