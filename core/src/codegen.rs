#![deny(missing_docs)]

//! # Code Generation
//!
//! Renders the Go validator package from a [`RouteTable`]:
//!
//! - `commentsValidator_routers.go`: one `<Module>Validator` constant per
//!   module and one `GlobalControllerValidator` entry per route.
//! - `<snake_module>_valid.go`: a `<Module>Valid` type with one method per
//!   controller function, each fetching its parameters through the typed
//!   `BeegoInput` getters and marking them required.
//!
//! Output is already laid out the way `gofmt` would print it, so the bodies
//! are byte-stable even when no formatter runs.

use crate::grouper::{group_by_module, ModuleGroup, ModuleMethod};
use crate::models::ParameterDescriptor;
use crate::naming::{go_identifier, module_file_name};
use crate::resolver::RouteTable;
use crate::writer::{GeneratedFile, WritePolicy};
use std::collections::HashSet;
use std::fmt::Write;
use std::path::Path;
use tracing::warn;

/// File holding the route -> validator dispatch table.
pub const DISPATCH_FILE_NAME: &str = "commentsValidator_routers.go";

const FRAMEWORK_IMPORTS: [&str; 2] = [
    "github.com/astaxie/beego/context",
    "github.com/astaxie/beego/validation",
];

/// Names already bound inside every validator method: the receiver, the
/// validation value, the input argument and the two imported packages.
const TEMPLATE_LOCALS: [&str; 5] = ["v", "valid", "input", "context", "validation"];

/// How a parameter is read from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Getter {
    /// `BeegoInput` method name.
    pub method: &'static str,
    /// Whether the getter also returns an error.
    pub fallible: bool,
}

/// Getter for a canonical parameter type; `None` when there is none.
pub fn getter_for(ty: &str) -> Option<Getter> {
    let method = match ty {
        // uint has no dedicated getter on the validator base type
        "int" | "uint" => "GetInt",
        "int64" => "GetInt64",
        "int32" => "GetInt32",
        "int16" => "GetInt16",
        "int8" => "GetInt8",
        "uint64" => "GetUint64",
        "uint32" => "GetUint32",
        "uint16" => "GetUint16",
        "uint8" => "GetUint8",
        "bool" => "GetBool",
        "float64" | "float32" => "GetFloat",
        "string" => "GetString",
        _ => return None,
    };
    Some(Getter {
        method,
        fallible: ty != "string",
    })
}

/// Renders validator sources from a route table.
#[derive(Debug, Clone)]
pub struct CodeSynthesizer {
    validator_suffix: String,
}

impl Default for CodeSynthesizer {
    fn default() -> Self {
        Self::new("Validator")
    }
}

impl CodeSynthesizer {
    /// `validator_suffix` is appended to module names to form the
    /// dispatch constants (`User` -> `UserValidator`).
    pub fn new(validator_suffix: impl Into<String>) -> Self {
        Self {
            validator_suffix: validator_suffix.into(),
        }
    }

    fn validator_const(&self, module: &str) -> String {
        format!("{}{}", module, self.validator_suffix)
    }

    /// All files for `table`, dispatch file first, targeting `output_dir`.
    pub fn synthesize(
        &self,
        table: &RouteTable,
        output_dir: &Path,
        policy: WritePolicy,
    ) -> Vec<GeneratedFile> {
        let mut files = vec![GeneratedFile {
            path: output_dir.join(DISPATCH_FILE_NAME),
            body: self.render_dispatch_file(table),
            policy,
        }];
        for group in group_by_module(table) {
            files.push(GeneratedFile {
                path: output_dir.join(module_file_name(group.module)),
                body: self.render_module_file(&group),
                policy,
            });
        }
        files
    }

    /// The dispatch file.
    pub fn render_dispatch_file(&self, table: &RouteTable) -> String {
        let constants: Vec<String> = group_by_module(table)
            .iter()
            .map(|g| self.validator_const(g.module))
            .collect();
        let width = constants.iter().map(String::len).max().unwrap_or(0);

        let mut out = String::from("package validator\n\nconst (\n");
        for name in &constants {
            let _ = writeln!(out, "\t{:<width$} = \"{}\"", name, name, width = width);
        }
        out.push_str(")\n\nfunc init() {\n");
        for (path, entry) in table.iter() {
            let _ = write!(
                out,
                "\tGlobalControllerValidator[\"{}\"] = ValidComments{{\n\t\tValidator: {},\n\t\tMethod:    \"{}\",\n\t}}\n",
                path,
                self.validator_const(&entry.module),
                entry.function
            );
        }
        out.push_str("}\n");
        out
    }

    /// The validator file of one module.
    pub fn render_module_file(&self, group: &ModuleGroup<'_>) -> String {
        let module = group.module;
        let mut out = String::from("package validator\n\nimport (\n");
        for import in FRAMEWORK_IMPORTS {
            let _ = writeln!(out, "\t\"{}\"", import);
        }
        let _ = write!(
            out,
            ")\n\ntype {m}Valid struct {{\n\tValidator\n}}\n\nfunc New{m}Valid() IValidator {{\n\treturn &{m}Valid{{}}\n}}\n",
            m = module
        );
        for method in group.methods() {
            out.push('\n');
            out.push_str(&render_method(module, &method));
        }
        let _ = write!(
            out,
            "\nfunc init() {{\n\tRegister({}, New{}Valid)\n}}\n",
            self.validator_const(module),
            module
        );
        out
    }
}

/// One validator method.
fn render_method(module: &str, method: &ModuleMethod<'_>) -> String {
    let mut out = format!(
        "func (v {}Valid) {}(input *context.BeegoInput) {{\n\tvalid := validation.Validation{{}}\n\tv.Input = input\n",
        module, method.function
    );
    let mut locals: HashSet<String> = TEMPLATE_LOCALS.iter().map(|l| l.to_string()).collect();
    for param in method.parameters {
        if let Some(getter) = getter_for(&param.ty) {
            let var = unique_local(&mut locals, &param.name);
            out.push_str(&parameter_rule(param, getter, &var));
        } else {
            warn!(
                "{}Valid.{}: no getter for parameter '{}' of type '{}', skipped",
                module, method.function, param.name, param.ty
            );
        }
    }
    out.push_str("\tv.ErrorHandle(valid)\n}\n");
    out
}

/// A variable name for `param_name` not yet bound in the method; taken
/// names get a numeric suffix.
fn unique_local(locals: &mut HashSet<String>, param_name: &str) -> String {
    let base = match go_identifier(param_name) {
        ident if TEMPLATE_LOCALS.contains(&ident.as_str()) => format!("{}Param", ident),
        ident => ident,
    };
    let mut var = base.clone();
    let mut n = 2;
    while !locals.insert(var.clone()) {
        var = format!("{}{}", base, n);
        n += 1;
    }
    var
}

fn parameter_rule(param: &ParameterDescriptor, getter: Getter, var: &str) -> String {
    let binding = if getter.fallible {
        format!("{}, _", var)
    } else {
        var.to_string()
    };
    let key = param.name.replace('\\', "\\\\").replace('"', "\\\"");
    format!(
        "\t{} := v.{}(\"{}\")\n\tvalid.Required({}, \"{}\")\n",
        binding, getter.method, key, var, key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, Operation, PathItem};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn param(name: &str, ty: &str) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.into(),
            location: "query".into(),
            ty: ty.into(),
            required: true,
            ..Default::default()
        }
    }

    fn item(method: HttpMethod, function: &str, params: Vec<ParameterDescriptor>) -> PathItem {
        let mut item = PathItem::default();
        item.set(
            method,
            Operation {
                function: function.into(),
                parameters: params,
            },
        );
        item
    }

    fn table() -> RouteTable {
        let mut table = RouteTable::default();
        table.insert(
            "/v1/user/{id}".into(),
            &item(HttpMethod::Get, "Get", vec![param("id", "int")]),
            "User",
            "Get",
        );
        table.insert(
            "/v1/order".into(),
            &item(HttpMethod::Get, "List", vec![]),
            "Order",
            "List",
        );
        table.insert(
            "/v1/user".into(),
            &item(
                HttpMethod::Post,
                "Post",
                vec![param("user_name", "string"), param("blob", "file")],
            ),
            "User",
            "Post",
        );
        table
    }

    #[test]
    fn test_getter_dispatch() {
        assert_eq!(getter_for("int").unwrap().method, "GetInt");
        assert_eq!(getter_for("uint").unwrap().method, "GetInt");
        assert_eq!(getter_for("uint16").unwrap().method, "GetUint16");
        assert_eq!(getter_for("float32").unwrap().method, "GetFloat");
        assert!(!getter_for("string").unwrap().fallible);
        assert!(getter_for("bool").unwrap().fallible);
        assert_eq!(getter_for("array"), None);
        assert_eq!(getter_for(""), None);
    }

    #[test]
    fn test_render_dispatch_file() {
        let body = CodeSynthesizer::default().render_dispatch_file(&table());
        let expected = r#"package validator

const (
	UserValidator  = "UserValidator"
	OrderValidator = "OrderValidator"
)

func init() {
	GlobalControllerValidator["/v1/user/{id}"] = ValidComments{
		Validator: UserValidator,
		Method:    "Get",
	}
	GlobalControllerValidator["/v1/order"] = ValidComments{
		Validator: OrderValidator,
		Method:    "List",
	}
	GlobalControllerValidator["/v1/user"] = ValidComments{
		Validator: UserValidator,
		Method:    "Post",
	}
}
"#;
        assert_eq!(body, expected);
    }

    #[test]
    fn test_render_module_file() {
        let table = table();
        let groups = group_by_module(&table);
        let body = CodeSynthesizer::default().render_module_file(&groups[0]);
        let expected = r#"package validator

import (
	"github.com/astaxie/beego/context"
	"github.com/astaxie/beego/validation"
)

type UserValid struct {
	Validator
}

func NewUserValid() IValidator {
	return &UserValid{}
}

func (v UserValid) Get(input *context.BeegoInput) {
	valid := validation.Validation{}
	v.Input = input
	id, _ := v.GetInt("id")
	valid.Required(id, "id")
	v.ErrorHandle(valid)
}

func (v UserValid) Post(input *context.BeegoInput) {
	valid := validation.Validation{}
	v.Input = input
	userName := v.GetString("user_name")
	valid.Required(userName, "user_name")
	v.ErrorHandle(valid)
}

func init() {
	Register(UserValidator, NewUserValid)
}
"#;
        assert_eq!(body, expected);
    }

    #[test]
    fn test_parameter_names_become_valid_locals() {
        let mut table = RouteTable::default();
        table.insert(
            "/v1/session".into(),
            &item(
                HttpMethod::Post,
                "Login",
                vec![
                    ParameterDescriptor {
                        location: "header".into(),
                        ..param("X-Token", "string")
                    },
                    param("type", "string"),
                    param("valid", "bool"),
                    param("input", "int"),
                    param("user_name", "string"),
                    param("userName", "string"),
                ],
            ),
            "Session",
            "Login",
        );
        let groups = group_by_module(&table);
        let body = CodeSynthesizer::default().render_module_file(&groups[0]);
        let expected = r#"func (v SessionValid) Login(input *context.BeegoInput) {
	valid := validation.Validation{}
	v.Input = input
	xToken := v.GetString("X-Token")
	valid.Required(xToken, "X-Token")
	typeParam := v.GetString("type")
	valid.Required(typeParam, "type")
	validParam, _ := v.GetBool("valid")
	valid.Required(validParam, "valid")
	inputParam, _ := v.GetInt("input")
	valid.Required(inputParam, "input")
	userName := v.GetString("user_name")
	valid.Required(userName, "user_name")
	userName2 := v.GetString("userName")
	valid.Required(userName2, "userName")
	v.ErrorHandle(valid)
}
"#;
        assert!(body.contains(expected), "{}", body);
    }

    #[test]
    fn test_synthesize_file_set() {
        let files = CodeSynthesizer::new("Checker").synthesize(
            &table(),
            Path::new("controllers/validator"),
            WritePolicy::Overwrite,
        );
        let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("controllers/validator/commentsValidator_routers.go"),
                PathBuf::from("controllers/validator/user_valid.go"),
                PathBuf::from("controllers/validator/order_valid.go"),
            ]
        );
        assert!(files[0].body.contains("UserChecker  = \"UserChecker\""));
        assert!(files[1].body.contains("Register(UserChecker, NewUserValid)"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let synth = CodeSynthesizer::default();
        let a = synth.synthesize(&table(), Path::new("out"), WritePolicy::Overwrite);
        let b = synth.synthesize(&table(), Path::new("out"), WritePolicy::Overwrite);
        assert_eq!(a, b);
    }
}
