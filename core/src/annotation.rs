#![deny(missing_docs)]

//! # Annotation Parser
//!
//! Reads the `@router` and `@Param` tags of a controller method's doc comment
//! and reconciles them with the method's formal parameters.
//!
//! ```text
//! // @Param   id=>userId  path  int     true       "The user id"
//! // @Param   page        query int     1   false  "Page number"
//! // @router  /user/:id [get,post]
//! ```

use crate::error::{AppError, AppResult};
use crate::models::{DefaultValue, HttpMethod, ParameterDescriptor, ARRAY_TYPE};
use crate::syntax::FuncParam;
use crate::type_table::TypeTable;
use indexmap::IndexMap;
use tracing::{debug, warn};

const ROUTER_TAG: &str = "@router";
const PARAM_TAG: &str = "@Param";
const AUTO_TYPE: &str = "auto";

/// What one doc comment block declares.
#[derive(Debug, Clone, PartialEq)]
pub struct DocAnnotation {
    /// Route path exactly as written in `@router`.
    pub path: String,
    /// Verbs from the bracket list, `GET` when absent.
    pub methods: Vec<HttpMethod>,
    /// Explicit `@Param` descriptors, then synthesized ones.
    pub parameters: Vec<ParameterDescriptor>,
}

/// Parser for the doc comment grammar.
pub struct AnnotationParser<'a> {
    types: &'a TypeTable,
}

impl<'a> AnnotationParser<'a> {
    /// Creates a parser resolving types through `types`.
    pub fn new(types: &'a TypeTable) -> Self {
        Self { types }
    }

    /// Parses `doc` (raw comment texts) of `controller.function`.
    ///
    /// Returns `Ok(None)` when the block has no `@router` tag.
    ///
    /// # Errors
    ///
    /// An empty `@router` tag or a `@Param` tag with fewer than four fields.
    pub fn parse(
        &self,
        controller: &str,
        function: &str,
        doc: &[String],
        params: &[FuncParam],
    ) -> AppResult<Option<DocAnnotation>> {
        let mut pending: IndexMap<String, String> = params
            .iter()
            .map(|p| (p.name.clone(), p.ty.clone()))
            .collect();
        let mut router: Option<(String, Vec<HttpMethod>)> = None;
        let mut parameters = Vec::new();

        for line in doc.iter().flat_map(|c| comment_lines(c)) {
            if let Some(rest) = tag_body(&line, ROUTER_TAG) {
                router = Some(self.parse_router(controller, function, rest)?);
            } else if let Some(rest) = tag_body(&line, PARAM_TAG) {
                parameters.push(self.parse_param(controller, function, rest, &mut pending)?);
            }
        }

        let Some((path, methods)) = router else {
            return Ok(None);
        };

        // Formal parameters no tag mentioned
        for (name, ty) in pending {
            let mut desc = ParameterDescriptor {
                location: if param_in_path(&name, &path) {
                    "path".into()
                } else {
                    "query".into()
                },
                name,
                ..Default::default()
            };
            self.apply_type(&mut desc, &ty);
            parameters.push(desc);
        }

        Ok(Some(DocAnnotation {
            path,
            methods,
            parameters,
        }))
    }

    fn parse_router(
        &self,
        controller: &str,
        function: &str,
        rest: &str,
    ) -> AppResult<(String, Vec<HttpMethod>)> {
        let mut tokens = rest.splitn(2, char::is_whitespace);
        let path = tokens
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                AppError::annotation(controller, function, "@router should have router information")
            })?
            .to_string();

        let remainder = tokens.next().unwrap_or("").trim();
        let methods = match remainder.strip_prefix('[') {
            Some(list) => {
                let list = list.split(']').next().unwrap_or("");
                let mut methods = Vec::new();
                for verb in list.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                    match verb.parse::<HttpMethod>() {
                        Ok(m) if !methods.contains(&m) => methods.push(m),
                        Ok(_) => {}
                        Err(e) => warn!("{}_{}: {}, ignored", controller, function, e),
                    }
                }
                if methods.is_empty() {
                    warn!(
                        "{}_{}: @router {} names no usable HTTP method",
                        controller, function, path
                    );
                }
                methods
            }
            None => vec![HttpMethod::Get],
        };

        Ok((path, methods))
    }

    fn parse_param(
        &self,
        controller: &str,
        function: &str,
        rest: &str,
        pending: &mut IndexMap<String, String>,
    ) -> AppResult<ParameterDescriptor> {
        let fields = split_fields(rest);
        if fields.len() < 4 {
            return Err(AppError::annotation(
                controller,
                function,
                "comments @Param should have at least 4 params",
            ));
        }

        let (name, target) = fields[0]
            .split_once("=>")
            .unwrap_or((fields[0].as_str(), fields[0].as_str()));
        let func_type = pending.shift_remove(target);

        let mut desc = ParameterDescriptor {
            name: name.to_string(),
            location: fields[1].clone(),
            ..Default::default()
        };

        let type_token = fields[2].as_str();
        if type_token.contains('.') {
            let element = type_token.strip_prefix("[]");
            desc.schema = Some(element.unwrap_or(type_token).to_string());
            if element.is_some() {
                desc.ty = ARRAY_TYPE.to_string();
            }
        } else if type_token == AUTO_TYPE {
            match func_type {
                Some(ty) => self.apply_type(&mut desc, &ty),
                None => warn!(
                    "{}_{}: @Param {} uses auto type but no function parameter '{}' is left",
                    controller, function, name, target
                ),
            }
        } else {
            self.apply_type(&mut desc, type_token);
        }

        match fields.len() {
            5 => {
                desc.required = parse_go_bool(&fields[3]).unwrap_or(false);
                desc.description = trim_description(&fields[4]);
            }
            6 => {
                desc.default = Some(coerce_default(&fields[3], &desc.ty));
                desc.required = parse_go_bool(&fields[4]).unwrap_or(false);
                desc.description = trim_description(&fields[5]);
            }
            n => {
                if n > 6 {
                    debug!(
                        "{}_{}: @Param {} has {} fields, reading the 4th as description",
                        controller, function, name, n
                    );
                }
                desc.description = trim_description(&fields[3]);
            }
        }

        Ok(desc)
    }

    /// Resolves a Go type string into the descriptor's canonical type.
    fn apply_type(&self, desc: &mut ParameterDescriptor, ty: &str) {
        let (element, is_array) = match ty.strip_prefix("[]") {
            Some(element) => (element, true),
            None => (ty, false),
        };

        let kind = self.types.resolve(element).map(str::to_string);
        if kind.is_none() {
            warn!("unknown type '{}' for parameter '{}'", ty, desc.name);
            if element.contains('.') {
                desc.schema = Some(element.to_string());
            }
        }

        if is_array {
            desc.ty = ARRAY_TYPE.to_string();
            desc.items = kind;
        } else {
            desc.ty = kind.unwrap_or_default();
        }
    }
}

/// Returns the text after `tag` when `line` starts with that exact tag.
fn tag_body<'l>(line: &'l str, tag: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(tag)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Splits a comment into trimmed content lines.
fn comment_lines(comment: &str) -> Vec<String> {
    let comment = comment.trim();
    if let Some(line) = comment.strip_prefix("//") {
        return vec![line.trim().to_string()];
    }
    if let Some(block) = comment.strip_prefix("/*") {
        let block = block.strip_suffix("*/").unwrap_or(block);
        return block
            .lines()
            .map(|l| l.trim().trim_start_matches('*').trim().to_string())
            .collect();
    }
    vec![comment.to_string()]
}

/// Tokenizes a `@Param` body on whitespace; double-quoted spans stay whole
/// and lose their quotes.
///
/// ```
/// use validgen_core::annotation::split_fields;
///
/// let fields = split_fields(r#"email  form  string  true  "The email for login""#);
/// assert_eq!(fields, vec!["email", "form", "string", "true", "The email for login"]);
/// ```
pub fn split_fields(input: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut quoted = false;

    for c in input.chars() {
        if c.is_whitespace() && !quoted {
            if started {
                fields.push(std::mem::take(&mut current));
                started = false;
            }
            continue;
        }
        started = true;
        if c == '"' {
            quoted = !quoted;
            continue;
        }
        current.push(c);
    }
    if started {
        fields.push(current);
    }

    fields
}

fn trim_description(raw: &str) -> String {
    raw.trim_matches(|c| c == '"' || c == ' ').to_string()
}

/// True when `route` has a named segment for `name`
/// (`:name`, `?:name`, `:name(regex)` or `:name:type`).
pub fn param_in_path(name: &str, route: &str) -> bool {
    route.split('/').any(|segment| {
        let segment = segment.strip_prefix('?').unwrap_or(segment);
        match segment.strip_prefix(':').and_then(|s| s.strip_prefix(name)) {
            Some(rest) => rest.is_empty() || rest.starts_with('(') || rest.starts_with(':'),
            None => false,
        }
    })
}

/// Go `strconv.ParseBool`.
pub fn parse_go_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Converts a default token to the parameter's canonical kind.
///
/// Failed conversions are logged and keep the raw string.
pub fn coerce_default(raw: &str, ty: &str) -> DefaultValue {
    let converted = match ty {
        "int" | "int64" | "int32" | "int16" | "int8" => raw.parse::<i64>().ok().map(DefaultValue::Int),
        "uint" | "uint64" | "uint32" | "uint16" | "uint8" => {
            raw.parse::<u64>().ok().map(DefaultValue::Uint)
        }
        "bool" => parse_go_bool(raw).map(DefaultValue::Bool),
        "float64" => raw.parse::<f64>().ok().map(DefaultValue::Float),
        "float32" => raw
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_finite() || v.abs() <= f32::MAX as f64)
            .map(DefaultValue::Float),
        _ => return DefaultValue::Str(raw.to_string()),
    };

    converted.unwrap_or_else(|| {
        warn!("Invalid default value type '{}': {}", ty, raw);
        DefaultValue::Str(raw.to_string())
    })
}
