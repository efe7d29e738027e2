//! # Analysis Models
//!
//! Intermediate representation shared by the catalog, the resolver and the
//! code synthesizer.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Canonical type name used for slice parameters.
pub const ARRAY_TYPE: &str = "array";

/// HTTP verbs accepted by `@router` tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// All verbs, in the order used as a fallback when picking an operation.
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown HTTP method '{}'", s))
    }
}

/// A `@Param` default after coercion to the parameter's canonical type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Signed integer family.
    Int(i64),
    /// Unsigned integer family.
    Uint(u64),
    /// `bool`.
    Bool(bool),
    /// `float32` / `float64`.
    Float(f64),
    /// Anything else, or a value that failed coercion.
    Str(String),
}

/// One request parameter of an operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParameterDescriptor {
    /// Name as seen by the HTTP layer.
    pub name: String,
    /// `path`, `query`, `body`, `header`, `formData`, ...
    #[serde(rename = "in")]
    pub location: String,
    /// Canonical scalar kind, `array`, or empty when unknown.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub ty: String,
    /// Canonical element kind of an `array` parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<String>,
    /// Qualified Go type named by the annotation (e.g. `models.User`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Whether the request must carry this parameter.
    pub required: bool,
    /// Default value, when the 6-field form was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Free text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// The parameters of one documented controller method.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Operation {
    /// The Go method that handles the request.
    pub function: String,
    /// Explicit `@Param` descriptors first, then synthesized ones.
    pub parameters: Vec<ParameterDescriptor>,
}

/// Operations of one path, keyed by verb.
///
/// Verbs are a partial map: assigning one verb never touches the others.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct PathItem {
    operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// Sets (or replaces) the operation for one verb.
    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        self.operations.insert(method, operation);
    }

    /// Operation bound to `method`, if any.
    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Copies every verb of `other` over this item.
    pub fn merge(&mut self, other: &PathItem) {
        for (method, operation) in &other.operations {
            self.operations.insert(*method, operation.clone());
        }
    }

    /// Iterates over (verb, operation) in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&HttpMethod, &Operation)> {
        self.operations.iter()
    }

    /// The verbs present on this item.
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.operations.keys().copied().collect()
    }

    /// True when no verb is bound.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Picks the operation a validator stub should be generated from.
    ///
    /// Prefers the operation produced by `function`, then GET, then POST,
    /// then the remaining verbs.
    pub fn operation_for(&self, function: &str) -> Option<&Operation> {
        self.operations
            .values()
            .find(|op| op.function == function)
            .or_else(|| HttpMethod::ALL.iter().find_map(|m| self.get(*m)))
    }
}

/// Fully qualified controller identity: Go import path plus receiver type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ControllerKey {
    /// Import path of the package declaring the controller.
    pub package: String,
    /// Receiver type name (e.g. `UserController`).
    pub type_name: String,
}

impl ControllerKey {
    /// Builds a key from its parts.
    pub fn new(package: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for ControllerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(function: &str) -> Operation {
        Operation {
            function: function.into(),
            parameters: vec![],
        }
    }

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!(" Delete ".parse::<HttpMethod>(), Ok(HttpMethod::Delete));
        assert!("ANY".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_merge_overwrites_only_shared_verbs() {
        let mut item = PathItem::default();
        item.set(HttpMethod::Get, op("Get"));
        item.set(HttpMethod::Post, op("Create"));

        let mut later = PathItem::default();
        later.set(HttpMethod::Post, op("CreateV2"));
        item.merge(&later);

        assert_eq!(item.get(HttpMethod::Get).unwrap().function, "Get");
        assert_eq!(item.get(HttpMethod::Post).unwrap().function, "CreateV2");
    }

    #[test]
    fn test_operation_for_prefers_matching_function() {
        let mut item = PathItem::default();
        item.set(HttpMethod::Get, op("List"));
        item.set(HttpMethod::Put, op("Update"));

        assert_eq!(item.operation_for("Update").unwrap().function, "Update");
        assert_eq!(item.operation_for("Missing").unwrap().function, "List");
    }

    #[test]
    fn test_default_value_serializes_untagged() {
        let json = serde_json::to_string(&DefaultValue::Int(10)).unwrap();
        assert_eq!(json, "10");
        let json = serde_json::to_string(&DefaultValue::Str("abc".into())).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
