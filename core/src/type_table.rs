#![deny(missing_docs)]

//! # Basic Type Table
//!
//! Maps Go primitive and alias type names (and a few annotation spellings such
//! as `integer` or `boolean`) to the canonical scalar kinds used by parameter
//! descriptors and the getter dispatch.
//!
//! The table is data: the built-in entries can be extended or overridden from
//! configuration.

use indexmap::IndexMap;

/// Built-in `{typeName: canonicalKind}` entries.
const BUILTIN: &[(&str, &str)] = &[
    ("bool", "bool"),
    ("uint", "uint"),
    ("uint8", "uint8"),
    ("uint16", "uint16"),
    ("uint32", "uint32"),
    ("uint64", "uint64"),
    ("int", "int"),
    ("int8", "int8"),
    ("int16", "int16"),
    ("int32", "int32"),
    ("int64", "int64"),
    ("uintptr", "int64"),
    ("float32", "float32"),
    ("float64", "float64"),
    ("string", "string"),
    ("complex64", "float"),
    ("complex128", "double"),
    ("byte", "byte"),
    ("rune", "byte"),
    // builtin golang objects
    ("time.Time", "string"),
    ("json.RawMessage", "object"),
    // annotation spellings
    ("integer", "int"),
    ("boolean", "bool"),
    ("number", "int"),
    ("float", "float32"),
    ("double", "float64"),
];

/// Lookup from source type names to canonical kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTable {
    entries: IndexMap<String, String>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl TypeTable {
    /// The built-in table with `overrides` applied on top.
    pub fn with_overrides<'a, I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut table = Self::default();
        for (name, kind) in overrides {
            table.entries.insert(name.clone(), kind.clone());
        }
        table
    }

    /// Canonical kind for `type_name`, if known.
    pub fn resolve(&self, type_name: &str) -> Option<&str> {
        self.entries.get(type_name).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
