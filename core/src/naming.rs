#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Derives Go identifiers and file names for generated validators from
//! controller type names and parameter names.

use heck::ToSnakeCase;

/// Splits on `_` and upper-cases the first letter of each token.
///
/// Existing capitals are kept, so acronyms survive: `user_ID` -> `UserID`.
pub fn camel_case(s: &str) -> String {
    s.split('_')
        .map(|token| {
            let token = token.trim_matches(' ');
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// [`camel_case`] with the first character lower-cased; used for local
/// variable names in generated code.
pub fn lower_camel_case(s: &str) -> String {
    let camel = camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => camel,
    }
}

/// Go keywords; none of them may name a local variable.
const GO_KEYWORDS: [&str; 25] = [
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough",
    "for", "func", "go", "goto", "if", "import", "interface", "map", "package", "range",
    "return", "select", "struct", "switch", "type", "var",
];

/// Local variable name for a request parameter.
///
/// Every run of characters that cannot appear in a Go identifier acts as a
/// word break, the words are camel-cased, and names that would still not
/// compile get a `Param` suffix (keywords) or a `p` prefix (leading digit).
///
/// e.g. `X-Token` -> `xToken`, `page.size` -> `pageSize`, `type` -> `typeParam`
pub fn go_identifier(name: &str) -> String {
    let words = name.replace(|c: char| !(c.is_alphanumeric() || c == '_'), "_");
    let ident = lower_camel_case(&words);
    match ident.chars().next() {
        None => "param".to_string(),
        Some(first) if first.is_ascii_digit() => format!("p{}", ident),
        Some(_) if GO_KEYWORDS.contains(&ident.as_str()) => format!("{}Param", ident),
        Some(_) => ident,
    }
}

/// Module name of a controller type: the type name minus `suffix`,
/// camel-cased.
///
/// e.g. `UserController` -> `User`, `order_itemController` -> `OrderItem`
pub fn module_name(type_name: &str, suffix: &str) -> String {
    camel_case(type_name.strip_suffix(suffix).unwrap_or(type_name))
}

/// File name of a module's validator source: `UserAdmin` -> `user_admin_valid.go`.
pub fn module_file_name(module: &str) -> String {
    format!("{}_valid.go", module.to_snake_case())
}
