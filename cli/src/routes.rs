#![deny(missing_docs)]

//! # Routes Command
//!
//! Prints the resolved route table without generating anything.

use crate::common::ProjectArgs;
use crate::error::CliResult;
use std::io::Write;
use validgen_core::{resolve_routes, RouteTable};

/// Output encoding.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteFormat {
    /// YAML document.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Arguments for the routes command.
#[derive(clap::Args, Debug, Clone)]
pub struct RoutesArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,

    /// Output encoding.
    #[clap(long, value_enum, default_value_t = RouteFormat::Yaml)]
    pub format: RouteFormat,
}

/// Encodes a route table.
pub fn render(table: &RouteTable, format: RouteFormat) -> CliResult<String> {
    Ok(match format {
        RouteFormat::Yaml => serde_yaml::to_string(table)?,
        RouteFormat::Json => serde_json::to_string_pretty(table)? + "\n",
    })
}

/// Executes the routes command, writing to `out`.
pub fn execute(args: &RoutesArgs, out: &mut impl Write) -> CliResult<()> {
    let config = args.project.load_config()?;
    let table = resolve_routes(&config)?;
    out.write_all(render(&table, args.format)?.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validgen_core::models::{HttpMethod, Operation, PathItem};

    fn table() -> RouteTable {
        let mut item = PathItem::default();
        item.set(
            HttpMethod::Get,
            Operation {
                function: "Get".into(),
                parameters: vec![],
            },
        );
        let mut table = RouteTable {
            base_path: Some("/v1".into()),
            ..Default::default()
        };
        table.insert("/v1/user/{id}".into(), &item, "User", "Get");
        table
    }

    #[test]
    fn test_render_json() {
        let text = render(&table(), RouteFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["base_path"], "/v1");
        assert_eq!(value["routes"]["/v1/user/{id}"]["module"], "User");
        assert_eq!(
            value["routes"]["/v1/user/{id}"]["operations"]["get"]["function"],
            "Get"
        );
    }

    #[test]
    fn test_render_yaml() {
        let text = render(&table(), RouteFormat::Yaml).unwrap();
        assert!(text.contains("base_path: /v1"));
        assert!(text.contains("module: User"));
    }
}
