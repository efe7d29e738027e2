#![deny(missing_docs)]

//! # Generate Command
//!
//! Writes the validator package of a beego project:
//! `commentsValidator_routers.go` plus one `<module>_valid.go` per
//! controller module.

use crate::common::ProjectArgs;
use crate::error::CliResult;
use std::path::PathBuf;
use tracing::info;
use validgen_core::{
    generate_validation, GenerationReport, GoFmt, NoopFormatter, SourceFormatter, StdinPrompt,
    WritePolicy,
};

/// Arguments for the generate command.
#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    #[clap(flatten)]
    pub project: ProjectArgs,

    /// Output directory, relative to the project root.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing files without asking.
    #[clap(long, conflicts_with = "no_overwrite")]
    pub force: bool,

    /// Never overwrite existing files.
    #[clap(long)]
    pub no_overwrite: bool,

    /// Do not run the formatter on written files.
    #[clap(long)]
    pub no_format: bool,

    /// Formatter program (default `gofmt`).
    #[clap(long)]
    pub formatter: Option<String>,
}

impl GenerateArgs {
    fn policy(&self) -> WritePolicy {
        if self.force {
            WritePolicy::Overwrite
        } else if self.no_overwrite {
            WritePolicy::CreateIfAbsent
        } else {
            WritePolicy::PromptBeforeOverwrite
        }
    }
}

/// Executes the generate command.
pub fn execute(args: &GenerateArgs) -> CliResult<GenerationReport> {
    let mut config = args.project.load_config()?;
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(formatter) = &args.formatter {
        config.formatter = formatter.clone();
    }

    let formatter: Box<dyn SourceFormatter> = if args.no_format {
        Box::new(NoopFormatter)
    } else {
        Box::new(GoFmt::new(config.formatter.as_str()))
    };
    let mut prompt = StdinPrompt::stdin();

    let report = generate_validation(&config, args.policy(), &mut prompt, formatter.as_ref())?;

    info!(
        "{} routes, {} files written, {} skipped",
        report.routes,
        report.written.len(),
        report.skipped.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(force: bool, no_overwrite: bool) -> GenerateArgs {
        GenerateArgs {
            project: ProjectArgs {
                project_root: PathBuf::from("."),
                router_file: None,
                vendor_dir: None,
                search_roots: vec![],
            },
            output_dir: None,
            force,
            no_overwrite,
            no_format: true,
            formatter: None,
        }
    }

    #[test]
    fn test_execute_writes_validator_package() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("go.mod"), "module shop\n").unwrap();
        fs::create_dir_all(root.join("routers")).unwrap();
        fs::create_dir_all(root.join("controllers")).unwrap();
        fs::write(
            root.join("routers/router.go"),
            "package routers\n\nimport \"shop/controllers\"\n\nfunc init() {\n\tbeego.NewNamespace(\"/v1\", beego.NSInclude(&controllers.PingController{}))\n}\n",
        )
        .unwrap();
        fs::write(
            root.join("controllers/ping.go"),
            "package controllers\n\ntype PingController struct{}\n\n// @Param X-Request-Id header string true \"trace\"\n// @router /ping [get]\nfunc (c *PingController) Ping() {\n}\n",
        )
        .unwrap();

        let mut args = args(true, false);
        args.project.project_root = root.to_path_buf();
        args.project.search_roots = vec![root.join("gopath")];

        let report = execute(&args).unwrap();
        assert_eq!(report.routes, 1);
        assert_eq!(report.written.len(), 2);
        let module = fs::read_to_string(root.join("controllers/validator/ping_valid.go")).unwrap();
        assert!(module.contains("xRequestId := v.GetString(\"X-Request-Id\")"));
    }

    #[test]
    fn test_policy_from_flags() {
        assert_eq!(args(true, false).policy(), WritePolicy::Overwrite);
        assert_eq!(args(false, true).policy(), WritePolicy::CreateIfAbsent);
        assert_eq!(args(false, false).policy(), WritePolicy::PromptBeforeOverwrite);
    }
}
