#![deny(missing_docs)]

//! # Configuration
//!
//! Settings for one generation run. Values come, in increasing priority,
//! from built-in defaults, the environment (`GOPATH`, `GOROOT`), an optional
//! `validgen.yaml` in the project root, and command-line flags applied by the
//! caller.
//!
//! ```yaml
//! router_file: routers/router.go
//! output_dir: controllers/validator
//! skip_packages: [github.com/astaxie/beego]
//! type_overrides:
//!   decimal.Decimal: float64
//! ```

use crate::error::{AppError, AppResult};
use crate::locator::{GoModule, GoPathLocator};
use crate::type_table::TypeTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the optional per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "validgen.yaml";

/// Framework package never analysed for controllers.
pub const FRAMEWORK_PACKAGE: &str = "github.com/astaxie/beego";

/// Generation settings. Relative paths are relative to `project_root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Root of the analysed Go project.
    #[serde(skip)]
    pub project_root: PathBuf,
    /// File holding the namespace registrations.
    pub router_file: PathBuf,
    /// Directory receiving the generated package.
    pub output_dir: PathBuf,
    /// Vendored dependencies.
    pub vendor_dir: PathBuf,
    /// GOPATH-style roots; packages are looked up under `<root>/src`.
    pub search_roots: Vec<PathBuf>,
    /// Go installation, used to recognize standard packages.
    pub goroot: Option<PathBuf>,
    /// Import paths never cataloged.
    pub skip_packages: Vec<String>,
    /// Suffix stripped from controller types to form module names.
    pub controller_suffix: String,
    /// Suffix appended to module names to form validator constants.
    pub validator_suffix: String,
    /// Formatter program run on each written file.
    pub formatter: String,
    /// Extra or replacement entries for the parameter type table.
    pub type_overrides: IndexMap<String, String>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            router_file: PathBuf::from("routers/router.go"),
            output_dir: PathBuf::from("controllers/validator"),
            vendor_dir: PathBuf::from("vendor"),
            search_roots: Vec::new(),
            goroot: None,
            skip_packages: vec![FRAMEWORK_PACKAGE.to_string()],
            controller_suffix: "Controller".to_string(),
            validator_suffix: "Validator".to_string(),
            formatter: "gofmt".to_string(),
            type_overrides: IndexMap::new(),
        }
    }
}

impl GenerateConfig {
    /// Defaults for `project_root`, then `validgen.yaml` if present, then
    /// the process environment for anything still unset.
    pub fn load(project_root: &Path) -> AppResult<Self> {
        let file = project_root.join(CONFIG_FILE_NAME);
        let mut config = if file.is_file() {
            debug!("reading {}", file.display());
            let content = fs::read_to_string(&file)?;
            Self::from_yaml(&content)?
        } else {
            Self::default()
        };
        config.project_root = project_root.to_path_buf();
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    /// Parses a configuration document.
    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::Config(format!("invalid {}: {}", CONFIG_FILE_NAME, e)))
    }

    /// Fills `search_roots` and `goroot` from `lookup` when they are unset.
    ///
    /// An unset or empty `GOPATH` falls back to `$HOME/go`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.search_roots.is_empty() {
            self.search_roots = match non_empty("GOPATH") {
                Some(gopath) => env::split_paths(&gopath)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect(),
                None => non_empty("HOME")
                    .map(|home| vec![PathBuf::from(home).join("go")])
                    .unwrap_or_default(),
            };
        }
        if self.goroot.is_none() {
            self.goroot = non_empty("GOROOT").map(PathBuf::from);
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.project_root.join(path)
    }

    /// Absolute-or-root-relative router file.
    pub fn router_path(&self) -> PathBuf {
        self.resolve(&self.router_file)
    }

    /// Absolute-or-root-relative output directory.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    /// Parameter type table with overrides applied.
    pub fn type_table(&self) -> TypeTable {
        TypeTable::with_overrides(&self.type_overrides)
    }

    /// Locator over the vendor directory, the project module and the search
    /// roots.
    pub fn locator(&self) -> AppResult<GoPathLocator> {
        let vendor = self.resolve(&self.vendor_dir);
        Ok(GoPathLocator::new(
            vendor.is_dir().then_some(vendor),
            GoModule::read(&self.project_root)?,
            self.search_roots.clone(),
            self.goroot.clone(),
        ))
    }
}
