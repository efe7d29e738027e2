#![deny(missing_docs)]

//! # Shared Arguments
//!
//! Flags common to every command that analyses a project or touches the
//! snapshot store.

use crate::error::CliResult;
use std::path::PathBuf;
use validgen_core::{GenerateConfig, JsonFileStore};

/// Locates the analysed project.
#[derive(clap::Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Root of the beego project (holds `validgen.yaml`, `go.mod`, `vendor/`).
    #[clap(long, env = "VALIDGEN_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Router file, relative to the project root.
    #[clap(long)]
    pub router_file: Option<PathBuf>,

    /// Vendor directory, relative to the project root.
    #[clap(long)]
    pub vendor_dir: Option<PathBuf>,

    /// GOPATH-style search root; repeatable. Defaults to `$GOPATH`.
    #[clap(long = "search-root")]
    pub search_roots: Vec<PathBuf>,
}

impl ProjectArgs {
    /// Configuration file values with these flags applied on top.
    pub fn load_config(&self) -> CliResult<GenerateConfig> {
        let mut config = GenerateConfig::load(&self.project_root)?;
        if let Some(router_file) = &self.router_file {
            config.router_file = router_file.clone();
        }
        if let Some(vendor_dir) = &self.vendor_dir {
            config.vendor_dir = vendor_dir.clone();
        }
        if !self.search_roots.is_empty() {
            config.search_roots = self.search_roots.clone();
        }
        Ok(config)
    }
}

/// Locates the snapshot store.
#[derive(clap::Args, Debug, Clone)]
pub struct StoreArgs {
    /// Directory holding the JSON collections.
    #[clap(long, env = "VALIDGEN_STORE_DIR", default_value = ".validgen")]
    pub store_dir: PathBuf,
}

impl StoreArgs {
    /// Opens the store.
    pub fn open(&self) -> JsonFileStore {
        JsonFileStore::new(&self.store_dir)
    }
}
