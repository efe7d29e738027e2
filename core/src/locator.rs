#![deny(missing_docs)]

//! # Dependency Locator
//!
//! Maps a Go import path to the directory holding its sources: the project's
//! `vendor/` tree first, then the project's own module (from `go.mod`), then
//! every `<GOPATH>/src` root.

use crate::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves import paths to source directories.
pub trait DependencyLocator {
    /// Candidate directories for `import_path`, most specific first.
    /// Candidates may not exist.
    fn candidates(&self, import_path: &str) -> Vec<PathBuf>;

    /// Whether `import_path` belongs to the Go standard distribution.
    fn is_standard_package(&self, import_path: &str) -> bool;

    /// Whether any external search root is configured.
    fn has_search_roots(&self) -> bool;

    /// First existing candidate directory, with symlinks resolved.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` when nothing local matches and no search root is
    /// configured.
    fn locate(&self, import_path: &str) -> AppResult<Option<PathBuf>> {
        if let Some(found) = first_existing(&self.candidates(import_path)) {
            return Ok(Some(found));
        }
        if !self.has_search_roots() {
            return Err(AppError::MissingEnvironment(format!(
                "GOPATH environment variable is not set or empty (needed to locate '{}')",
                import_path
            )));
        }
        Ok(None)
    }
}

/// The module declared by a `go.mod` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Module path (`github.com/acme/shop`).
    pub path: String,
    /// Directory containing `go.mod`.
    pub root: PathBuf,
}

impl GoModule {
    /// Reads `<root>/go.mod`, if present.
    pub fn read(root: &Path) -> AppResult<Option<Self>> {
        let go_mod = root.join("go.mod");
        if !go_mod.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(&go_mod)?;
        Ok(parse_module_path(&content).map(|path| GoModule {
            path,
            root: root.to_path_buf(),
        }))
    }

    /// Directory of `import_path` inside this module, if it belongs to it.
    fn dir_of(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.path {
            return Some(self.root.clone());
        }
        import_path
            .strip_prefix(&self.path)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| self.root.join(rest))
    }
}

/// Extracts the module path from `go.mod` content.
pub fn parse_module_path(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"').to_string();
        (!path.is_empty()).then_some(path)
    })
}

/// GOPATH-style locator with vendor and module support.
#[derive(Debug, Clone, Default)]
pub struct GoPathLocator {
    vendor_dir: Option<PathBuf>,
    module: Option<GoModule>,
    search_roots: Vec<PathBuf>,
    goroot: Option<PathBuf>,
}

impl GoPathLocator {
    /// Builds a locator from its parts.
    pub fn new(
        vendor_dir: Option<PathBuf>,
        module: Option<GoModule>,
        search_roots: Vec<PathBuf>,
        goroot: Option<PathBuf>,
    ) -> Self {
        Self {
            vendor_dir,
            module,
            search_roots,
            goroot,
        }
    }
}

impl DependencyLocator for GoPathLocator {
    fn candidates(&self, import_path: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if let Some(vendor) = &self.vendor_dir {
            out.push(vendor.join(import_path));
        }
        if let Some(dir) = self.module.as_ref().and_then(|m| m.dir_of(import_path)) {
            out.push(dir);
        }
        for root in &self.search_roots {
            out.push(root.join("src").join(import_path));
        }
        out
    }

    fn is_standard_package(&self, import_path: &str) -> bool {
        if let Some(goroot) = &self.goroot {
            let src = goroot.join("src");
            return src.join("pkg").join(import_path).is_dir() || src.join(import_path).is_dir();
        }
        // Without GOROOT: standard packages have no dot in their first
        // element and are found nowhere else.
        let first = import_path.split('/').next().unwrap_or_default();
        !first.contains('.') && first_existing(&self.candidates(import_path)).is_none()
    }

    fn has_search_roots(&self) -> bool {
        !self.search_roots.is_empty()
    }
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|c| c.is_dir())
        .map(|c| fs::canonicalize(c).unwrap_or_else(|_| c.clone()))
}
