//! Configuration file support
//!
//! Settings come from an optional `jsondoc.toml` next to the template (or a
//! file given explicitly) and are overridden by command line flags. Relative
//! paths in a file are relative to the file's directory.
//!
//! ```toml
//! package_dir = "../api"
//! search_paths = ["/home/me/go"]
//! default_title = "Shop API"
//! output = "api.html"
//! ```

use crate::diagnostics::{JsonDocError, JsonDocResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up next to the template
pub const CONFIG_FILE_NAME: &str = "jsondoc.toml";

/// Generation settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    /// Directory of the documented package; defaults to the template's
    pub package_dir: Option<PathBuf>,
    /// Roots searched for imported packages
    pub search_paths: Vec<PathBuf>,
    /// Title used when the template sets none
    pub default_title: Option<String>,
    /// Output file; standard output when unset
    pub output: Option<PathBuf>,
}

impl DocConfig {
    /// Parse configuration text
    pub fn parse(content: &str) -> JsonDocResult<Self> {
        toml::from_str(content).map_err(|e| JsonDocError::config(e.to_string()))
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> JsonDocResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            JsonDocError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            JsonDocError::Config(message) => {
                JsonDocError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    /// Load `jsondoc.toml` from the template's directory if present
    pub fn discover(template: &Path) -> JsonDocResult<Option<Self>> {
        let dir = template.parent().unwrap_or_else(|| Path::new(""));
        let candidate = dir.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            return Ok(None);
        }
        tracing::debug!(path = %candidate.display(), "loading configuration");
        Self::from_file(&candidate).map(Some)
    }

    /// Resolve relative paths against `base`
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        self.package_dir = self.package_dir.map(resolve);
        self.output = self.output.map(resolve);
        self.search_paths = self.search_paths.into_iter().map(resolve).collect();
        self
    }

    /// Layer `overrides` on top of this configuration.
    ///
    /// Set values in `overrides` win; search paths are concatenated with the
    /// overriding ones first.
    pub fn merge(self, overrides: DocConfig) -> DocConfig {
        let mut search_paths = overrides.search_paths;
        search_paths.extend(self.search_paths);
        DocConfig {
            package_dir: overrides.package_dir.or(self.package_dir),
            search_paths,
            default_title: overrides.default_title.or(self.default_title),
            output: overrides.output.or(self.output),
        }
    }
}
