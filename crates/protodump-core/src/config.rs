//! Plugin configuration.
//!
//! protoc hands plugins a single comma-separated parameter string, e.g.
//! `--dump_out=comments=hide,paths=source_relative:.`. [`DumpConfig::parse`]
//! turns it into a config.

use crate::error::{Error, Result};
use crate::report::ReportConfig;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Parameter value that hides comments; every other value shows them
pub const HIDE_COMMENTS: &str = "hide";

/// How generated filename prefixes are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathsMode {
    /// `<go import path>/<file base name>`
    #[default]
    Import,
    /// Source path without extension
    SourceRelative,
}

impl FromStr for PathsMode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "import" => Ok(PathsMode::Import),
            "source_relative" => Ok(PathsMode::SourceRelative),
            _ => Err(Error::invalid_parameter(
                format!("paths={}", value),
                "expected 'import' or 'source_relative'",
            )),
        }
    }
}

/// Configuration for a dump run
#[derive(Debug, Clone)]
pub struct DumpConfig {
    /// Include source comments in the report
    pub show_comments: bool,
    /// Prefix derivation mode
    pub paths: PathsMode,
    /// Import path overrides from `M<file>=<import path>` parameters
    pub import_paths: BTreeMap<String, String>,
    /// Module path trimmed from import-mode prefixes (`module=<path>`)
    pub module: Option<String>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            show_comments: true,
            paths: PathsMode::default(),
            import_paths: BTreeMap::new(),
            module: None,
        }
    }
}

impl DumpConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to include comments
    pub fn show_comments(mut self, show: bool) -> Self {
        self.show_comments = show;
        self
    }

    /// Sets the prefix derivation mode
    pub fn paths(mut self, paths: PathsMode) -> Self {
        self.paths = paths;
        self
    }

    /// Maps a proto file to an import path
    pub fn import_path(mut self, file: impl Into<String>, import_path: impl Into<String>) -> Self {
        self.import_paths.insert(file.into(), import_path.into());
        self
    }

    /// Sets the module path trimmed from generated prefixes
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Parses a protoc parameter string on top of the defaults
    pub fn parse(parameter: &str) -> Result<Self> {
        let mut config = Self::default();
        config.apply(parameter)?;
        Ok(config)
    }

    /// Applies a protoc parameter string to this config.
    ///
    /// Empty entries are ignored. `comments=<v>` hides comments only when
    /// `<v>` is exactly `hide`. `annotate_code` is accepted for compatibility
    /// with other Go plugins and has no effect on the report.
    pub fn apply(&mut self, parameter: &str) -> Result<()> {
        for param in parameter.split(',') {
            let param = param.trim();
            if param.is_empty() {
                continue;
            }

            let (key, value) = param.split_once('=').unwrap_or((param, ""));

            match key {
                "comments" => self.show_comments = value != HIDE_COMMENTS,
                "paths" => self.paths = value.parse()?,
                "module" => {
                    let module = value.trim_end_matches('/');
                    if module.is_empty() {
                        return Err(Error::invalid_parameter(param, "missing module path"));
                    }
                    self.module = Some(module.to_string());
                }
                "annotate_code" => match value {
                    "" | "true" | "false" => {}
                    _ => return Err(Error::invalid_parameter(param, "expected a boolean")),
                },
                _ if key.len() > 1 && key.starts_with('M') => {
                    if value.is_empty() {
                        return Err(Error::invalid_parameter(param, "missing import path"));
                    }
                    self.import_paths.insert(key[1..].to_string(), value.to_string());
                }
                _ => return Err(Error::invalid_parameter(param, "unknown parameter")),
            }
        }
        Ok(())
    }

    /// Report settings derived from this config
    pub fn report_config(&self) -> ReportConfig {
        ReportConfig::new().show_comments(self.show_comments)
    }
}
