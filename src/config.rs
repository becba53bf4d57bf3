//! Run configuration
//!
//! Everything that varies between runs is collected into one [`Config`]
//! value, built by the CLI and passed by reference to the orchestrator and
//! the front end. Nothing below reads global state.

use crate::parser::preprocess::DEFAULT_SYSTEM_DIRS;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tracing::Level;

/// How observations are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `Found definition for ... in file:line:column`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub verbose: bool,
    pub quiet: bool,
    pub format: OutputFormat,
    /// Extra directories treated as system header locations
    pub system_include_dirs: Vec<PathBuf>,
    /// Search `/usr/include` and `/usr/local/include`
    pub default_system_includes: bool,
    /// Only inspect units whose path contains this substring
    pub filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbose: false,
            quiet: false,
            format: OutputFormat::Text,
            system_include_dirs: Vec::new(),
            default_system_includes: true,
            filter: None,
        }
    }
}

impl Config {
    /// Maximum diagnostic level; quiet wins over verbose
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::WARN
        } else if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }

    /// Toolchain header directories handed to the front end
    pub fn standard_include_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = self.system_include_dirs.clone();
        if self.default_system_includes {
            dirs.extend(DEFAULT_SYSTEM_DIRS.iter().map(PathBuf::from));
        }
        dirs
    }

    /// Whether the unit filter admits `file`
    pub fn accepts(&self, file: &Path) -> bool {
        match &self.filter {
            Some(filter) => file.to_string_lossy().contains(filter.as_str()),
            None => true,
        }
    }
}
