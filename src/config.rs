//! Batch configuration.
//!
//! Everything has a default matching the fixed working-directory layout, so
//! a run needs no config file at all; `itemshot.toml` next to the job table
//! can override column roles, directories, and the font.

use crate::error::{Error, Result};

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "itemshot.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Job table filename, relative to the base directory.
    pub job_table: String,
    /// Output subdirectory, created if missing.
    pub output_dir: String,
    /// Durable log filename.
    pub log_file: String,
    pub columns: ColumnConfig,
    pub font: FontConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            job_table: String::from("items.csv"),
            output_dir: String::from("output"),
            log_file: String::from("itemshot.log"),
            columns: ColumnConfig::default(),
            font: FontConfig::default(),
        }
    }
}

impl Config {
    /// Loads `itemshot.toml` from the base directory, or the defaults when
    /// the file does not exist.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|e| Error::config_open(&path, e))?;
        toml::from_str(&content).map_err(|e| Error::config_open(&path, e))
    }
}

/// Column roles and the column→asset-directory mapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ColumnConfig {
    /// Primary source-image column; gates row inclusion and is the only
    /// column whose assets go through the resize policy.
    pub source: String,
    /// Output-filename column; gates row inclusion and names the save
    /// target.
    pub output: String,
    /// Column whose values are literal overlay text.
    pub text: String,
    /// Explicit column→directory overrides. Columns not listed here fall
    /// back to the naming convention: the part before the first `_`.
    pub dirs: HashMap<String, String>,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            source: String::from("source"),
            output: String::from("output"),
            text: String::from("text"),
            dirs: HashMap::new(),
        }
    }
}

impl ColumnConfig {
    /// Resolves the asset directory for a column.
    pub fn directory<'a>(&'a self, column: &'a str) -> &'a str {
        match self.dirs.get(column) {
            Some(dir) => dir.as_str(),
            None => column.split('_').next().unwrap_or(column),
        }
    }

    /// Directory of the primary source-image column.
    pub fn source_directory(&self) -> &str {
        self.directory(&self.source)
    }
}

/// The batch font: a file to register, or a family to resolve through
/// fontconfig. A file wins when both are given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FontConfig {
    pub path: Option<PathBuf>,
    pub family: Option<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            family: Some(String::from("sans-serif")),
        }
    }
}
