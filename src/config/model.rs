// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5050;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DESCRIPTION: &str = "No description provided";
pub const DEFAULT_CATALOG_PREFIX: &str = "/catalog/";
pub const DEFAULT_RUN_PREFIX: &str = "/run/";

/// Server configuration as read from a TOML file, before validation.
///
/// ```toml
/// [server]
/// address = "0.0.0.0"
/// port = 8080
/// timeout = 5
/// catalog_prefix = "/catalog/"
/// run_prefix = "/run/"
///
/// [[category]]
/// name = "files"
/// description = "File inspection"
///
/// [[category.exec]]
/// name = "list"
/// command = "ls -la $HOME"
/// timeout = 1
/// ```
///
/// Everything in `[server]` is optional. Categories may also come from an
/// external file named by `server.catalog`, and execs from a file named by a
/// category's `execs` key; the loader merges those in before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: RawServerSection,

    /// `[[category]]` tables, in file order.
    #[serde(default, rename = "category")]
    pub categories: Vec<RawCategory>,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawServerSection {
    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// Default exec timeout in seconds.
    #[serde(default)]
    pub timeout: Option<i64>,

    #[serde(default)]
    pub catalog_prefix: Option<String>,

    #[serde(default)]
    pub run_prefix: Option<String>,

    /// Optional path to an external catalog file holding `[[category]]`
    /// tables. Relative paths are resolved against the config file directory.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
}

/// `[[category]]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Optional path to an external file holding `[[exec]]` tables.
    #[serde(default)]
    pub execs: Option<PathBuf>,

    /// Inline `[[category.exec]]` tables.
    #[serde(default, rename = "exec")]
    pub exec: Vec<RawExec>,
}

/// `[[category.exec]]` (or `[[exec]]` in an external execs file).
#[derive(Debug, Clone, Deserialize)]
pub struct RawExec {
    pub name: String,

    /// Command line; `$VAR` / `${VAR}` are expanded at run time.
    pub command: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Per-exec timeout override in seconds.
    #[serde(default)]
    pub timeout: Option<i64>,
}

/// Layout of an external catalog file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogFile {
    #[serde(default, rename = "category")]
    pub categories: Vec<RawCategory>,
}

/// Layout of an external execs file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawExecsFile {
    #[serde(default, rename = "exec")]
    pub execs: Vec<RawExec>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub server: ServerConfig,
    pub catalog: Catalog,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(server: ServerConfig, catalog: Catalog) -> Self {
        Self { server, catalog }
    }
}

/// Listener and routing settings with defaults applied and prefixes
/// normalized to start and end with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub default_timeout: u64,
    pub catalog_prefix: String,
    pub run_prefix: String,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            default_timeout: DEFAULT_TIMEOUT_SECS,
            catalog_prefix: DEFAULT_CATALOG_PREFIX.to_string(),
            run_prefix: DEFAULT_RUN_PREFIX.to_string(),
        }
    }
}

/// Ordered set of categories. Names are unique, non-empty and free of `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    pub(crate) fn new_unchecked(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub description: String,
    pub execs: Vec<Exec>,
}

impl Category {
    pub fn exec(&self, name: &str) -> Option<&Exec> {
        self.execs.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exec {
    pub name: String,
    pub command: String,
    pub description: String,
    /// Timeout in seconds (always >= 1 after validation).
    pub timeout: u64,
}
