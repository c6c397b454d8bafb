// src/config/mod.rs

//! Configuration loading and validation for http-cmd.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file and the catalog / execs files it references
//!   (`loader.rs`).
//! - Validate names, prefixes and timeouts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path};
pub use model::{
    Catalog, Category, ConfigFile, Exec, RawCategory, RawConfigFile, RawExec, RawServerSection,
    ServerConfig,
};
pub use validate::normalize_prefix;
