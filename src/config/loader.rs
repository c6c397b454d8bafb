// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::model::{ConfigFile, RawCatalogFile, RawCategory, RawConfigFile, RawExecsFile};
use crate::errors::Result;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/http-cmd/http-cmd.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`, with the external catalog and execs files merged in.
///
/// This only performs TOML deserialization and file resolution; it does
/// **not** perform semantic validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let mut config: RawConfigFile = read_toml(path)?;
    let config_dir = parent_dir(path);

    let mut categories = std::mem::take(&mut config.categories);
    resolve_execs(&mut categories, &config_dir)?;

    if let Some(catalog) = config.server.catalog.take() {
        let catalog_path = resolve_relative(&config_dir, &catalog);
        debug!(path = ?catalog_path, "loading external catalog file");
        let external: RawCatalogFile = read_toml(&catalog_path)?;
        let mut external_categories = external.categories;
        resolve_execs(&mut external_categories, &parent_dir(&catalog_path))?;
        categories.extend(external_categories);
    }

    config.categories = categories;
    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML (plus any referenced catalog / execs files).
/// - Applies defaults.
/// - Checks names, prefixes and timeouts.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    let parsed = toml::from_str(&contents)?;
    Ok(parsed)
}

/// Append execs from each category's external `execs` file, clearing the
/// reference once merged.
fn resolve_execs(categories: &mut [RawCategory], base_dir: &Path) -> Result<()> {
    for category in categories.iter_mut() {
        if let Some(execs) = category.execs.take() {
            let execs_path = resolve_relative(base_dir, &execs);
            debug!(
                category = %category.name,
                path = ?execs_path,
                "loading external execs file"
            );
            let external: RawExecsFile = read_toml(&execs_path)?;
            category.exec.extend(external.execs);
        }
    }
    Ok(())
}

fn resolve_relative(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
