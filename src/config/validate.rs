// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{
    Catalog, Category, ConfigFile, DEFAULT_ADDRESS, DEFAULT_CATALOG_PREFIX, DEFAULT_DESCRIPTION,
    DEFAULT_PORT, DEFAULT_RUN_PREFIX, DEFAULT_TIMEOUT_SECS, Exec, RawCategory, RawConfigFile,
    RawExec, RawServerSection, ServerConfig,
};
use crate::errors::{HttpCmdError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HttpCmdError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let server = validate_server(&raw.server)?;
        let catalog = validate_catalog(raw.categories, server.default_timeout)?;
        Ok(ConfigFile::new_unchecked(server, catalog))
    }
}

/// Normalize a URL prefix so that it starts and ends with `/`.
///
/// `"run"` → `"/run/"`, `"/api/run"` → `"/api/run/"`, `"/"` stays `"/"`.
/// Surrounding whitespace is ignored.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim();
    let mut out = String::with_capacity(trimmed.len() + 2);
    if !trimmed.starts_with('/') {
        out.push('/');
    }
    out.push_str(trimmed);
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}

fn prefix_or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => normalize_prefix(v),
        _ => default.to_string(),
    }
}

fn validate_server(raw: &RawServerSection) -> Result<ServerConfig> {
    let address = match raw.address.as_deref().map(str::trim) {
        Some(a) if !a.is_empty() => a.to_string(),
        _ => DEFAULT_ADDRESS.to_string(),
    };

    let port = raw.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(HttpCmdError::ConfigError(
            "[server].port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }

    let default_timeout = match raw.timeout {
        None => DEFAULT_TIMEOUT_SECS,
        Some(t) => positive_timeout(t, "[server].timeout")?,
    };

    let catalog_prefix = prefix_or_default(raw.catalog_prefix.as_deref(), DEFAULT_CATALOG_PREFIX);
    let run_prefix = prefix_or_default(raw.run_prefix.as_deref(), DEFAULT_RUN_PREFIX);
    if catalog_prefix == run_prefix {
        return Err(HttpCmdError::ConfigError(format!(
            "catalog prefix can not be the same as run prefix ('{}')",
            run_prefix
        )));
    }

    Ok(ServerConfig {
        address,
        port,
        default_timeout,
        catalog_prefix,
        run_prefix,
    })
}

fn positive_timeout(value: i64, what: &str) -> Result<u64> {
    if value < 1 {
        return Err(HttpCmdError::ConfigError(format!(
            "{what} must be >= 1 second (got {value})"
        )));
    }
    Ok(value as u64)
}

fn check_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(HttpCmdError::ConfigError(format!("{what} name must not be empty")));
    }
    if name.contains('/') {
        return Err(HttpCmdError::ConfigError(format!(
            "{what} name '{name}' must not contain '/'"
        )));
    }
    Ok(())
}

fn description_or_default(description: Option<String>) -> String {
    match description {
        Some(d) if !d.trim().is_empty() => d,
        _ => DEFAULT_DESCRIPTION.to_string(),
    }
}

fn validate_catalog(raw: Vec<RawCategory>, default_timeout: u64) -> Result<Catalog> {
    if raw.is_empty() {
        return Err(HttpCmdError::ConfigError(
            "config must contain at least one [[category]] section".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut categories = Vec::with_capacity(raw.len());

    for category in raw {
        check_name(&category.name, "category")?;
        if !seen.insert(category.name.clone()) {
            return Err(HttpCmdError::ConfigError(format!(
                "duplicate category '{}'",
                category.name
            )));
        }
        if let Some(path) = &category.execs {
            // The loader merges external exec files; a leftover path means the
            // raw config was built without going through it.
            return Err(HttpCmdError::ConfigError(format!(
                "category '{}' references unresolved execs file {:?}",
                category.name, path
            )));
        }

        let execs = validate_execs(&category.name, category.exec, default_timeout)?;
        categories.push(Category {
            name: category.name,
            description: description_or_default(category.description),
            execs,
        });
    }

    Ok(Catalog::new_unchecked(categories))
}

fn validate_execs(category: &str, raw: Vec<RawExec>, default_timeout: u64) -> Result<Vec<Exec>> {
    let mut seen = HashSet::new();
    let mut execs = Vec::with_capacity(raw.len());

    for exec in raw {
        check_name(&exec.name, "exec")?;
        if !seen.insert(exec.name.clone()) {
            return Err(HttpCmdError::ConfigError(format!(
                "duplicate exec '{}' in category '{}'",
                exec.name, category
            )));
        }
        if exec.command.trim().is_empty() {
            return Err(HttpCmdError::ConfigError(format!(
                "exec '{}/{}' has an empty command",
                category, exec.name
            )));
        }

        let timeout = match exec.timeout {
            None => default_timeout,
            Some(t) => positive_timeout(t, &format!("timeout of exec '{}/{}'", category, exec.name))?,
        };

        execs.push(Exec {
            name: exec.name,
            command: exec.command,
            description: description_or_default(exec.description),
            timeout,
        });
    }

    Ok(execs)
}
