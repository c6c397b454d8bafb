// src/routes/table.rs

//! Static route table derived from the catalog at startup.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::{Catalog, ConfigFile};
use crate::errors::{HttpCmdError, Result};

/// Entry of the top-level catalog listing (`GET <catalog_prefix>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryEntry {
    pub name: String,
    pub description: String,
}

/// Entry of a per-category listing (`GET <catalog_prefix><category>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecEntry {
    pub name: String,
    pub description: String,
    pub command: String,
    pub timeout: u64,
}

/// What a registered path does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteBinding {
    /// Run a command and return its `Harvest`.
    Exec {
        category: String,
        name: String,
        command: String,
        timeout: Duration,
    },
    /// Precomputed JSON array of [`CategoryEntry`].
    CatalogRoot { body: Bytes },
    /// Precomputed JSON array of [`ExecEntry`] for one category.
    CatalogCategory { category: String, body: Bytes },
}

impl RouteBinding {
    pub fn kind(&self) -> &'static str {
        match self {
            RouteBinding::Exec { .. } => "exec",
            RouteBinding::CatalogRoot { .. } => "catalog",
            RouteBinding::CatalogCategory { .. } => "catalog-category",
        }
    }
}

/// Exact path → binding map. Built once, never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteBinding>,
}

impl RouteTable {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        Self::build(
            &cfg.catalog,
            &cfg.server.catalog_prefix,
            &cfg.server.run_prefix,
        )
    }

    /// Build every binding for `catalog`:
    ///
    /// - `<catalog_prefix>` lists the categories,
    /// - `<catalog_prefix><category>` lists the execs of one category,
    /// - `<run_prefix><category>/<exec>` runs one exec.
    ///
    /// Prefixes are expected to be normalized (`/…/`). Fails if two bindings
    /// land on the same path.
    pub fn build(catalog: &Catalog, catalog_prefix: &str, run_prefix: &str) -> Result<Self> {
        let mut table = Self::default();

        let categories: Vec<CategoryEntry> = catalog
            .categories()
            .map(|c| CategoryEntry {
                name: c.name.clone(),
                description: c.description.clone(),
            })
            .collect();
        table.insert(
            catalog_prefix.to_string(),
            RouteBinding::CatalogRoot {
                body: to_json(&categories)?,
            },
        )?;

        for category in catalog.categories() {
            let execs: Vec<ExecEntry> = category
                .execs
                .iter()
                .map(|e| ExecEntry {
                    name: e.name.clone(),
                    description: e.description.clone(),
                    command: e.command.clone(),
                    timeout: e.timeout,
                })
                .collect();
            table.insert(
                format!("{catalog_prefix}{}", category.name),
                RouteBinding::CatalogCategory {
                    category: category.name.clone(),
                    body: to_json(&execs)?,
                },
            )?;

            for exec in &category.execs {
                table.insert(
                    format!("{run_prefix}{}/{}", category.name, exec.name),
                    RouteBinding::Exec {
                        category: category.name.clone(),
                        name: exec.name.clone(),
                        command: exec.command.clone(),
                        timeout: Duration::from_secs(exec.timeout),
                    },
                )?;
            }
        }

        Ok(table)
    }

    fn insert(&mut self, path: String, binding: RouteBinding) -> Result<()> {
        if let Some(existing) = self.routes.get(&path) {
            return Err(HttpCmdError::RouteConflict(format!(
                "path '{}' is claimed by both a {} and a {} route",
                path,
                existing.kind(),
                binding.kind()
            )));
        }
        self.routes.insert(path, binding);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&RouteBinding> {
        self.routes.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteBinding)> {
        self.routes.iter().map(|(p, b)| (p.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}
