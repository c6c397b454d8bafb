// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod routes;
pub mod server;
pub mod version;

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::config::loader::load_and_validate;
use crate::routes::{RouteBinding, RouteTable};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - route table construction
/// - the HTTP server (or a dry-run listing)
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    info!(config = ?config_path, version = version::long_version(), "starting http-cmd");
    let cfg = load_and_validate(&config_path)?;

    if args.dry_run {
        let table = RouteTable::from_config(&cfg)?;
        print_dry_run(&cfg, &table);
        return Ok(());
    }

    server::run_server(&cfg).await?;
    Ok(())
}

/// Simple dry-run output: print server settings and every route.
fn print_dry_run(cfg: &ConfigFile, table: &RouteTable) {
    println!("http-cmd dry-run");
    println!("  server.listen = {}", cfg.server.bind_addr());
    println!("  server.timeout = {}s", cfg.server.default_timeout);
    println!("  server.catalog_prefix = {}", cfg.server.catalog_prefix);
    println!("  server.run_prefix = {}", cfg.server.run_prefix);
    println!();

    println!("routes ({}):", table.len());
    for (path, binding) in table.iter() {
        match binding {
            RouteBinding::Exec {
                command, timeout, ..
            } => {
                println!("  GET {path}");
                println!("      cmd: {command}");
                println!("      timeout: {}s", timeout.as_secs());
            }
            RouteBinding::CatalogRoot { .. } | RouteBinding::CatalogCategory { .. } => {
                println!("  GET {path} ({})", binding.kind());
            }
        }
    }

    debug!("dry-run complete (no listener)");
}
