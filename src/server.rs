// src/server.rs

//! Listener setup and serve loop.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::exec::ReaperBackend;
use crate::routes::{RouteTable, build_router};

/// Bind `address:port` from the config and serve until Ctrl-C.
pub async fn run_server(cfg: &ConfigFile) -> Result<()> {
    let table = RouteTable::from_config(cfg)?;
    info!(
        routes = table.len(),
        categories = cfg.catalog.len(),
        "route table built"
    );

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding listener on {addr}"))?;

    serve(listener, table).await
}

/// Serve `table` on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, table: RouteTable) -> Result<()> {
    let app = build_router(table, Arc::new(ReaperBackend));
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C; shutdown only by termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
