// src/routes/dispatch.rs

//! Request dispatch: exact path lookup in the [`RouteTable`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::header::{ALLOW, CONTENT_TYPE};
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tracing::{debug, error, info};

use crate::exec::ExecutorBackend;
use crate::routes::table::{RouteBinding, RouteTable};

#[derive(Clone)]
struct DispatchState {
    table: Arc<RouteTable>,
    backend: Arc<dyn ExecutorBackend>,
}

/// Build the axum router serving `table`.
///
/// Every request goes through a single fallback handler that looks the
/// percent-decoded path up in the table; there is no pattern matching.
pub fn build_router(table: RouteTable, backend: Arc<dyn ExecutorBackend>) -> Router {
    let state = DispatchState {
        table: Arc::new(table),
        backend,
    };

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}

async fn dispatch(State(state): State<DispatchState>, method: Method, uri: Uri) -> Response {
    let Ok(path) = percent_decode_str(uri.path()).decode_utf8() else {
        debug!(path = uri.path(), "request path does not decode to UTF-8");
        return not_found();
    };

    let Some(binding) = state.table.get(&path) else {
        debug!(path = %path, "no route registered for path");
        return not_found();
    };

    if method != Method::GET {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, "GET")],
            "405 method not allowed",
        )
            .into_response();
    }

    match binding {
        RouteBinding::CatalogRoot { body } => json_response(body.clone()),
        RouteBinding::CatalogCategory { category, body } => {
            debug!(category = %category, "listing category");
            json_response(body.clone())
        }
        RouteBinding::Exec {
            category,
            name,
            command,
            timeout,
        } => {
            debug!(category = %category, exec = %name, "dispatching exec");
            run_exec(&state, command.clone(), *timeout).await
        }
    }
}

/// Run the command on its own task: if the client goes away, the handler
/// future is dropped but the execution still runs to its outcome.
async fn run_exec(state: &DispatchState, command: String, timeout: Duration) -> Response {
    let backend = Arc::clone(&state.backend);
    let execution = tokio::spawn(async move { backend.run(&command, timeout).await });

    let harvest = match execution.await {
        Ok(harvest) => harvest,
        Err(e) => {
            error!(error = %e, "execution task failed");
            return internal_error(format!("execution task failed: {e}"));
        }
    };

    match serde_json::to_vec(&harvest) {
        Ok(body) => json_response(Bytes::from(body)),
        Err(e) => {
            error!(error = %e, ?harvest, "error while converting execution result to json");
            internal_error(e.to_string())
        }
    }
}

fn json_response(body: Bytes) -> Response {
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "404 page not found").into_response()
}

fn internal_error(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

async fn access_log(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "http access"
    );
    response
}
