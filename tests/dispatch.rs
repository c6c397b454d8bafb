mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_cmd::config::ConfigFile;
use http_cmd::exec::{Harvest, ReaperBackend, TIMEOUT_CODE};
use http_cmd::routes::{CategoryEntry, ExecEntry, RouteTable, build_router};
use http_cmd_test_utils::builders::{CategoryBuilder, ConfigFileBuilder, ExecBuilder};
use http_cmd_test_utils::fake_executor::FakeExecutor;
use tower::ServiceExt;

use common::{get, init_tracing, send, with_timeout};

fn ops_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_category(
            CategoryBuilder::new("ops")
                .description("Operational checks")
                .exec(
                    ExecBuilder::new("ping", "ping -c 1 localhost")
                        .description("Ping localhost")
                        .timeout(3)
                        .build(),
                )
                .exec(ExecBuilder::new("uptime", "uptime").build())
                .build(),
        )
        .with_category(CategoryBuilder::new("files").build())
        .build()
}

fn fake_app(cfg: &ConfigFile) -> (Router, FakeExecutor) {
    let fake = FakeExecutor::new();
    let table = RouteTable::from_config(cfg).unwrap();
    (build_router(table, Arc::new(fake.clone())), fake)
}

#[tokio::test]
async fn catalog_root_lists_categories_in_order() {
    init_tracing();
    let (app, _fake) = fake_app(&ops_config());

    let resp = get(&app, "/catalog/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        resp.text(),
        r#"[{"Name":"ops","Description":"Operational checks"},{"Name":"files","Description":"No description provided"}]"#
    );
}

#[tokio::test]
async fn category_listing_describes_execs() {
    let (app, fake) = fake_app(&ops_config());

    let resp = get(&app, "/catalog/ops").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    let execs: Vec<ExecEntry> = resp.json();
    assert_eq!(execs.len(), 2);
    assert_eq!(
        resp.text(),
        concat!(
            r#"[{"Name":"ping","Description":"Ping localhost","Command":"ping -c 1 localhost","Timeout":3},"#,
            r#"{"Name":"uptime","Description":"No description provided","Command":"uptime","Timeout":5}]"#
        )
    );
    assert!(fake.executed().is_empty(), "listing must not run anything");
}

#[tokio::test]
async fn empty_category_lists_as_empty_array() {
    let (app, _fake) = fake_app(&ops_config());

    let resp = get(&app, "/catalog/files").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.text(), "[]");
}

#[tokio::test]
async fn exec_path_runs_bound_command_with_its_timeout() {
    let (app, fake) = fake_app(&ops_config());

    let resp = get(&app, "/run/ops/ping").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.content_type.as_deref(), Some("application/json"));
    let harvest: Harvest = resp.json();
    assert_eq!(harvest.original_command, "ping -c 1 localhost");
    assert_eq!(harvest.return_code, 0);
    assert_eq!(
        fake.executed(),
        vec![("ping -c 1 localhost".to_string(), Duration::from_secs(3))]
    );
}

#[tokio::test]
async fn every_exec_path_returns_a_harvest() {
    let cfg = ops_config();
    let (app, fake) = fake_app(&cfg);
    let table = RouteTable::from_config(&cfg).unwrap();

    let exec_paths: Vec<String> = table
        .paths()
        .filter(|p| p.starts_with("/run/"))
        .map(str::to_string)
        .collect();
    assert_eq!(exec_paths.len(), 2);

    for path in &exec_paths {
        let resp = get(&app, path).await;
        assert_eq!(resp.status, StatusCode::OK, "GET {path}");
        let _: Harvest = resp.json();
    }
    assert_eq!(fake.executed().len(), exec_paths.len());
}

#[tokio::test]
async fn non_get_methods_are_rejected() {
    let (app, fake) = fake_app(&ops_config());

    for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
        for path in ["/run/ops/ping", "/catalog/", "/catalog/ops"] {
            let resp = send(&app, method.clone(), path).await;
            assert_eq!(
                resp.status,
                StatusCode::METHOD_NOT_ALLOWED,
                "{method} {path}"
            );
        }
    }
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let (app, fake) = fake_app(&ops_config());

    for path in [
        "/",
        "/catalog",
        "/catalog/unknown",
        "/catalog/ops/",
        "/catalog/ops/ping",
        "/run/",
        "/run/ops",
        "/run/ops/",
        "/run/ops/pong",
        "/run/nope/ping",
        "/run/ops/ping/extra",
    ] {
        let resp = get(&app, path).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "GET {path}");
    }
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn paths_one_character_off_are_not_found() {
    let cfg = ops_config();
    let (app, fake) = fake_app(&cfg);
    let table = RouteTable::from_config(&cfg).unwrap();

    for path in table.paths() {
        let mut shorter = path.to_string();
        shorter.pop();
        let longer = format!("{path}x");
        let mut changed: Vec<char> = path.chars().collect();
        let last = changed.len() - 1;
        changed[last] = if changed[last] == 'Z' { 'Y' } else { 'Z' };
        let changed: String = changed.into_iter().collect();

        for variant in [shorter, longer, changed] {
            if table.get(&variant).is_some() {
                continue;
            }
            let resp = get(&app, &variant).await;
            assert_eq!(resp.status, StatusCode::NOT_FOUND, "GET {variant}");
        }
    }
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn custom_prefixes_are_honoured() {
    let cfg = ConfigFileBuilder::new()
        .catalog_prefix("api/list")
        .run_prefix("/api/exec")
        .with_category(
            CategoryBuilder::new("ops")
                .exec(ExecBuilder::new("ping", "ping -c 1 localhost").build())
                .build(),
        )
        .build();
    let (app, fake) = fake_app(&cfg);

    assert_eq!(get(&app, "/api/list/").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/list/ops").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/api/exec/ops/ping").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/catalog/").await.status, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/run/ops/ping").await.status, StatusCode::NOT_FOUND);
    assert_eq!(fake.executed().len(), 1);
}

#[tokio::test]
async fn catalog_scenario_matches_documented_bodies() {
    let cfg = ConfigFileBuilder::new()
        .with_category(
            CategoryBuilder::new("ops")
                .exec(ExecBuilder::new("ping", "ping -c 1 127.0.0.1").timeout(2).build())
                .build(),
        )
        .build();
    let (app, _fake) = fake_app(&cfg);

    let root: Vec<CategoryEntry> = get(&app, "/catalog/").await.json();
    assert_eq!(
        root,
        vec![CategoryEntry {
            name: "ops".to_string(),
            description: "No description provided".to_string(),
        }]
    );

    let execs: Vec<ExecEntry> = get(&app, "/catalog/ops").await.json();
    assert_eq!(
        execs,
        vec![ExecEntry {
            name: "ping".to_string(),
            description: "No description provided".to_string(),
            command: "ping -c 1 127.0.0.1".to_string(),
            timeout: 2,
        }]
    );
}

#[tokio::test]
async fn percent_encoded_paths_reach_their_routes() {
    let cfg = ConfigFileBuilder::new()
        .with_category(
            CategoryBuilder::new("disk usage")
                .exec(ExecBuilder::new("df all", "df -h").build())
                .build(),
        )
        .with_category(
            CategoryBuilder::new("café")
                .exec(ExecBuilder::new("100%", "uptime").build())
                .build(),
        )
        .build();
    let (app, fake) = fake_app(&cfg);

    let listing = get(&app, "/catalog/disk%20usage").await;
    assert_eq!(listing.status, StatusCode::OK);
    let execs: Vec<ExecEntry> = listing.json();
    assert_eq!(execs[0].name, "df all");

    assert_eq!(get(&app, "/catalog/caf%C3%A9").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/run/disk%20usage/df%20all").await.status, StatusCode::OK);
    assert_eq!(get(&app, "/run/caf%C3%A9/100%25").await.status, StatusCode::OK);

    assert_eq!(
        fake.executed(),
        vec![
            ("df -h".to_string(), Duration::from_secs(5)),
            ("uptime".to_string(), Duration::from_secs(5)),
        ]
    );
}

#[tokio::test]
async fn undecodable_paths_are_not_found() {
    let (app, fake) = fake_app(&ops_config());

    for path in ["/catalog/%FF", "/run/ops/%C3", "/run/%E2%82/ping"] {
        let resp = get(&app, path).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "GET {path}");
    }
    assert!(fake.executed().is_empty());
}

#[tokio::test]
async fn execution_outlives_an_abandoned_request() {
    init_tracing();
    let fake = FakeExecutor::with_delay(Duration::from_millis(200));
    let table = RouteTable::from_config(&ops_config()).unwrap();
    let app = build_router(table, Arc::new(fake.clone()));

    let request = Request::builder()
        .uri("/run/ops/ping")
        .body(Body::empty())
        .unwrap();
    let abandoned = tokio::time::timeout(Duration::from_millis(50), app.oneshot(request)).await;
    assert!(abandoned.is_err(), "response must not be ready before the run ends");
    assert_eq!(fake.executed().len(), 1);
    assert!(fake.completed().is_empty());

    with_timeout(async {
        while fake.completed().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert_eq!(fake.completed(), vec!["ping -c 1 localhost".to_string()]);
}

#[cfg(unix)]
mod real_processes {
    use super::*;

    fn real_app(cfg: &ConfigFile) -> Router {
        let table = RouteTable::from_config(cfg).unwrap();
        build_router(table, Arc::new(ReaperBackend))
    }

    #[tokio::test]
    async fn listing_files_succeeds() {
        init_tracing();
        let cfg = ConfigFileBuilder::new()
            .run_prefix("/run/")
            .with_category(
                CategoryBuilder::new("files")
                    .exec(ExecBuilder::new("list", "ls -la").timeout(1).build())
                    .build(),
            )
            .build();
        let app = real_app(&cfg);

        let resp = with_timeout(get(&app, "/run/files/list")).await;

        assert_eq!(resp.status, StatusCode::OK);
        let harvest: Harvest = resp.json();
        assert_eq!(harvest.return_code, 0);
        assert!(!harvest.timeout_reached);
        assert!(!harvest.stdout.is_empty());
        assert_eq!(harvest.stderr, "");
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let cfg = ConfigFileBuilder::new()
            .with_category(
                CategoryBuilder::new("slow")
                    .exec(ExecBuilder::new("wait", "sleep 2").timeout(1).build())
                    .build(),
            )
            .build();
        let app = real_app(&cfg);

        let resp = with_timeout(get(&app, "/run/slow/wait")).await;

        assert_eq!(resp.status, StatusCode::OK);
        let harvest: Harvest = resp.json();
        assert_eq!(harvest.return_code, TIMEOUT_CODE);
        assert!(harvest.timeout_reached);
    }
}
