mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use common::{TempDb, sample_catalog, sign_up};
use lintbase::auth::generate_session_token;
use lintbase::config::{Config, Environment, LintersConfig};
use lintbase::db::DbActorHandle;
use lintbase::server::{LintBaseState, lintbase_router};
use lintbase::upstream::Upstreams;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    _tmp: TempDb,
    db: DbActorHandle,
    router: Router,
}

async fn app_with(tag: &str, config: Config) -> TestApp {
    let tmp = TempDb::new(tag);
    let db = tmp.spawn().await;
    db.import_catalog(sample_catalog()).await.unwrap();

    let table = LintersConfig::default().load_table().unwrap();
    let upstreams = Upstreams::from_config(&config).unwrap();
    let state = LintBaseState::new(db.clone(), upstreams, Arc::new(config), Arc::new(table));
    TestApp {
        _tmp: tmp,
        db,
        router: lintbase_router(state),
    }
}

async fn app(tag: &str) -> TestApp {
    app_with(tag, Config::default()).await
}

async fn session_for(db: &DbActorHandle, login: &str) -> (i64, String) {
    let user_id = sign_up(db, login).await;
    let token = generate_session_token();
    db.create_session(user_id, token.clone(), Utc::now() + Duration::days(1))
        .await
        .unwrap();
    (user_id, token)
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn linter_id(page: &Value, package: &str) -> i64 {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|l| l["packageName"] == package)
        .and_then(|l| l["id"].as_i64())
        .unwrap()
}

#[tokio::test]
async fn linters_are_searchable_and_paginated() {
    let app = app("routes-linters").await;

    let (status, page) = send(&app.router, Method::GET, "/api/linters", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 3);
    assert_eq!(page["page"], 1);
    assert_eq!(page["perPage"], 25);
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["packageName"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["eslint", "eslint-plugin-import", "eslint-plugin-react"]);

    let (_, page) = send(&app.router, Method::GET, "/api/linters?q=react", None, None).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["packageName"], "eslint-plugin-react");

    let (_, page) = send(
        &app.router,
        Method::GET,
        "/api/linters?page=2&perPage=2",
        None,
        None,
    )
    .await;
    assert_eq!(page["total"], 3);
    assert_eq!(page["perPage"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app.router,
        Method::GET,
        "/api/linters?page=first",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn linter_detail_labels_configs() {
    let app = app("routes-linter-detail").await;
    let (_, page) = send(&app.router, Method::GET, "/api/linters", None, None).await;
    let eslint = linter_id(&page, "eslint");

    let (status, detail) = send(
        &app.router,
        Method::GET,
        &format!("/api/linters/{eslint}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["linter"]["packageName"], "eslint");
    let configs = detail["configs"].as_array().unwrap();
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0]["name"], "all");
    assert_eq!(configs[0]["emoji"], "🌐");
    assert_eq!(configs[1]["name"], "recommended");
    assert_eq!(configs[1]["emoji"], "✅");

    let (_, rules) = send(
        &app.router,
        Method::GET,
        &format!("/api/linters/{eslint}/rules?q=eq"),
        None,
        None,
    )
    .await;
    assert_eq!(rules["total"], 1);
    assert_eq!(rules["items"][0]["name"], "eqeqeq");

    let (status, body) = send(&app.router, Method::GET, "/api/linters/424242", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app.router, Method::GET, "/api/linters/abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn related_linters_degrade_to_empty() {
    let app = app("routes-related").await;
    let (_, page) = send(&app.router, Method::GET, "/api/linters", None, None).await;
    let react = linter_id(&page, "eslint-plugin-react");

    let (status, related) = send(
        &app.router,
        Method::GET,
        &format!("/api/linters/{react}/related"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(related, json!([]));

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/linters/424242/related",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rule_and_package_search() {
    let app = app("routes-rules").await;

    let (status, page) = send(&app.router, Method::GET, "/api/rules?fixable=true", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["name"], "eqeqeq");

    let (_, page) = send(&app.router, Method::GET, "/api/rules?q=jsx", None, None).await;
    assert_eq!(page["total"], 2);

    let (_, packages) = send(&app.router, Method::GET, "/api/packages", None, None).await;
    assert_eq!(packages["total"], 3);
}

#[tokio::test]
async fn repository_lifecycle_requires_a_session() {
    let app = app("routes-repository").await;
    let (_, token) = session_for(&app.db, "alice").await;
    let add = json!({
        "name": "web",
        "fullName": "alice/web",
        "language": "TypeScript",
        "size": 120
    });

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        None,
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some("not-a-session"),
        Some(add.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, repo) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some(&token),
        Some(add),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repo["fullName"], "alice/web");
    assert_eq!(repo["language"], "TypeScript");

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some(&token),
        Some(json!({ "name": "api", "fullName": "alice/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some(&token),
        Some(json!({ "fullName": "alice/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, list) = send(&app.router, Method::GET, "/api/repositories", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    let (status, list) = send(&app.router, Method::GET, "/api/repositories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, snapshot) = send(
        &app.router,
        Method::GET,
        "/api/repositories/alice/web",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["repository"]["fullName"], "alice/web");
    assert_eq!(snapshot["localPackages"], json!([]));
    assert_eq!(snapshot["configViews"], json!([]));

    let remove = json!({ "fullName": "alice/web" });
    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:remove",
        Some(&token),
        Some(remove.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/api/repository:remove",
        Some(&token),
        Some(remove),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn repositories_of_other_users_are_invisible() {
    let app = app("routes-scope").await;
    let (_, alice) = session_for(&app.db, "alice").await;
    let (_, bob) = session_for(&app.db, "bob").await;

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some(&alice),
        Some(json!({ "name": "web", "fullName": "octo/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app.router,
        Method::GET,
        "/api/repositories/octo/web",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:remove",
        Some(&bob),
        Some(json!({ "fullName": "octo/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:refresh",
        Some(&bob),
        Some(json!({ "fullName": "octo/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app.router, Method::GET, "/api/repositories", Some(&alice), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn session_endpoint_and_signout() {
    let app = app("routes-session").await;
    let (user_id, token) = session_for(&app.db, "alice").await;

    let (status, body) = send(&app.router, Method::GET, "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id);

    let (status, _) = send(&app.router, Method::POST, "/auth/signout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app.router, Method::GET, "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], Value::Null);
}

#[tokio::test]
async fn expired_sessions_are_rejected() {
    let app = app("routes-expired").await;
    let user_id = sign_up(&app.db, "alice").await;
    let token = generate_session_token();
    app.db
        .create_session(user_id, token.clone(), Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let (_, body) = send(&app.router, Method::GET, "/api/session", Some(&token), None).await;
    assert_eq!(body["user"], Value::Null);

    let (status, _) = send(
        &app.router,
        Method::POST,
        "/api/repository:add",
        Some(&token),
        Some(json!({ "name": "web", "fullName": "alice/web" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unconfigured_sign_in_provider() {
    let app = app("routes-oauth").await;

    let (status, body) = send(&app.router, Method::GET, "/auth/github", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "UPSTREAM_NOT_CONFIGURED");

    let (status, _) = send(&app.router, Method::GET, "/auth/gitlab", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_endpoints_are_open_outside_production() {
    let app = app("routes-admin-dev").await;

    let (status, body) = send(&app.router, Method::POST, "/admin/summaries:clear", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "linters": 0, "rules": 0 }));

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/admin/catalog:import",
        None,
        Some(json!({ "linters": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["linters"], 0);
}

#[tokio::test]
async fn admin_endpoints_require_an_admin_in_production() {
    let mut config = Config::default();
    config.basic.environment = Environment::Production;
    // The first user of a fresh database.
    config.auth.admin_user_ids = vec![1];
    let app = app_with("routes-admin-prod", config).await;
    let (admin_id, admin_token) = session_for(&app.db, "root").await;
    assert_eq!(admin_id, 1);
    let (_, user_token) = session_for(&app.db, "alice").await;

    let (status, body) = send(&app.router, Method::POST, "/admin/derived:delete", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/admin/derived:delete",
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = send(
        &app.router,
        Method::POST,
        "/admin/derived:delete",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "localPackages": 0, "repositoriesReset": 0 }));
}

#[tokio::test]
async fn unknown_routes_return_404() {
    let app = app("routes-fallback").await;
    let (status, _) = send(&app.router, Method::GET, "/api/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
