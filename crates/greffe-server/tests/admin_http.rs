//! HTTP-level integration tests for the admin surface.
//!
//! These prove the deployed HTTP contract: bearer authentication, admin
//! gating, the auto-fix batch endpoint and the certification routes, all
//! against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use secrecy::SecretString;
use tower::ServiceExt;

use greffe_core::Template;
use greffe_server::auth::AdminAuth;
use greffe_server::certify::CertificationService;
use greffe_server::http::{build_router, AppState};
use greffe_server::remediation::RemediationService;
use greffe_server::store::{ActivityLog, MemoryStore};

const TEST_ADMIN_TOKEN: &str = "test-admin-token-for-http-tests";

// ── Test app builder ───────────────────────────────────────────

fn template(id: &str, content: &str, status: &str) -> Template {
    Template::from_yaml(&format!(
        r#"
id: {id:?}
code: "T-{id}"
content: {content:?}
required_variables:
  - name: "nom"
    type: text
    label: {{ fr: "Nom", en: "Name" }}
    required: true
status: {status}
"#
    ))
    .unwrap()
}

fn build_test_app() -> (Arc<MemoryStore>, axum::Router) {
    let store = Arc::new(MemoryStore::new());

    store.insert_template(&template("tpl-a", "Bonjour {{nom}} [TODO] {{date}}", "draft"));
    store.insert_raw(
        "tpl-bad",
        serde_json::json!({"id": "tpl-bad", "code": "T-bad"}),
    );
    store.insert_template(&template("tpl-c", "Bonjour {{nom}}", "verified"));

    let state = AppState {
        certification: Arc::new(CertificationService::new(store.clone(), store.clone())),
        remediation: Arc::new(RemediationService::new(store.clone(), store.clone())),
    };
    let auth = AdminAuth::new(SecretString::from(TEST_ADMIN_TOKEN.to_string()));

    (store.clone(), build_router(state, auth))
}

fn post_json(uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn autofix_body(ids: &[&str], dry_run: bool) -> serde_json::Value {
    serde_json::json!({
        "template_ids": ids,
        "fix_types": ["all"],
        "dry_run": dry_run,
    })
}

// ── Authentication ─────────────────────────────────────────────

#[tokio::test]
async fn test_missing_token_is_401() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            None,
            autofix_body(&["tpl-a"], true),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["ok"], serde_json::json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrong_token_is_403() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some("not-the-admin-token"),
            autofix_body(&["tpl-a"], true),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["ok"], serde_json::json!(false));
}

#[tokio::test]
async fn test_wrong_method_is_405_json() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(get_request(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body_json(response).await["ok"], serde_json::json!(false));
}

#[tokio::test]
async fn test_health_is_public() {
    let (_store, app) = build_test_app();
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ── Auto-fix endpoint ──────────────────────────────────────────

#[tokio::test]
async fn test_autofix_batch_isolates_failures() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
            autofix_body(&["tpl-a", "tpl-bad", "tpl-c"], false),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["ok"], serde_json::json!(true));
    assert_eq!(body["summary"]["total"], serde_json::json!(3));
    assert_eq!(body["summary"]["successful"], serde_json::json!(2));
    assert_eq!(body["summary"]["failed"], serde_json::json!(1));

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["template_id"], serde_json::json!("tpl-a"));
    assert_eq!(results[0]["success"], serde_json::json!(true));
    assert_eq!(results[1]["success"], serde_json::json!(false));
    assert_eq!(results[2]["success"], serde_json::json!(true));

    // tpl-a had a marker and an undeclared variable: both fixed.
    let fixes = results[0]["fixes_applied"].as_array().unwrap();
    assert!(fixes.contains(&serde_json::json!("Removed placeholders")));
    assert!(fixes.contains(&serde_json::json!("Added 1 missing variables to metadata")));
}

#[tokio::test]
async fn test_autofix_dry_run_reports_before_only() {
    let (store, app) = build_test_app();
    let response = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
            autofix_body(&["tpl-a"], true),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["summary"]["dry_run"], serde_json::json!(true));

    let result = &body["results"][0];
    assert_eq!(result["before"]["has_placeholders"], serde_json::json!(true));
    assert!(result["after"].is_null());

    // Nothing was written.
    let raw = serde_json::to_value(
        greffe_server::store::load_template(store.as_ref(), "tpl-a")
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(raw["status"], serde_json::json!("draft"));
}

#[tokio::test]
async fn test_autofix_twice_is_idempotent_over_http() {
    let (_store, app) = build_test_app();

    let first = app
        .clone()
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
            autofix_body(&["tpl-a"], false),
        ))
        .await
        .unwrap();
    let first_body = body_json(first).await;
    assert!(first_body["summary"]["total_fixes_applied"].as_u64().unwrap() > 0);

    let second = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
            autofix_body(&["tpl-a"], false),
        ))
        .await
        .unwrap();
    let second_body = body_json(second).await;
    assert_eq!(
        second_body["summary"]["total_fixes_applied"],
        serde_json::json!(0)
    );
}

#[tokio::test]
async fn test_autofix_empty_ids_is_400() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(post_json(
            "/admin/templates/autofix",
            Some(TEST_ADMIN_TOKEN),
            autofix_body(&[], false),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ── Certification endpoints ────────────────────────────────────

async fn record_clean_run(app: &axum::Router, template_id: &str) -> serde_json::Value {
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/admin/templates/{template_id}/certification/test"),
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({
                "admin_id": "admin-1",
                "test_values": {"nom": "Marie Dupont"},
                "rendered_result": "Bonjour Marie Dupont",
                "issues_found": [],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn test_certification_full_flow() {
    let (store, app) = build_test_app();

    let run = record_clean_run(&app, "tpl-c").await;
    let run_id = run["test_run"]["id"].as_str().unwrap().to_string();

    let approve = app
        .clone()
        .oneshot(post_json(
            "/admin/templates/tpl-c/certification/approve",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({
                "admin_id": "admin-1",
                "summary": "reviewed content and legal wording",
                "checklist": {"legal_wording": true},
                "test_run_ids": [run_id],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(approve.status(), StatusCode::OK);

    let publish = app
        .clone()
        .oneshot(post_json(
            "/admin/templates/tpl-c/certification/publish",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({"admin_id": "admin-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(publish.status(), StatusCode::OK);
    assert_eq!(
        body_json(publish).await["status"],
        serde_json::json!("published")
    );

    // Audit trail captured every transition in order.
    let actions: Vec<String> = store
        .entries_for("tpl-c")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["test", "approve", "publish"]);
}

#[tokio::test]
async fn test_approve_without_passing_run_is_409() {
    let (_store, app) = build_test_app();

    // Record a failing run only.
    let response = app
        .clone()
        .oneshot(post_json(
            "/admin/templates/tpl-c/certification/test",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({
                "admin_id": "admin-1",
                "rendered_result": "Bonjour",
                "issues_found": ["name missing from output"],
            }),
        ))
        .await
        .unwrap();
    let run_id = body_json(response).await["test_run"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let approve = app
        .oneshot(post_json(
            "/admin/templates/tpl-c/certification/approve",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({
                "admin_id": "admin-1",
                "summary": "s",
                "test_run_ids": [run_id],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(approve.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_publish_from_draft_is_409_and_unchanged() {
    let (store, app) = build_test_app();

    let publish = app
        .oneshot(post_json(
            "/admin/templates/tpl-a/certification/publish",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({"admin_id": "admin-1"}),
        ))
        .await
        .unwrap();
    assert_eq!(publish.status(), StatusCode::CONFLICT);

    let template = greffe_server::store::load_template(store.as_ref(), "tpl-a")
        .await
        .unwrap();
    assert_eq!(template.status, greffe_core::TemplateStatus::Draft);
}

#[tokio::test]
async fn test_reject_returns_to_draft() {
    let (_store, app) = build_test_app();

    let reject = app
        .clone()
        .oneshot(post_json(
            "/admin/templates/tpl-c/certification/reject",
            Some(TEST_ADMIN_TOKEN),
            serde_json::json!({
                "admin_id": "admin-1",
                "internal_notes": "salutation too informal",
                "issues_found": ["tone"],
            }),
        ))
        .await
        .unwrap();
    assert_eq!(reject.status(), StatusCode::OK);

    let body = body_json(reject).await;
    assert_eq!(body["status"], serde_json::json!("draft"));
    assert_eq!(body["verification_required"], serde_json::json!(true));
}

#[tokio::test]
async fn test_detail_route() {
    let (_store, app) = build_test_app();
    record_clean_run(&app, "tpl-c").await;

    let response = app
        .oneshot(get_request(
            "/admin/templates/tpl-c/certification",
            Some(TEST_ADMIN_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["template"]["id"], serde_json::json!("tpl-c"));
    assert_eq!(body["test_runs"].as_array().unwrap().len(), 1);
    assert_eq!(body["certificates"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_template_is_404() {
    let (_store, app) = build_test_app();
    let response = app
        .oneshot(get_request(
            "/admin/templates/absent/certification",
            Some(TEST_ADMIN_TOKEN),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
