//! Admin endpoint handlers.
//!
//! Thin layer: decode the request body, call the service, wrap the result
//! in `{ok: true, ...}`. All policy lives in the services.

use std::collections::BTreeMap;

use axum::extract::{Extension, Path};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use greffe_core::remediate::FixType;

use crate::error::AppError;
use crate::remediation::{BatchSummary, FixReport};

use super::AppState;

fn default_actor() -> String {
    "admin".to_string()
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

/// JSON 405 for wrong-method hits on admin routes.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

// ── Auto-fix ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AutofixRequest {
    pub template_ids: Vec<String>,
    pub fix_types: Vec<FixType>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_actor")]
    pub actor: String,
}

#[derive(Debug, Serialize)]
pub struct AutofixResponse {
    pub ok: bool,
    pub summary: BatchSummary,
    pub results: Vec<FixReport>,
}

pub async fn autofix(
    Extension(state): Extension<AppState>,
    Json(req): Json<AutofixRequest>,
) -> Result<Json<AutofixResponse>, AppError> {
    if req.template_ids.is_empty() {
        return Err(AppError::BadRequest(
            "template_ids must not be empty".to_string(),
        ));
    }
    if req.fix_types.is_empty() {
        return Err(AppError::BadRequest(
            "fix_types must not be empty".to_string(),
        ));
    }

    let outcome = state
        .remediation
        .fix_batch(&req.actor, &req.template_ids, &req.fix_types, req.dry_run)
        .await;

    Ok(Json(AutofixResponse {
        ok: true,
        summary: outcome.summary,
        results: outcome.results,
    }))
}

// ── Certification ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TestRunRequest {
    pub admin_id: String,
    #[serde(default)]
    pub test_values: BTreeMap<String, String>,
    pub rendered_result: String,
    #[serde(default)]
    pub issues_found: Vec<String>,
}

pub async fn record_test_run(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TestRunRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let run = state
        .certification
        .record_test_run(
            &req.admin_id,
            &id,
            req.test_values,
            req.rendered_result,
            req.issues_found,
        )
        .await?;

    Ok(Json(serde_json::json!({"ok": true, "test_run": run})))
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub admin_id: String,
    pub summary: String,
    #[serde(default)]
    pub checklist: BTreeMap<String, bool>,
    pub test_run_ids: Vec<Uuid>,
}

pub async fn approve(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let certificate = state
        .certification
        .approve(&req.admin_id, &id, req.summary, req.checklist, req.test_run_ids)
        .await?;

    Ok(Json(serde_json::json!({"ok": true, "certificate": certificate})))
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub admin_id: String,
    pub internal_notes: String,
    #[serde(default)]
    pub issues_found: Vec<String>,
}

pub async fn reject(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let template = state
        .certification
        .reject(&req.admin_id, &id, req.internal_notes, req.issues_found)
        .await?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "status": template.status,
        "verification_required": template.verification_required,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default = "default_actor")]
    pub admin_id: String,
}

pub async fn publish(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let template = state.certification.publish(&req.admin_id, &id).await?;

    Ok(Json(serde_json::json!({"ok": true, "status": template.status})))
}

pub async fn certification_detail(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let detail = state.certification.detail(&id).await?;

    Ok(Json(serde_json::json!({
        "ok": true,
        "template": detail.template,
        "test_runs": detail.test_runs,
        "certificates": detail.certificates,
    })))
}
