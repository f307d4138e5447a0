//! Router construction for the admin service.

use std::sync::Arc;

use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Extension, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, AdminAuth};
use crate::certify::CertificationService;
use crate::remediation::RemediationService;

pub mod handlers;

/// Services shared by the handlers.
#[derive(Clone)]
pub struct AppState {
    pub certification: Arc<CertificationService>,
    pub remediation: Arc<RemediationService>,
}

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState, auth: AdminAuth) -> Router {
    // Routes that require the admin bearer token
    let admin = Router::new()
        .route(
            "/admin/templates/autofix",
            post(handlers::autofix).fallback(handlers::method_not_allowed),
        )
        .route(
            "/admin/templates/:id/certification",
            get(handlers::certification_detail).fallback(handlers::method_not_allowed),
        )
        .route(
            "/admin/templates/:id/certification/test",
            post(handlers::record_test_run).fallback(handlers::method_not_allowed),
        )
        .route(
            "/admin/templates/:id/certification/approve",
            post(handlers::approve).fallback(handlers::method_not_allowed),
        )
        .route(
            "/admin/templates/:id/certification/reject",
            post(handlers::reject).fallback(handlers::method_not_allowed),
        )
        .route(
            "/admin/templates/:id/certification/publish",
            post(handlers::publish).fallback(handlers::method_not_allowed),
        )
        .layer(axum_mw::from_fn(require_admin))
        .layer(Extension(auth));

    // Public routes (no auth)
    let public = Router::new().route("/health", get(handlers::health));

    public
        .merge(admin)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
