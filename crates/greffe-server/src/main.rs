//! greffe-server — standalone admin REST server.
//!
//! Reads config from env vars:
//!   GREFFE_ADMIN_TOKEN — bearer token carrying the admin role (required)
//!   GREFFE_BIND_ADDR   — listen address (default: 0.0.0.0:4700)
//!   GREFFE_SEED_FILE   — optional YAML file with template records to load

use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;
use tokio::net::TcpListener;

use greffe_core::Template;
use greffe_server::auth::AdminAuth;
use greffe_server::certify::CertificationService;
use greffe_server::http::{build_router, AppState};
use greffe_server::remediation::RemediationService;
use greffe_server::store::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,greffe_server=debug".into()),
        )
        .init();

    let admin_token =
        std::env::var("GREFFE_ADMIN_TOKEN").context("GREFFE_ADMIN_TOKEN must be set")?;
    let bind_addr = std::env::var("GREFFE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4700".into());

    let store = Arc::new(MemoryStore::new());
    if let Ok(path) = std::env::var("GREFFE_SEED_FILE") {
        seed_templates(&store, &path)?;
    }

    let state = AppState {
        certification: Arc::new(CertificationService::new(store.clone(), store.clone())),
        remediation: Arc::new(RemediationService::new(store.clone(), store.clone())),
    };
    let auth = AdminAuth::new(SecretString::from(admin_token));

    let app = build_router(state, auth);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    tracing::info!("greffe-server listening on {bind_addr}");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Load template records from a YAML file (a list of records). Each record
/// goes through the same boundary validation the store path uses.
fn seed_templates(store: &MemoryStore, path: &str) -> anyhow::Result<()> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let records: Vec<serde_yaml::Value> = serde_yaml::from_str(&contents)?;

    for record in records {
        let json = serde_json::to_value(&record)?;
        let template =
            Template::from_value(json).map_err(|e| anyhow::anyhow!("invalid seed template: {e}"))?;
        store.insert_template(&template);
    }

    tracing::info!(count = store.template_count(), path, "seeded templates");
    Ok(())
}
