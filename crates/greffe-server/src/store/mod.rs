//! Persistence traits and records.
//!
//! The pipeline reads and writes template records through these traits so
//! the pure core stays store-free and the services are testable against
//! the in-memory backend. Records come back as loosely typed JSON and are
//! validated at this boundary before anything trusts them.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use greffe_core::{Certificate, Template, TemplateError, TestRun};

pub use memory::MemoryStore;

/// Errors from the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    Backend(String),
}

/// Errors from loading a typed template out of the store.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed template record: {0}")]
    Malformed(#[from] TemplateError),
}

/// Template persistence, reachable by id. Last write wins; there is no
/// locking discipline for concurrent admin edits.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Fetch the raw record as stored, without validation.
    async fn fetch_raw(&self, id: &str) -> Result<serde_json::Value, StoreError>;

    /// Persist a template record.
    async fn save_template(&self, template: &Template) -> Result<(), StoreError>;

    async fn append_test_run(&self, run: &TestRun) -> Result<(), StoreError>;
    async fn test_runs(&self, template_id: &str) -> Result<Vec<TestRun>, StoreError>;

    async fn append_certificate(&self, certificate: &Certificate) -> Result<(), StoreError>;
    async fn certificates(&self, template_id: &str) -> Result<Vec<Certificate>, StoreError>;
}

/// Fetch a record and validate it into the typed model.
pub async fn load_template(store: &dyn TemplateStore, id: &str) -> Result<Template, LoadError> {
    let raw = store.fetch_raw(id).await?;
    Ok(Template::from_value(raw)?)
}

/// One line of the append-only activity record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor: String,
    pub action: String,
    pub template_id: String,
    pub at: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl ActivityEntry {
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        template_id: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: actor.into(),
            action: action.into(),
            template_id: template_id.into(),
            at: Utc::now(),
            details,
        }
    }
}

/// Append-only audit trail. Every admin transition lands here; this is a
/// required side effect of the workflow, not optional instrumentation.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn append(&self, entry: ActivityEntry) -> Result<(), StoreError>;
    async fn entries_for(&self, template_id: &str) -> Result<Vec<ActivityEntry>, StoreError>;
}
