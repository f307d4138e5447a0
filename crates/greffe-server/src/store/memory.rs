//! In-memory store backend.
//!
//! Backs the default server mode and the test suite. Raw records are kept
//! as JSON values so tests can seed malformed data and exercise the
//! boundary validation, exactly like a real object store would return it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use greffe_core::{Certificate, Template, TestRun};

use super::{ActivityEntry, ActivityLog, StoreError, TemplateStore};

#[derive(Default)]
struct Inner {
    templates: BTreeMap<String, serde_json::Value>,
    test_runs: Vec<TestRun>,
    certificates: Vec<Certificate>,
    activity: Vec<ActivityEntry>,
}

/// Shared in-memory store implementing both persistence traits.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a typed template.
    pub fn insert_template(&self, template: &Template) {
        let value = serde_json::to_value(template).expect("template serializes");
        self.inner
            .write()
            .templates
            .insert(template.id.clone(), value);
    }

    /// Seed a raw record, bypassing validation (for malformed-data tests
    /// and bulk loading).
    pub fn insert_raw(&self, id: impl Into<String>, record: serde_json::Value) {
        self.inner.write().templates.insert(id.into(), record);
    }

    /// Number of stored templates.
    pub fn template_count(&self) -> usize {
        self.inner.read().templates.len()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn fetch_raw(&self, id: &str) -> Result<serde_json::Value, StoreError> {
        self.inner
            .read()
            .templates
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("template {id}")))
    }

    async fn save_template(&self, template: &Template) -> Result<(), StoreError> {
        let value = serde_json::to_value(template)
            .map_err(|e| StoreError::Backend(format!("serialize template: {e}")))?;
        self.inner
            .write()
            .templates
            .insert(template.id.clone(), value);
        Ok(())
    }

    async fn append_test_run(&self, run: &TestRun) -> Result<(), StoreError> {
        self.inner.write().test_runs.push(run.clone());
        Ok(())
    }

    async fn test_runs(&self, template_id: &str) -> Result<Vec<TestRun>, StoreError> {
        Ok(self
            .inner
            .read()
            .test_runs
            .iter()
            .filter(|r| r.template_id == template_id)
            .cloned()
            .collect())
    }

    async fn append_certificate(&self, certificate: &Certificate) -> Result<(), StoreError> {
        self.inner.write().certificates.push(certificate.clone());
        Ok(())
    }

    async fn certificates(&self, template_id: &str) -> Result<Vec<Certificate>, StoreError> {
        Ok(self
            .inner
            .read()
            .certificates
            .iter()
            .filter(|c| c.template_id == template_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActivityLog for MemoryStore {
    async fn append(&self, entry: ActivityEntry) -> Result<(), StoreError> {
        self.inner.write().activity.push(entry);
        Ok(())
    }

    async fn entries_for(&self, template_id: &str) -> Result<Vec<ActivityEntry>, StoreError> {
        Ok(self
            .inner
            .read()
            .activity
            .iter()
            .filter(|e| e.template_id == template_id)
            .cloned()
            .collect())
    }
}
