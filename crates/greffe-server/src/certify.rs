//! Certification state machine.
//!
//! `draft -> verified -> certified -> published`, with `reject` returning a
//! draft or verified template to draft. All transitions are admin-invoked
//! and all-or-nothing: a failed precondition mutates nothing. Every
//! transition is appended to the activity log.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use greffe_core::reconcile::reconcile_template;
use greffe_core::{Certificate, Template, TemplateStatus, TestRun};

use crate::store::{load_template, ActivityEntry, ActivityLog, LoadError, StoreError, TemplateStore};

/// Errors from certification transitions.
#[derive(Error, Debug)]
pub enum CertifyError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Malformed template record: {0}")]
    Malformed(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<LoadError> for CertifyError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::Store(StoreError::NotFound(what)) => CertifyError::NotFound(what),
            LoadError::Store(other) => CertifyError::Store(other),
            LoadError::Malformed(inner) => CertifyError::Malformed(inner.to_string()),
        }
    }
}

/// Everything an admin sees about one template's certification state.
#[derive(Debug, Serialize)]
pub struct CertificationDetail {
    pub template: Template,
    pub test_runs: Vec<TestRun>,
    pub certificates: Vec<Certificate>,
}

/// The certification workflow service.
pub struct CertificationService {
    store: Arc<dyn TemplateStore>,
    activity: Arc<dyn ActivityLog>,
}

impl CertificationService {
    pub fn new(store: Arc<dyn TemplateStore>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { store, activity }
    }

    /// Record one admin test of a template. Never changes status.
    pub async fn record_test_run(
        &self,
        actor: &str,
        template_id: &str,
        test_values: BTreeMap<String, String>,
        rendered_result: String,
        issues_found: Vec<String>,
    ) -> Result<TestRun, CertifyError> {
        let template = load_template(self.store.as_ref(), template_id).await?;

        let run = TestRun::new(
            &template.id,
            actor,
            test_values,
            rendered_result,
            issues_found,
        );
        self.store.append_test_run(&run).await?;

        self.activity
            .append(ActivityEntry::new(
                actor,
                "test",
                template_id,
                serde_json::json!({
                    "test_run_id": run.id,
                    "issues_found": run.issues_found.len(),
                }),
            ))
            .await?;

        tracing::info!(template = %template.code, passed = run.passed(), "test run recorded");
        Ok(run)
    }

    /// Approve: create a certificate and move the template to `certified`.
    ///
    /// Requires at least one referenced test run with no issues.
    pub async fn approve(
        &self,
        actor: &str,
        template_id: &str,
        summary: String,
        checklist: BTreeMap<String, bool>,
        test_run_ids: Vec<Uuid>,
    ) -> Result<Certificate, CertifyError> {
        let mut template = load_template(self.store.as_ref(), template_id).await?;

        if template.status == TemplateStatus::Published {
            return Err(CertifyError::Precondition(
                "approve is not valid on a published template".to_string(),
            ));
        }

        let runs = self.store.test_runs(template_id).await?;
        let has_passing_run = runs
            .iter()
            .any(|r| test_run_ids.contains(&r.id) && r.passed());
        if !has_passing_run {
            return Err(CertifyError::Precondition(
                "approve requires at least one referenced test run with no issues".to_string(),
            ));
        }

        let certificate = Certificate::new(template_id, actor, summary, checklist, test_run_ids);
        self.store.append_certificate(&certificate).await?;

        template.status = TemplateStatus::Certified;
        self.store.save_template(&template).await?;

        self.activity
            .append(ActivityEntry::new(
                actor,
                "approve",
                template_id,
                serde_json::json!({
                    "certificate_id": certificate.id,
                    "test_runs_included": certificate.test_runs_included,
                }),
            ))
            .await?;

        tracing::info!(template = %template.code, "template certified");
        Ok(certificate)
    }

    /// Reject: record notes, require re-verification, return to draft.
    /// Only valid before certification; published templates must be
    /// degraded by external means first.
    pub async fn reject(
        &self,
        actor: &str,
        template_id: &str,
        internal_notes: String,
        issues_found: Vec<String>,
    ) -> Result<Template, CertifyError> {
        let mut template = load_template(self.store.as_ref(), template_id).await?;

        if !matches!(
            template.status,
            TemplateStatus::Draft | TemplateStatus::Verified
        ) {
            return Err(CertifyError::Precondition(format!(
                "reject is only valid from draft or verified, not {}",
                template.status.as_str()
            )));
        }

        template.status = TemplateStatus::Draft;
        template.verification_required = true;
        self.store.save_template(&template).await?;

        self.activity
            .append(ActivityEntry::new(
                actor,
                "reject",
                template_id,
                serde_json::json!({
                    "internal_notes": internal_notes,
                    "issues_found": issues_found,
                }),
            ))
            .await?;

        tracing::info!(template = %template.code, "template rejected back to draft");
        Ok(template)
    }

    /// Publish a certified template.
    ///
    /// Gated three ways: status must be `certified`, a certificate must
    /// exist, and the content must declare every variable it uses (the
    /// no-orphan invariant for published templates).
    pub async fn publish(&self, actor: &str, template_id: &str) -> Result<Template, CertifyError> {
        let mut template = load_template(self.store.as_ref(), template_id).await?;

        if template.status != TemplateStatus::Certified {
            return Err(CertifyError::Precondition(format!(
                "publish requires certified status, template is {}",
                template.status.as_str()
            )));
        }

        if self.store.certificates(template_id).await?.is_empty() {
            return Err(CertifyError::Precondition(
                "publish requires a certificate on record".to_string(),
            ));
        }

        let reconciliation = reconcile_template(&template);
        if !reconciliation.is_consistent() {
            return Err(CertifyError::Precondition(format!(
                "content references undeclared variables: {}",
                reconciliation.missing.join(", ")
            )));
        }

        template.status = TemplateStatus::Published;
        self.store.save_template(&template).await?;

        self.activity
            .append(ActivityEntry::new(
                actor,
                "publish",
                template_id,
                serde_json::json!({}),
            ))
            .await?;

        tracing::info!(template = %template.code, "template published");
        Ok(template)
    }

    /// The GET detail view: template plus its runs and certificates.
    pub async fn detail(&self, template_id: &str) -> Result<CertificationDetail, CertifyError> {
        let template = load_template(self.store.as_ref(), template_id).await?;
        let test_runs = self.store.test_runs(template_id).await?;
        let certificates = self.store.certificates(template_id).await?;
        Ok(CertificationDetail {
            template,
            test_runs,
            certificates,
        })
    }
}
