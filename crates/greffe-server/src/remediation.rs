//! Batch remediation over the store.
//!
//! Applies `greffe_core::remediate` to stored templates, one id at a time,
//! in request order. Item failures are isolated: a malformed or missing
//! template marks its own entry as failed and the batch moves on. Only a
//! persistence failure aborts an item after its fixes computed.

use std::sync::Arc;

use serde::Serialize;

use greffe_core::remediate::{remediate, FixType, TemplateSnapshot};

use crate::store::{load_template, ActivityEntry, ActivityLog, TemplateStore};

/// Per-template fix report, one entry per requested id.
#[derive(Debug, Serialize)]
pub struct FixReport {
    pub template_id: String,
    pub template_code: Option<String>,
    pub success: bool,
    pub fixes_applied: Vec<String>,
    pub errors: Vec<String>,
    pub before: Option<TemplateSnapshot>,
    pub after: Option<TemplateSnapshot>,
}

impl FixReport {
    fn failed(template_id: &str, error: String) -> Self {
        Self {
            template_id: template_id.to_string(),
            template_code: None,
            success: false,
            fixes_applied: Vec::new(),
            errors: vec![error],
            before: None,
            after: None,
        }
    }
}

/// Aggregate view over one batch.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_fixes_applied: usize,
    pub dry_run: bool,
}

/// A full batch result: one report per input id plus the summary.
#[derive(Debug, Serialize)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub results: Vec<FixReport>,
}

/// The remediation service.
pub struct RemediationService {
    store: Arc<dyn TemplateStore>,
    activity: Arc<dyn ActivityLog>,
}

impl RemediationService {
    pub fn new(store: Arc<dyn TemplateStore>, activity: Arc<dyn ActivityLog>) -> Self {
        Self { store, activity }
    }

    /// Remediate one stored template. Never returns an error; failures are
    /// reported in the `FixReport` itself.
    pub async fn fix_template(
        &self,
        actor: &str,
        template_id: &str,
        fix_types: &[FixType],
        dry_run: bool,
    ) -> FixReport {
        let template = match load_template(self.store.as_ref(), template_id).await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(template_id, error = %e, "remediation skipped template");
                return FixReport::failed(template_id, e.to_string());
            }
        };

        let outcome = remediate(&template, fix_types, dry_run);
        let mut errors = outcome.errors.clone();
        let mut success = errors.is_empty();

        if !dry_run && success && !outcome.fixes_applied.is_empty() {
            let fixed = outcome.apply_to(&template);
            if let Err(e) = self.store.save_template(&fixed).await {
                errors.push(format!("persist failed: {e}"));
                success = false;
            } else if let Err(e) = self
                .activity
                .append(ActivityEntry::new(
                    actor,
                    "autofix",
                    template_id,
                    serde_json::json!({
                        "fixes_applied": outcome.fixes_applied,
                        "status": fixed.status.as_str(),
                    }),
                ))
                .await
            {
                errors.push(format!("audit append failed: {e}"));
                success = false;
            }
        }

        FixReport {
            template_id: template_id.to_string(),
            template_code: Some(template.code.clone()),
            success,
            fixes_applied: outcome.fixes_applied,
            errors,
            before: Some(outcome.before),
            after: outcome.after,
        }
    }

    /// Remediate a list of templates sequentially, in request order, so the
    /// audit trail matches the request and one slow or failing template
    /// cannot corrupt a sibling's result.
    pub async fn fix_batch(
        &self,
        actor: &str,
        template_ids: &[String],
        fix_types: &[FixType],
        dry_run: bool,
    ) -> BatchOutcome {
        let mut results = Vec::with_capacity(template_ids.len());
        for id in template_ids {
            results.push(self.fix_template(actor, id, fix_types, dry_run).await);
        }

        let successful = results.iter().filter(|r| r.success).count();
        let total_fixes_applied = results.iter().map(|r| r.fixes_applied.len()).sum();

        BatchOutcome {
            summary: BatchSummary {
                total: results.len(),
                successful,
                failed: results.len() - successful,
                total_fixes_applied,
                dry_run,
            },
            results,
        }
    }
}
