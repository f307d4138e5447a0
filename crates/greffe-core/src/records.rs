//! Certification records: test runs and certificates.
//!
//! These are the durable artifacts the certification workflow produces.
//! A template may only be published once at least one certificate exists
//! that references at least one clean test run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One admin test of a template: the values fed in, what came out, and
/// any issues the admin observed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    pub id: Uuid,
    pub template_id: String,
    pub admin_id: String,

    /// Variable values used for the test render
    pub test_values: BTreeMap<String, String>,

    /// The rendered document produced by the external renderer
    pub rendered_result: String,

    /// Issues the admin flagged; empty means the run passed
    #[serde(default)]
    pub issues_found: Vec<String>,

    pub created_at: DateTime<Utc>,
}

impl TestRun {
    pub fn new(
        template_id: impl Into<String>,
        admin_id: impl Into<String>,
        test_values: BTreeMap<String, String>,
        rendered_result: impl Into<String>,
        issues_found: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: template_id.into(),
            admin_id: admin_id.into(),
            test_values,
            rendered_result: rendered_result.into(),
            issues_found,
            created_at: Utc::now(),
        }
    }

    /// A run passes when the admin flagged no issues.
    pub fn passed(&self) -> bool {
        self.issues_found.is_empty()
    }
}

/// An admin-issued attestation that a template passed certification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub template_id: String,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,

    /// Free-text summary of the approval
    pub summary: String,

    /// Named checks the admin confirmed (content review, legal wording, ...)
    #[serde(default)]
    pub checklist: BTreeMap<String, bool>,

    /// The test runs this certificate rests on
    pub test_runs_included: Vec<Uuid>,
}

impl Certificate {
    pub fn new(
        template_id: impl Into<String>,
        approved_by: impl Into<String>,
        summary: impl Into<String>,
        checklist: BTreeMap<String, bool>,
        test_runs_included: Vec<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            template_id: template_id.into(),
            approved_by: approved_by.into(),
            approved_at: Utc::now(),
            summary: summary.into(),
            checklist,
            test_runs_included,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_passed() {
        let run = TestRun::new("tpl-1", "admin-1", BTreeMap::new(), "rendered", vec![]);
        assert!(run.passed());

        let failed = TestRun::new(
            "tpl-1",
            "admin-1",
            BTreeMap::new(),
            "rendered",
            vec!["date format wrong".to_string()],
        );
        assert!(!failed.passed());
    }

    #[test]
    fn test_certificate_serialization_round_trip() {
        let mut checklist = BTreeMap::new();
        checklist.insert("legal_wording".to_string(), true);

        let cert = Certificate::new("tpl-1", "admin-1", "Looks correct", checklist, vec![]);
        let json = serde_json::to_string(&cert).unwrap();
        let back: Certificate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.template_id, "tpl-1");
        assert_eq!(back.checklist.get("legal_wording"), Some(&true));
    }
}
