//! # greffe-core
//!
//! Deterministic template variable & certification pipeline.
//!
//! This crate holds the pure logic of Greffe, answering:
//! - Which variables does this template's markup actually reference?
//! - Does the declared field schema cover them, and if not, how is it fixed?
//! - What should a free-text request be classified as?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No I/O**: Extraction, reconciliation, remediation, classification
//!    and wizard transitions are in-memory computations
//! 3. **Total extraction**: malformed markup never fails, it is skipped
//! 4. **Idempotent remediation**: re-remediating fixed output is a no-op
//!
//! ## Example
//!
//! ```rust,ignore
//! use greffe_core::{remediate, FixType, Template};
//!
//! let template = Template::from_yaml_file("recours_visa.yaml")?;
//! let outcome = remediate(&template, &[FixType::All], false);
//!
//! for fix in &outcome.fixes_applied {
//!     println!("applied: {fix}");
//! }
//! ```

pub mod classify;
pub mod extract;
pub mod patterns;
pub mod reconcile;
pub mod records;
pub mod remediate;
pub mod template;
pub mod wizard;

// Re-export main types at crate root
pub use classify::{
    classify, needs_clarification, Authority, ClassificationResult, DocumentType,
    GENERIC_FALLBACK_HINT,
};
pub use extract::{extract_variables, extract_variables_ordered};
pub use reconcile::{reconcile, Reconciliation};
pub use records::{Certificate, TestRun};
pub use remediate::{remediate, FixType, RemediationOutcome, TemplateSnapshot};
pub use template::{
    FieldDefinition, FieldType, LocalizedText, Template, TemplateError, TemplateStatus,
};
pub use wizard::{ValidationError, WizardSession, WizardStep};
