//! Auto-remediation of template markup and metadata.
//!
//! Two families of fixes:
//! - strip editorial placeholder markers authors left in the markup;
//! - synthesize optional field definitions for variables the markup uses
//!   but the schema does not declare.
//!
//! Remediation is a pure computation over a template record. Persisting the
//! fixed record is the caller's concern; `dry_run` merely controls whether
//! the `after` snapshot is reported. Applying remediation to its own output
//! is a no-op: no new fixes, no new orphans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::{
    contains_editorial_markers, BRACKET_MARKER_PATTERN, LABEL_MARKER_PATTERN,
    RUN_ON_SPACE_PATTERN, SPACE_BEFORE_PUNCT_PATTERN, TOKEN_MARKER_PATTERN,
};
use crate::reconcile::reconcile;
use crate::template::{FieldDefinition, FieldType, LocalizedText, Template, TemplateStatus};

/// Which fixes to apply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    /// Strip editorial placeholder markers from the content
    Placeholders,
    /// Declare variables the content uses but the schema omits
    UnknownVars,
    /// Synonym of `UnknownVars` kept for the admin API surface
    Metadata,
    /// Everything
    All,
}

impl FixType {
    fn selected(fixes: &[FixType], which: FixType) -> bool {
        fixes.iter().any(|f| *f == which || *f == FixType::All)
    }
}

/// Pre- or post-fix view of the template, for the admin report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateSnapshot {
    pub has_placeholders: bool,
    pub missing_variables: Vec<String>,
    pub status: TemplateStatus,
}

impl TemplateSnapshot {
    fn capture(content: &str, template: &Template, optional: &[FieldDefinition]) -> Self {
        let vars_used = crate::extract::extract_variables(content);
        let declared = template
            .required_variables
            .iter()
            .chain(optional.iter())
            .map(|f| f.name.clone())
            .collect();
        Self {
            has_placeholders: contains_editorial_markers(content),
            missing_variables: reconcile(&vars_used, &declared).missing,
            status: template.status,
        }
    }
}

/// Result of one remediation pass over one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationOutcome {
    /// The (possibly cleaned) markup
    pub content: String,
    pub required_variables: Vec<FieldDefinition>,
    pub optional_variables: Vec<FieldDefinition>,
    pub status: TemplateStatus,

    /// Human-readable description of each fix that ran
    pub fixes_applied: Vec<String>,

    /// Per-fix failures; a failed fix never blocks the others
    pub errors: Vec<String>,

    /// State before any fix ran
    pub before: TemplateSnapshot,

    /// State after fixes; populated only when not a dry run
    pub after: Option<TemplateSnapshot>,

    /// Stamped when the pass promoted the template to `Verified`
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl RemediationOutcome {
    /// Build the fixed template record from the original.
    pub fn apply_to(&self, original: &Template) -> Template {
        let mut fixed = original.clone();
        fixed.content = self.content.clone();
        fixed.required_variables = self.required_variables.clone();
        fixed.optional_variables = self.optional_variables.clone();
        fixed.status = self.status;
        if let Some(at) = self.last_verified_at {
            fixed.last_verified_at = Some(at);
            fixed.verification_required = false;
        }
        fixed
    }
}

/// Apply the selected fixes to a template record.
///
/// Every fix is isolated: a failure in one fix type lands in `errors` and
/// the remaining fix types still run. The status promotion to `Verified` is
/// the only automatic status transition the pipeline performs, and it only
/// happens when at least one fix applied and none errored.
pub fn remediate(template: &Template, fix_types: &[FixType], dry_run: bool) -> RemediationOutcome {
    let before = TemplateSnapshot::capture(
        &template.content,
        template,
        &template.optional_variables,
    );

    let mut content = template.content.clone();
    let mut optional_variables = template.optional_variables.clone();
    let mut status = template.status;
    let mut fixes_applied = Vec::new();
    let mut errors = Vec::new();

    if FixType::selected(fix_types, FixType::Placeholders) {
        match strip_editorial_markers(&content) {
            Ok(Some(cleaned)) => {
                content = cleaned;
                fixes_applied.push("Removed placeholders".to_string());
            }
            Ok(None) => {}
            Err(e) => errors.push(format!("placeholders: {e}")),
        }
    }

    let wants_metadata = FixType::selected(fix_types, FixType::Metadata)
        || FixType::selected(fix_types, FixType::UnknownVars);
    if wants_metadata {
        match synthesize_missing_fields(&content, template, &optional_variables) {
            Ok(added) if !added.is_empty() => {
                let count = added.len();
                optional_variables.extend(added);
                fixes_applied.push(format!("Added {count} missing variables to metadata"));
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("metadata: {e}")),
        }
    }

    let mut last_verified_at = None;
    if !fixes_applied.is_empty() && errors.is_empty() {
        status = TemplateStatus::Verified;
        last_verified_at = Some(Utc::now());
        fixes_applied.push("Updated status to verified".to_string());
        tracing::info!(
            template = %template.code,
            fixes = fixes_applied.len() - 1,
            "template auto-verified after remediation"
        );
    }

    let after = if dry_run {
        None
    } else {
        let mut view = TemplateSnapshot::capture(&content, template, &optional_variables);
        view.status = status;
        Some(view)
    };

    RemediationOutcome {
        content,
        required_variables: template.required_variables.clone(),
        optional_variables,
        status,
        fixes_applied,
        errors,
        before,
        after,
        last_verified_at,
    }
}

/// Strip editorial markers, collapsing the whitespace left behind.
///
/// Returns `Ok(None)` when the content carried no markers. Stripping runs
/// to a fixpoint so that marker text uncovered by a removal is itself
/// removed in the same pass.
fn strip_editorial_markers(content: &str) -> Result<Option<String>, String> {
    if !contains_editorial_markers(content) {
        return Ok(None);
    }

    let mut cleaned = content.to_string();
    // Bounded: each round strictly shrinks the text.
    while contains_editorial_markers(&cleaned) {
        let next = TOKEN_MARKER_PATTERN.replace_all(&cleaned, "").to_string();
        let next = BRACKET_MARKER_PATTERN.replace_all(&next, "").to_string();
        let next = LABEL_MARKER_PATTERN.replace_all(&next, "").to_string();
        if next == cleaned {
            return Err("marker stripping did not converge".to_string());
        }
        cleaned = next;
    }

    let cleaned = RUN_ON_SPACE_PATTERN.replace_all(&cleaned, " ").to_string();
    let cleaned = SPACE_BEFORE_PUNCT_PATTERN
        .replace_all(&cleaned, "$1")
        .to_string();

    Ok(Some(cleaned))
}

/// Synthesize an optional text field for every variable the content uses
/// but the schema does not declare.
fn synthesize_missing_fields(
    content: &str,
    template: &Template,
    optional_variables: &[FieldDefinition],
) -> Result<Vec<FieldDefinition>, String> {
    let vars_used = crate::extract::extract_variables(content);
    let declared = template
        .required_variables
        .iter()
        .chain(optional_variables.iter())
        .map(|f| f.name.clone())
        .collect();

    let mut added = Vec::new();
    for name in reconcile(&vars_used, &declared).missing {
        let field = FieldDefinition {
            name: name.clone(),
            field_type: FieldType::Text,
            label: LocalizedText::uniform(&name),
            required: false,
            placeholder_hint: LocalizedText {
                fr: format!("Saisir {name}"),
                en: format!("Enter {name}"),
            },
        };
        field.validate().map_err(|e| e.to_string())?;
        added.push(field);
    }

    Ok(added)
}
