//! Reconciliation of used variables against the declared field schema.
//!
//! The only mismatch the pipeline protects against is the generator hitting
//! an undeclared placeholder at render time. Declared-but-unused fields are
//! schema bloat, tolerated and not flagged.

use std::collections::BTreeSet;

use crate::template::Template;

/// Result of reconciling markup usage against declared fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Variables referenced in content but absent from the declared schema.
    /// These are the orphan placeholders that would break rendering.
    pub missing: Vec<String>,
}

impl Reconciliation {
    /// True when every used variable is declared.
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compute `missing = vars_used − declared`.
pub fn reconcile(vars_used: &BTreeSet<String>, declared: &BTreeSet<String>) -> Reconciliation {
    Reconciliation {
        missing: vars_used.difference(declared).cloned().collect(),
    }
}

/// Reconcile a template's own content against its own declared fields.
pub fn reconcile_template(template: &Template) -> Reconciliation {
    let vars_used = crate::extract::extract_variables(&template.content);
    reconcile(&vars_used, &template.declared_names())
}
