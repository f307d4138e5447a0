//! Variable extraction from template markup.
//!
//! Extraction is best-effort and total: malformed fragments are skipped,
//! never reported as errors. The generator only ever fails at render time
//! on a placeholder the schema does not declare, so this is the single
//! source of truth for "which variables does this markup reference".

use std::collections::BTreeSet;

use crate::patterns::{is_reserved_helper, CANDIDATE_PATTERN, TOKEN_PATTERN};

/// Extract the deduplicated set of variable names referenced by placeholder
/// tokens in the markup.
///
/// Rules:
/// - tokens wrapped in double braces are candidates;
/// - a token starting with `/` closes a block and carries no variables;
/// - a token starting with `#` opens a block: the helper word itself is not
///   a variable, but its arguments are candidates (`{{#if client.vip}}`
///   references `client.vip`);
/// - a multi-word body is split on whitespace, each identifier-or-dotted-path
///   word is a candidate unless it is a reserved helper name;
/// - a dotted path whose head segment is reserved (`this.nom`) is
///   iteration-scope access, not a template variable.
pub fn extract_variables(content: &str) -> BTreeSet<String> {
    extract_variables_ordered(content).into_iter().collect()
}

/// Same extraction, preserving first-seen order. Callers that only need
/// membership should use [`extract_variables`]; order is an internal detail.
pub fn extract_variables_ordered(content: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();

    for caps in TOKEN_PATTERN.captures_iter(content) {
        let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if body.is_empty() {
            continue;
        }

        // Block close: {{/if}} — no variables.
        if body.starts_with('/') {
            continue;
        }

        // Block open: {{#each pieces}} — drop the helper word, keep arguments.
        let words: Vec<&str> = if let Some(rest) = body.strip_prefix('#') {
            rest.split_whitespace().skip(1).collect()
        } else {
            body.split_whitespace().collect()
        };

        for word in words {
            if !CANDIDATE_PATTERN.is_match(word) {
                // Quoted literals, numbers, stray syntax: skipped, not errors.
                continue;
            }
            if is_reserved_helper(word) {
                continue;
            }
            let head = word.split('.').next().unwrap_or(word);
            if is_reserved_helper(head) {
                continue;
            }
            if seen.insert(word.to_string()) {
                ordered.push(word.to_string());
            }
        }
    }

    ordered
}
