//! Intent classification of free-text requests.
//!
//! **Question**: which document family does the user need, and how sure
//! are we?
//!
//! Classification is a total, deterministic function: an ordered keyword
//! rule list evaluated first-match-wins, not a trained model. Confidence
//! expresses the matched rule's specificity, not a statistical probability.

mod rules;

use serde::{Deserialize, Serialize};

pub use rules::{ClassifierRule, RULES};

/// Hint attached when no rule matched and the generic fallback applied.
pub const GENERIC_FALLBACK_HINT: &str = "GENERIC_FALLBACK";

/// Confidence below which a consumer should ask a clarifying question.
pub const CLARIFICATION_THRESHOLD: f64 = 0.7;

/// Supported document families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    VisaRefusalAppeal,
    ResidencePermitRequest,
    FamilyReunification,
    NaturalizationRequest,
    AccommodationCertificate,
    WorkPermitRequest,
    Generic,
}

impl DocumentType {
    /// Whether a document of this family is always addressed to a specific
    /// authority that must be known before drafting.
    pub fn requires_authority(&self) -> bool {
        matches!(self, DocumentType::VisaRefusalAppeal)
    }
}

/// Administrative authorities a document can be addressed to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Authority {
    Consulate,
    Prefecture,
    TownHall,
    AdministrativeTribunal,
}

impl Authority {
    /// Wire-form label, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::Consulate => "consulate",
            Authority::Prefecture => "prefecture",
            Authority::TownHall => "town_hall",
            Authority::AdministrativeTribunal => "administrative_tribunal",
        }
    }
}

/// Outcome of classifying one free-text input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub input_text: String,
    pub document_type: DocumentType,
    pub sub_type: Option<String>,
    pub authority: Option<Authority>,
    pub confidence: f64,
    pub hints: Vec<String>,
    pub suggested_template_id: Option<String>,
}

/// Normalize free text for keyword matching: lowercase, diacritics folded,
/// non-alphanumerics stripped, whitespace collapsed.
pub fn normalize(input: &str) -> String {
    let folded: String = input
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_diacritic)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fold the accented characters of French text to their ASCII base.
fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'î' | 'ï' => 'i',
        'ô' | 'ö' => 'o',
        'ù' | 'û' | 'ü' => 'u',
        'ÿ' => 'y',
        'ç' => 'c',
        _ => c,
    }
}

/// Whole-word phrase containment over normalized text.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded_text = format!(" {text} ");
    let padded_phrase = format!(" {phrase} ");
    padded_text.contains(&padded_phrase)
}

/// Classify free text into a document type suggestion.
///
/// Total function: never fails, never returns an empty result. The first
/// rule whose keyword set intersects the normalized text wins; if none
/// does, a generic low-confidence classification is returned.
pub fn classify(free_text: &str) -> ClassificationResult {
    let normalized = normalize(free_text);

    for rule in RULES {
        if rule
            .keywords
            .iter()
            .any(|kw| contains_phrase(&normalized, kw))
        {
            tracing::debug!(rule = rule.name, confidence = rule.confidence, "intent matched");
            return ClassificationResult {
                input_text: free_text.to_string(),
                document_type: rule.document_type,
                sub_type: rule.sub_type.map(str::to_string),
                authority: rule.authority,
                confidence: rule.confidence,
                hints: rule.hints.iter().map(|h| h.to_string()).collect(),
                suggested_template_id: rule.suggested_template_id.map(str::to_string),
            };
        }
    }

    ClassificationResult {
        input_text: free_text.to_string(),
        document_type: DocumentType::Generic,
        sub_type: None,
        authority: None,
        confidence: 0.5,
        hints: vec![GENERIC_FALLBACK_HINT.to_string()],
        suggested_template_id: None,
    }
}

/// Consumer policy: ask a clarifying question when confidence is low or the
/// document family needs an authority the rule did not resolve.
pub fn needs_clarification(result: &ClassificationResult) -> bool {
    result.confidence < CLARIFICATION_THRESHOLD
        || (result.document_type.requires_authority() && result.authority.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize("Refus de visa (étudiant), Préfecture!"),
            "refus de visa etudiant prefecture"
        );
        assert_eq!(normalize("  Titre   de\tséjour  "), "titre de sejour");
        assert_eq!(normalize("xyz123"), "xyz123");
    }

    #[test]
    fn test_visitor_visa_high_confidence() {
        let result = classify("Refus de visa visiteur");
        assert_eq!(result.document_type, DocumentType::VisaRefusalAppeal);
        assert_eq!(result.sub_type.as_deref(), Some("visitor"));
        assert_eq!(result.authority, Some(Authority::Consulate));
        assert_eq!(result.confidence, 0.90);
        assert!(result.suggested_template_id.is_some());
    }

    #[test]
    fn test_determinism() {
        let a = classify("Refus de visa visiteur");
        let b = classify("Refus de visa visiteur");
        assert_eq!(a.document_type, b.document_type);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.sub_type, b.sub_type);
    }

    #[test]
    fn test_generic_fallback() {
        let result = classify("xyz123");
        assert_eq!(result.document_type, DocumentType::Generic);
        assert_eq!(result.confidence, 0.5);
        assert!(result.hints.contains(&GENERIC_FALLBACK_HINT.to_string()));
        assert!(result.suggested_template_id.is_none());
    }

    #[test]
    fn test_bare_refus_midrange_confidence() {
        let result = classify("j'ai eu un refus");
        assert_eq!(result.document_type, DocumentType::VisaRefusalAppeal);
        assert_eq!(result.confidence, 0.85);
        assert!(result.authority.is_none());
    }

    #[test]
    fn test_priority_order_specific_beats_generic_keyword() {
        // Contains both "refus" and "visa etudiant"; the more specific
        // student-visa rule sits earlier in the list and wins.
        let result = classify("J'ai reçu un refus de visa étudiant");
        assert_eq!(result.sub_type.as_deref(), Some("student"));
        assert_eq!(result.confidence, 0.88);
    }

    #[test]
    fn test_diacritics_folded() {
        let result = classify("Demande de titre de séjour à Créteil");
        assert_eq!(result.document_type, DocumentType::ResidencePermitRequest);
        assert_eq!(result.authority, Some(Authority::Prefecture));
    }

    #[test]
    fn test_word_boundaries() {
        // "refuser" must not match the bare keyword "refus".
        let result = classify("comment refuser poliment une invitation");
        assert_eq!(result.document_type, DocumentType::Generic);
    }

    #[test]
    fn test_needs_clarification_low_confidence() {
        let generic = classify("quelque chose");
        assert!(needs_clarification(&generic));
    }

    #[test]
    fn test_needs_clarification_unresolved_authority() {
        let result = classify("refus");
        // Confidence 0.85 is above the threshold, but a refusal appeal
        // needs an authority the bare keyword cannot resolve.
        assert!(result.confidence >= CLARIFICATION_THRESHOLD);
        assert!(needs_clarification(&result));
    }

    #[test]
    fn test_resolved_authority_needs_no_clarification() {
        let result = classify("refus de visa visiteur");
        assert!(!needs_clarification(&result));
    }

    #[test]
    fn test_classification_never_fails_on_odd_input() {
        for input in ["", "   ", "!!!", "émoji 🙂 partout", "\n\t"] {
            let result = classify(input);
            assert!(result.confidence > 0.0);
        }
    }
}
