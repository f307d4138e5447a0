//! The ordered classification rule table.
//!
//! Priority is the array order: the first rule whose keyword set intersects
//! the normalized input wins. Keywords are written pre-normalized (lowercase,
//! no diacritics, no punctuation). Confidence is fixed per rule and
//! calibrated to the rule's specificity: an explicit document-plus-subtype
//! phrase scores higher than a lone family keyword.

use super::{Authority, DocumentType};

/// One keyword rule: the predicate side (keywords) and the fixed result.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierRule {
    /// Stable rule name, for logs
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub document_type: DocumentType,
    pub sub_type: Option<&'static str>,
    pub authority: Option<Authority>,
    pub confidence: f64,
    pub suggested_template_id: Option<&'static str>,
    pub hints: &'static [&'static str],
}

/// Priority-ordered rule list. Most specific phrases first; the bare
/// refusal keywords sit below every visa-subtype rule so a subtype match
/// always wins.
pub const RULES: &[ClassifierRule] = &[
    ClassifierRule {
        name: "visa-visiteur",
        keywords: &["visa visiteur", "visa de visiteur", "visitor visa"],
        document_type: DocumentType::VisaRefusalAppeal,
        sub_type: Some("visitor"),
        authority: Some(Authority::Consulate),
        confidence: 0.90,
        suggested_template_id: Some("tpl-recours-visa-visiteur"),
        hints: &[],
    },
    ClassifierRule {
        name: "visa-etudiant",
        keywords: &["visa etudiant", "visa d etudes", "student visa"],
        document_type: DocumentType::VisaRefusalAppeal,
        sub_type: Some("student"),
        authority: Some(Authority::Consulate),
        confidence: 0.88,
        suggested_template_id: Some("tpl-recours-visa-etudiant"),
        hints: &[],
    },
    ClassifierRule {
        name: "refus-visa",
        keywords: &["refus de visa", "visa refuse"],
        document_type: DocumentType::VisaRefusalAppeal,
        sub_type: None,
        authority: None,
        confidence: 0.87,
        suggested_template_id: Some("tpl-recours-visa"),
        hints: &["SPECIFY_VISA_TYPE"],
    },
    ClassifierRule {
        name: "refus-generique",
        keywords: &["refus", "refuse", "refusee", "rejet", "rejete", "rejetee"],
        document_type: DocumentType::VisaRefusalAppeal,
        sub_type: None,
        authority: None,
        confidence: 0.85,
        suggested_template_id: Some("tpl-recours-visa"),
        hints: &["SPECIFY_VISA_TYPE"],
    },
    ClassifierRule {
        name: "titre-sejour",
        keywords: &["titre de sejour", "carte de sejour", "residence permit"],
        document_type: DocumentType::ResidencePermitRequest,
        sub_type: None,
        authority: Some(Authority::Prefecture),
        confidence: 0.88,
        suggested_template_id: Some("tpl-demande-titre-sejour"),
        hints: &[],
    },
    ClassifierRule {
        name: "regroupement-familial",
        keywords: &["regroupement familial", "family reunification"],
        document_type: DocumentType::FamilyReunification,
        sub_type: None,
        authority: Some(Authority::Prefecture),
        confidence: 0.87,
        suggested_template_id: Some("tpl-regroupement-familial"),
        hints: &[],
    },
    ClassifierRule {
        name: "naturalisation",
        keywords: &["naturalisation", "nationalite francaise"],
        document_type: DocumentType::NaturalizationRequest,
        sub_type: None,
        authority: Some(Authority::Prefecture),
        confidence: 0.86,
        suggested_template_id: Some("tpl-demande-naturalisation"),
        hints: &[],
    },
    ClassifierRule {
        name: "attestation-accueil",
        keywords: &[
            "attestation d accueil",
            "attestation d hebergement",
            "hebergement",
        ],
        document_type: DocumentType::AccommodationCertificate,
        sub_type: None,
        authority: Some(Authority::TownHall),
        confidence: 0.84,
        suggested_template_id: Some("tpl-attestation-accueil"),
        hints: &[],
    },
    ClassifierRule {
        name: "autorisation-travail",
        keywords: &[
            "autorisation de travail",
            "permis de travail",
            "work permit",
        ],
        document_type: DocumentType::WorkPermitRequest,
        sub_type: None,
        authority: Some(Authority::Prefecture),
        confidence: 0.82,
        suggested_template_id: Some("tpl-autorisation-travail"),
        hints: &[],
    },
];
