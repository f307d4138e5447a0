//! Wizard controller: the sequential form-filling state machine.
//!
//! Linear `Intro -> DocumentType -> Details -> Preview`, with backward
//! transitions allowed from any step to its predecessor. Entered values are
//! preserved across backward navigation; validation failures are field-scoped
//! messages attached to the session, never errors thrown at the user.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{classify, ClassificationResult, DocumentType};
use crate::patterns::is_email;
use crate::template::{FieldDefinition, FieldType};

/// Variable the wizard pre-fills when classification resolved an authority.
pub const AUTHORITY_FIELD: &str = "autorite";

/// Minimum free-text length (in characters) to trigger classification.
const MIN_FREE_TEXT_CHARS: usize = 3;

/// Errors from invalid wizard transitions.
///
/// These signal a caller bug (driving the machine out of order), not bad
/// user input; user input problems surface as `validation_errors` on the
/// session instead.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WizardError {
    #[error("Free text too short, need at least {MIN_FREE_TEXT_CHARS} characters")]
    FreeTextTooShort,

    #[error("Action {action} is not valid at step {step:?}")]
    InvalidTransition { step: WizardStep, action: &'static str },
}

/// Wizard steps, in forward order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Intro,
    DocumentType,
    Details,
    Preview,
}

impl WizardStep {
    fn predecessor(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Intro => None,
            WizardStep::DocumentType => Some(WizardStep::Intro),
            WizardStep::Details => Some(WizardStep::DocumentType),
            WizardStep::Preview => Some(WizardStep::Details),
        }
    }
}

/// A field-scoped validation message. Always recoverable by the user
/// correcting the input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// What the wizard hands to the external renderer on completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSubmission {
    pub document_type: DocumentType,
    pub variables: BTreeMap<String, String>,
}

/// One user's pass through the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardSession {
    pub current_step: WizardStep,
    pub free_text: String,
    pub classification: Option<ClassificationResult>,

    /// The selected family; seeded by classification, overridable by an
    /// explicit selection
    pub document_type: Option<DocumentType>,

    /// Monotonically preserved: backward navigation never discards entries
    pub collected_variables: BTreeMap<String, String>,

    pub validation_errors: Vec<ValidationError>,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    pub fn new() -> Self {
        Self {
            current_step: WizardStep::Intro,
            free_text: String::new(),
            classification: None,
            document_type: None,
            collected_variables: BTreeMap::new(),
            validation_errors: Vec::new(),
        }
    }

    /// Submit the intro free text; classifies it and advances to the
    /// document-type step.
    pub fn submit_free_text(
        &mut self,
        text: &str,
    ) -> Result<ClassificationResult, WizardError> {
        if self.current_step != WizardStep::Intro {
            return Err(WizardError::InvalidTransition {
                step: self.current_step,
                action: "submit_free_text",
            });
        }

        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_FREE_TEXT_CHARS {
            return Err(WizardError::FreeTextTooShort);
        }

        let result = classify(trimmed);
        self.free_text = trimmed.to_string();
        self.document_type = Some(result.document_type);
        if let Some(authority) = result.authority {
            self.collected_variables
                .insert(AUTHORITY_FIELD.to_string(), authority.as_str().to_string());
        }
        self.classification = Some(result.clone());
        self.current_step = WizardStep::DocumentType;

        Ok(result)
    }

    /// Explicitly select a document type, overriding the classifier's
    /// suggestion, and advance to details.
    pub fn select_document_type(&mut self, document_type: DocumentType) -> Result<(), WizardError> {
        if self.current_step != WizardStep::DocumentType {
            return Err(WizardError::InvalidTransition {
                step: self.current_step,
                action: "select_document_type",
            });
        }

        self.document_type = Some(document_type);
        self.current_step = WizardStep::Details;
        Ok(())
    }

    /// Record one entered value. Values accumulate; entering a field twice
    /// keeps the latest value.
    pub fn set_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.collected_variables.insert(name.into(), value.into());
    }

    /// Try to advance from details to preview, gated by the field validator.
    ///
    /// Returns `Ok(true)` when the step advanced, `Ok(false)` when
    /// validation failed — the session stays in details with
    /// `validation_errors` populated. No partial advance.
    pub fn advance_to_preview(
        &mut self,
        schema: &[FieldDefinition],
    ) -> Result<bool, WizardError> {
        if self.current_step != WizardStep::Details {
            return Err(WizardError::InvalidTransition {
                step: self.current_step,
                action: "advance_to_preview",
            });
        }

        let errors = validate_fields(schema, &self.collected_variables);
        if errors.is_empty() {
            self.validation_errors.clear();
            self.current_step = WizardStep::Preview;
            Ok(true)
        } else {
            self.validation_errors = errors;
            Ok(false)
        }
    }

    /// Step back to the predecessor step. Entered values are never
    /// discarded; stale validation messages are.
    pub fn back(&mut self) {
        if let Some(previous) = self.current_step.predecessor() {
            self.current_step = previous;
            self.validation_errors.clear();
        }
    }

    /// Completion: hand the accumulated variables to the external renderer.
    /// This is the pipeline's exit point.
    pub fn complete(&self) -> Result<WizardSubmission, WizardError> {
        if self.current_step != WizardStep::Preview {
            return Err(WizardError::InvalidTransition {
                step: self.current_step,
                action: "complete",
            });
        }

        Ok(WizardSubmission {
            // A session cannot reach Preview without a selected type.
            document_type: self.document_type.unwrap_or(DocumentType::Generic),
            variables: self.collected_variables.clone(),
        })
    }
}

/// Validate collected values against a field schema.
///
/// Required fields must be present and non-blank; typed fields must parse.
/// Optional blank fields are fine.
pub fn validate_fields(
    schema: &[FieldDefinition],
    values: &BTreeMap<String, String>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for field in schema {
        let value = values.get(&field.name).map(|v| v.trim()).unwrap_or("");

        if value.is_empty() {
            if field.required {
                errors.push(ValidationError {
                    field: field.name.clone(),
                    message: format!("{} is required", field.name),
                });
            }
            continue;
        }

        match field.field_type {
            FieldType::Text | FieldType::Textarea => {}
            FieldType::Date => {
                let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"));
                if parsed.is_err() {
                    errors.push(ValidationError {
                        field: field.name.clone(),
                        message: format!("{} is not a valid date", field.name),
                    });
                }
            }
            FieldType::Number => {
                if value.parse::<f64>().is_err() {
                    errors.push(ValidationError {
                        field: field.name.clone(),
                        message: format!("{} is not a valid number", field.name),
                    });
                }
            }
            FieldType::Email => {
                if !is_email(value) {
                    errors.push(ValidationError {
                        field: field.name.clone(),
                        message: format!("{} is not a valid email address", field.name),
                    });
                }
            }
        }
    }

    errors
}
