//! Template record parsing from YAML/JSON.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::patterns::CANDIDATE_PATTERN;

/// Errors that can occur when parsing template records.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Template validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Certification status of a template.
///
/// `Rejected` is part of the stored vocabulary (external collaborators may
/// write it); the admin reject transition itself returns a template to
/// `Draft` with `verification_required` set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Draft,
    Verified,
    Certified,
    Published,
    Rejected,
}

impl TemplateStatus {
    /// Human-readable status label, matching the wire form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStatus::Draft => "draft",
            TemplateStatus::Verified => "verified",
            TemplateStatus::Certified => "certified",
            TemplateStatus::Published => "published",
            TemplateStatus::Rejected => "rejected",
        }
    }
}

/// Input widget/validation type of a declared variable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Date,
    Number,
    Email,
}

/// A short string in each supported locale.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub fr: String,
    pub en: String,
}

impl LocalizedText {
    /// Same text in both locales (used for synthesized labels).
    pub fn uniform(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fr: text.clone(),
            en: text,
        }
    }
}

/// Schema entry describing one template variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    /// Must match a placeholder token in the content verbatim
    pub name: String,

    /// Value type, drives wizard validation
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Per-locale display label
    pub label: LocalizedText,

    /// Whether the wizard requires a value
    #[serde(default)]
    pub required: bool,

    /// Per-locale example/hint shown in the empty input
    #[serde(default)]
    pub placeholder_hint: LocalizedText,
}

impl FieldDefinition {
    /// Validate that the declared name is a lexically valid placeholder token.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if !CANDIDATE_PATTERN.is_match(&self.name) {
            return Err(TemplateError::ValidationError(format!(
                "Field name is not a valid placeholder token: {}",
                self.name
            )));
        }
        Ok(())
    }
}

fn default_status() -> TemplateStatus {
    TemplateStatus::Draft
}

/// A document template: markup content plus its declared variable schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Store identifier
    pub id: String,

    /// Human-facing template code (e.g. "RECOURS-VISA-01")
    pub code: String,

    /// Markup: literal text interspersed with placeholder tokens and
    /// block helpers
    pub content: String,

    /// Variables the wizard must collect
    #[serde(default)]
    pub required_variables: Vec<FieldDefinition>,

    /// Variables the wizard may collect
    #[serde(default)]
    pub optional_variables: Vec<FieldDefinition>,

    /// Certification status
    #[serde(default = "default_status")]
    pub status: TemplateStatus,

    /// Set by an admin reject; cleared by the next verification pass
    #[serde(default)]
    pub verification_required: bool,

    /// When the template last passed a verification pass
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,
}

impl Template {
    /// Parse a template record from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, TemplateError> {
        let template: Template = serde_yaml::from_str(yaml)?;
        template.validate()?;
        Ok(template)
    }

    /// Parse a template record from JSON string.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a template record from an already-deserialized JSON value.
    ///
    /// This is the boundary used for records coming out of the persistence
    /// layer: the value is checked against the template JSON Schema first,
    /// then deserialized into the typed model and structurally validated.
    pub fn from_value(value: serde_json::Value) -> Result<Self, TemplateError> {
        super::schema::validate_template_schema(&value)
            .map_err(|errors| TemplateError::ValidationError(errors.join("; ")))?;
        let template: Template = serde_json::from_value(value)?;
        template.validate()?;
        Ok(template)
    }

    /// Parse a template record from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse a template record from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Validate the template structure.
    fn validate(&self) -> Result<(), TemplateError> {
        if self.id.is_empty() {
            return Err(TemplateError::MissingField("id".to_string()));
        }

        if self.code.is_empty() {
            return Err(TemplateError::MissingField("code".to_string()));
        }

        for field in self
            .required_variables
            .iter()
            .chain(self.optional_variables.iter())
        {
            field.validate()?;
        }

        self.validate_unique_field_names()?;

        Ok(())
    }

    /// Ensure declared field names are unique across required and optional.
    fn validate_unique_field_names(&self) -> Result<(), TemplateError> {
        let mut seen = std::collections::HashSet::new();

        let all_fields = self
            .required_variables
            .iter()
            .chain(self.optional_variables.iter());

        for field in all_fields {
            if !seen.insert(&field.name) {
                return Err(TemplateError::ValidationError(format!(
                    "Duplicate field name: {}",
                    field.name
                )));
            }
        }

        Ok(())
    }

    /// All declared field names, required and optional.
    pub fn declared_names(&self) -> BTreeSet<String> {
        self.required_variables
            .iter()
            .chain(self.optional_variables.iter())
            .map(|f| f.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_TEMPLATE: &str = r#"
id: "tpl-recours-visa"
code: "RECOURS-VISA-01"
content: "Madame, Monsieur, je soussigné(e) {{nom}} conteste le refus du {{date_refus}}."
required_variables:
  - name: "nom"
    type: text
    label: { fr: "Nom complet", en: "Full name" }
    required: true
  - name: "date_refus"
    type: date
    label: { fr: "Date du refus", en: "Refusal date" }
    required: true
status: draft
"#;

    #[test]
    fn test_parse_valid_template() {
        let template = Template::from_yaml(VALID_TEMPLATE).unwrap();
        assert_eq!(template.code, "RECOURS-VISA-01");
        assert_eq!(template.required_variables.len(), 2);
        assert_eq!(template.status, TemplateStatus::Draft);
        assert!(!template.verification_required);
    }

    #[test]
    fn test_missing_code() {
        let yaml = r#"
id: "tpl-x"
code: ""
content: "text"
"#;
        let result = Template::from_yaml(yaml);
        assert!(matches!(result, Err(TemplateError::MissingField(_))));
    }

    #[test]
    fn test_duplicate_field_names() {
        let yaml = r#"
id: "tpl-x"
code: "X-01"
content: "{{nom}}"
required_variables:
  - name: "nom"
    type: text
    label: { fr: "Nom", en: "Name" }
optional_variables:
  - name: "nom"
    type: text
    label: { fr: "Nom", en: "Name" }
"#;
        let result = Template::from_yaml(yaml);
        assert!(matches!(result, Err(TemplateError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_field_name_rejected() {
        let yaml = r#"
id: "tpl-x"
code: "X-01"
content: "text"
required_variables:
  - name: "3nom"
    type: text
    label: { fr: "Nom", en: "Name" }
"#;
        let result = Template::from_yaml(yaml);
        assert!(matches!(result, Err(TemplateError::ValidationError(_))));
    }

    #[test]
    fn test_unknown_status_rejected() {
        let yaml = r#"
id: "tpl-x"
code: "X-01"
content: "text"
status: archived
"#;
        let result = Template::from_yaml(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_value_schema_gate() {
        // status wrong type: caught by the JSON Schema before deserialization
        let value = serde_json::json!({
            "id": "tpl-x",
            "code": "X-01",
            "content": "text",
            "status": 42
        });
        let result = Template::from_value(value);
        assert!(matches!(result, Err(TemplateError::ValidationError(_))));
    }

    #[test]
    fn test_declared_names() {
        let template = Template::from_yaml(VALID_TEMPLATE).unwrap();
        let names = template.declared_names();
        assert!(names.contains("nom"));
        assert!(names.contains("date_refus"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_dotted_field_name_is_valid() {
        let yaml = r#"
id: "tpl-x"
code: "X-01"
content: "{{client.nom}}"
required_variables:
  - name: "client.nom"
    type: text
    label: { fr: "Nom du client", en: "Client name" }
"#;
        let template = Template::from_yaml(yaml).unwrap();
        assert!(template.declared_names().contains("client.nom"));
    }
}
