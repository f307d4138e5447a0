//! Template parsing and validation.
//!
//! Template records are structured data validated against JSON Schema.
//! This module handles parsing YAML/JSON template records and validating
//! the declared field schema before the rest of the pipeline trusts it.

mod parser;
mod schema;

pub use parser::{
    FieldDefinition, FieldType, LocalizedText, Template, TemplateError, TemplateStatus,
};
pub use schema::validate_template_schema;
