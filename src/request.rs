//! Boundary checks run before the pipeline.
//!
//! A request is rejected with a distinct error code when the body is not JSON,
//! when `text` is missing, empty or not a string, or when it is longer than the
//! configured maximum. Nothing is redacted for a rejected request.

use crate::error::{BoundaryError, RegistryError};
use jsonschema::{JSONSchema, ValidationError};
use serde::Deserialize;
use serde_json::Value;

/// Redaction request schema
const REQUEST_SCHEMA: &str = r#"{
    "$schema": "http://json-schema.org/draft-07/schema#",
    "title": "PII Redaction Request",
    "type": "object",
    "required": ["text"],
    "properties": {
        "text": {
            "type": "string",
            "minLength": 1
        }
    },
    "additionalProperties": true
}"#;

#[derive(Debug, Deserialize)]
struct RedactRequest {
    text: String,
}

/// Validates request bodies and input size
pub struct RequestGuard {
    schema: JSONSchema,
    max_length: usize,
}

impl RequestGuard {
    pub fn new(max_length: usize) -> Result<Self, RegistryError> {
        let schema: Value = serde_json::from_str(REQUEST_SCHEMA)
            .map_err(|e| RegistryError::InvalidRequestSchema(e.to_string()))?;
        let schema = JSONSchema::compile(&schema)
            .map_err(|e| RegistryError::InvalidRequestSchema(e.to_string()))?;

        Ok(Self { schema, max_length })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Parse a JSON request body and return the text to redact
    pub fn parse(&self, body: &str) -> Result<String, BoundaryError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| BoundaryError::InvalidBody(e.to_string()))?;

        if let Err(errors) = self.schema.validate(&value) {
            return Err(BoundaryError::InvalidInput(
                format_validation_errors(errors).join("; "),
            ));
        }

        let request: RedactRequest = serde_json::from_value(value)
            .map_err(|e| BoundaryError::InvalidInput(e.to_string()))?;
        self.check(&request.text)?;
        Ok(request.text)
    }

    /// Reject empty or oversized text
    pub fn check(&self, text: &str) -> Result<(), BoundaryError> {
        check_length(text, self.max_length)
    }
}

/// Size guard, counted in characters
pub fn check_length(text: &str, max_length: usize) -> Result<(), BoundaryError> {
    if text.is_empty() {
        return Err(BoundaryError::InvalidInput(
            "text must be a non-empty string".to_string(),
        ));
    }

    let received_length = text.chars().count();
    if received_length > max_length {
        return Err(BoundaryError::InputTooLarge {
            max_length,
            received_length,
        });
    }
    Ok(())
}

fn format_validation_errors<'a>(errors: impl Iterator<Item = ValidationError<'a>>) -> Vec<String> {
    errors
        .map(|e| {
            let path = e.instance_path.to_string();
            if path.is_empty() {
                e.to_string()
            } else {
                format!("{}: {}", path, e)
            }
        })
        .collect()
}
