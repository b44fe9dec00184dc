//! Structural validation of wire specifications.

use serde_json::Value;

use crate::error::{SchemaError, ValidateError};

/// JSON Schema describing the wire dialect.
pub const SPECIFICATION_SCHEMA: &str = include_str!("schema/typeapi.json");

/// Parse the embedded dialect schema.
///
/// # Errors
///
/// Returns `ValidateError::InvalidSchema` if the embedded schema isn't JSON.
pub fn specification_schema() -> Result<Value, ValidateError> {
    serde_json::from_str(SPECIFICATION_SCHEMA).map_err(|e| ValidateError::InvalidSchema {
        message: e.to_string(),
    })
}

/// Validate a wire specification against the dialect schema.
///
/// # Errors
///
/// Returns `ValidateError::Invalid` with every violation found.
pub fn validate_specification(spec: &Value) -> Result<(), ValidateError> {
    let schema = specification_schema()?;
    validate_against_schema(&schema, spec)
}

/// Validate a value against an arbitrary JSON Schema.
pub fn validate_against_schema(schema: &Value, value: &Value) -> Result<(), ValidateError> {
    let validator =
        jsonschema::validator_for(schema).map_err(|e| ValidateError::InvalidSchema {
            message: e.to_string(),
        })?;

    let errors: Vec<SchemaError> = validator
        .iter_errors(value)
        .map(|e| SchemaError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
