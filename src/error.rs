//! Error types for document generation, specification parsing and loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while turning a specification into a document.
///
/// Every variant names the offending location as a slash separated path,
/// e.g. `/definitions/Pet/properties/id`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot resolve schema at {path}: expected a reference, generic or type, got {actual}")]
    SchemaResolution { path: String, actual: String },

    #[error("invalid property type \"{value}\" at {path}")]
    InvalidPropertyType { path: String, value: String },

    #[error("invalid definition type \"{value}\" at {path}: expected struct, map or array")]
    InvalidDefinitionType { path: String, value: String },

    #[error("cannot determine definition type at {path}")]
    UnresolvableDefinition { path: String },

    #[error("missing field \"{field}\" at {path}")]
    MissingField { path: String, field: String },

    #[error("invalid field \"{field}\" at {path}: {message}")]
    InvalidField {
        path: String,
        field: String,
        message: String,
    },

    #[error("cannot resolve import \"{alias}\" from {url}: {source}")]
    ImportResolution {
        alias: String,
        url: String,
        #[source]
        source: SourceError,
    },

    #[error("root \"{root}\" does not name a definition")]
    RootReference { root: String },
}

impl ParseError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::ImportResolution { source, .. } => source.exit_code(),
            _ => 2,
        }
    }
}

/// Errors while turning a document into a specification.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("throw at {path} has no type")]
    MissingType { path: String },

    #[error("missing field \"{field}\" at {path}")]
    MissingField { path: String, field: String },

    #[error("invalid property type \"{value}\" at {path}")]
    InvalidPropertyType { path: String, value: String },

    #[error("invalid definition type \"{value}\" at {path}: expected struct, map or array")]
    InvalidDefinitionType { path: String, value: String },

    #[error("cannot serialize specification: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Violations of the document invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("duplicate operation \"{name}\"")]
    DuplicateOperation { name: String },

    #[error("duplicate type \"{name}\"")]
    DuplicateType { name: String },

    #[error("root \"{root}\" does not name a type")]
    RootReference { root: String },

    #[error("root index {index} is out of range for {len} type(s)")]
    RootIndexOutOfRange { index: usize, len: usize },
}

/// Errors while loading JSON or YAML trees.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document: {source}")]
    InvalidDocument {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Failures reported by a schema source while resolving an import.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no schema registered for {url}")]
    NotFound { url: String },

    #[error("malformed schema at {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("cannot resolve {url}: {message}")]
    Unsupported { url: String, message: String },
}

impl SourceError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SourceError::Load(e) => e.exit_code(),
            SourceError::NotFound { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during structural validation of a specification.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("invalid validation schema: {message}")]
    InvalidSchema { message: String },

    #[error("validation failed with {} error(s)", errors.len())]
    Invalid { errors: Vec<SchemaError> },
}

impl ValidateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ValidateError::InvalidSchema { .. } => 2,
            ValidateError::Invalid { .. } => 1,
        }
    }
}

/// Single validation error with path context.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SchemaError {
    /// JSON Pointer (RFC 6901) to the invalid field.
    pub path: String,
    /// Human-readable error message.
    pub message: String,
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("document.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::Document(DocumentError::DuplicateType {
            name: "Pet".into(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn parse_error_exit_code_follows_import_source() {
        let err = ParseError::ImportResolution {
            alias: "common".into(),
            url: "common.json".into(),
            source: SourceError::Load(LoadError::FileNotFound {
                path: PathBuf::from("common.json"),
            }),
        };
        assert_eq!(err.exit_code(), 3);

        let err = ParseError::MissingField {
            path: "/operations/pet.get/arguments/id".into(),
            field: "in".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn parse_error_names_path() {
        let err = ParseError::InvalidPropertyType {
            path: "/definitions/Pet/properties/id".into(),
            value: "uuid".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid property type \"uuid\" at /definitions/Pet/properties/id"
        );
    }

    #[test]
    fn validate_error_exit_codes() {
        let err = ValidateError::Invalid {
            errors: vec![SchemaError {
                path: "/definitions/Pet".into(),
                message: "missing type".into(),
            }],
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn schema_error_display() {
        let err = SchemaError {
            path: "/definitions/Pet/type".into(),
            message: "\"object\" is not one of the allowed values".into(),
        };
        assert_eq!(
            err.to_string(),
            "/definitions/Pet/type: \"object\" is not one of the allowed values"
        );
    }
}
