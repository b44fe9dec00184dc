//! TypeAPI Editor
//!
//! Bidirectional conversion between the TypeAPI editor document and the
//! TypeAPI wire specification.
//!
//! The editor document is a flat, list-based model (operations and types with
//! string references plus a shape). The specification is a nested JSON tree of
//! `definitions` and `operations` whose type references are schema nodes.
//! [`generate`] turns a document into a specification, [`parse`] goes the
//! other way and accepts the legacy spellings older specifications used.
//!
//! # Example
//!
//! ```
//! use typeapi_editor::{generate, parse, Document, GenerateOptions, OfflineSource};
//! use serde_json::json;
//!
//! let document = Document::from_value(json!({
//!     "types": [{
//!         "name": "Pet",
//!         "type": "struct",
//!         "properties": [
//!             {"name": "id", "type": "integer"},
//!             {"name": "tags", "type": "array", "reference": "string"}
//!         ]
//!     }],
//!     "root": "Pet"
//! }))
//! .unwrap();
//!
//! let spec = generate(&document, &GenerateOptions::new()).unwrap();
//! let value = spec.to_value().unwrap();
//! assert_eq!(
//!     value["definitions"]["Pet"]["properties"]["tags"],
//!     json!({"type": "array", "schema": {"type": "string"}})
//! );
//!
//! let parsed = parse(&value, &OfflineSource).unwrap();
//! assert_eq!(parsed, document);
//! ```
//!
//! # Shapes
//!
//! | Shape | Specification node |
//! |-------|--------------------|
//! | `plain` | the referenced node itself |
//! | `array` | `{"type": "array", "schema": ...}` |
//! | `map` | `{"type": "map", "schema": ...}` |
//! | `mime` | `contentType` instead of `schema` |
//!
//! Nested collections are stored with a prefixed reference such as
//! `array:string` or `map:array:Pet`.

pub mod document;
mod error;
mod generator;
mod linter;
mod loader;
pub mod normalize;
mod parser;
mod resolver;
mod source;
pub mod specification;
mod types;
mod validator;

pub use document::{Argument, Document, Import, Operation, Property, Security, Throw, Type};
pub use error::{
    DocumentError, GenerateError, LoadError, ParseError, SchemaError, SourceError, ValidateError,
};
pub use generator::{generate, generate_json, generate_property, GenerateOptions};
pub use linter::{
    lint, lint_document, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity,
};
pub use loader::{
    is_url, load_document, load_value, load_value_auto, load_value_str, load_yaml_str,
};
pub use parser::{parse, parse_str};
pub use resolver::{reference_node, resolve, wrap, ResolvedType, TypeRef};
pub use source::{
    definitions_of, CachedSource, Definitions, InMemorySource, LoaderSource, OfflineSource,
    SchemaSource,
};
pub use specification::Specification;
pub use types::{ArgumentLocation, DefinitionKind, PropertyKind, Shape};
pub use validator::{
    specification_schema, validate_against_schema, validate_specification, SPECIFICATION_SCHEMA,
};

#[cfg(feature = "remote")]
pub use loader::load_value_url;
