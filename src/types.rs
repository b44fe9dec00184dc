//! Shared enumerations and constant sets.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Primitive type names usable directly as a reference.
pub const PRIMITIVE_TYPES: &[&str] = &["string", "integer", "number", "boolean", "any"];

/// Recognized values of `Property.type`.
pub const PROPERTY_TYPES: &[&str] = &[
    "object", "map", "array", "string", "integer", "number", "boolean", "any", "generic",
];

/// Recognized values of a definition `type`.
pub const DEFINITION_TYPES: &[&str] = &["struct", "map", "array"];

/// HTTP methods which carry a request payload. Matched case-sensitively.
pub const PAYLOAD_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// Status code which forces an empty (`any`) response.
pub const NO_CONTENT: u16 = 204;

/// Status code of an operation without an explicit `httpCode`.
pub const DEFAULT_HTTP_CODE: u16 = 200;

/// Status code of a throw without an explicit `code`.
pub const DEFAULT_THROW_CODE: u16 = 500;

/// Generic parameter assumed by legacy single-parameter templates.
pub const DEFAULT_GENERIC: &str = "T";

/// Reference naming a generic parameter inside a map or array element.
pub const GENERIC_REFERENCE: &str = "generic";

/// URI scheme of TypeHub imports.
pub const TYPEHUB_SCHEME: &str = "typehub://";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// True if `name` is one of [`PRIMITIVE_TYPES`].
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&name)
}

/// True if `method` promotes an explicit payload to a body argument.
pub fn is_payload_method(method: Option<&str>) -> bool {
    method.is_some_and(|m| PAYLOAD_METHODS.contains(&m))
}

/// Wrapping applied to a referenced type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    #[default]
    Plain,
    Array,
    Map,
    /// Raw body identified by a content type rather than a schema.
    Mime,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Plain => "plain",
            Shape::Array => "array",
            Shape::Map => "map",
            Shape::Mime => "mime",
        }
    }

    /// `None` for [`Shape::Plain`], which the document leaves implicit.
    pub fn non_plain(self) -> Option<Shape> {
        match self {
            Shape::Plain => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of `Property.type`.
///
/// `Union` and `Intersection` are legacy markers produced when reading
/// `oneOf`/`allOf` schemas. Anything unrecognized is kept verbatim in
/// `Unknown` so the generator can report it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropertyKind {
    Object,
    Map,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Any,
    Generic,
    Union,
    Intersection,
    Unknown(String),
}

impl PropertyKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "object" => PropertyKind::Object,
            "map" => PropertyKind::Map,
            "array" => PropertyKind::Array,
            "string" => PropertyKind::String,
            "integer" => PropertyKind::Integer,
            "number" => PropertyKind::Number,
            "boolean" => PropertyKind::Boolean,
            "any" => PropertyKind::Any,
            "generic" => PropertyKind::Generic,
            "union" => PropertyKind::Union,
            "intersection" => PropertyKind::Intersection,
            other => PropertyKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PropertyKind::Object => "object",
            PropertyKind::Map => "map",
            PropertyKind::Array => "array",
            PropertyKind::String => "string",
            PropertyKind::Integer => "integer",
            PropertyKind::Number => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::Any => "any",
            PropertyKind::Generic => "generic",
            PropertyKind::Union => "union",
            PropertyKind::Intersection => "intersection",
            PropertyKind::Unknown(s) => s,
        }
    }

    /// Kind of a primitive reference name, if it is one.
    pub fn primitive(name: &str) -> Option<Self> {
        match name {
            "string" => Some(PropertyKind::String),
            "integer" => Some(PropertyKind::Integer),
            "number" => Some(PropertyKind::Number),
            "boolean" => Some(PropertyKind::Boolean),
            "any" => Some(PropertyKind::Any),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, PropertyKind::Map | PropertyKind::Array)
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, PropertyKind::Union | PropertyKind::Intersection)
    }
}

impl From<String> for PropertyKind {
    fn from(s: String) -> Self {
        PropertyKind::parse(&s)
    }
}

impl From<PropertyKind> for String {
    fn from(kind: PropertyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of `Type.type`. Older editors wrote `object` for structs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DefinitionKind {
    #[default]
    Struct,
    Map,
    Array,
    Unknown(String),
}

impl DefinitionKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "struct" | "object" => DefinitionKind::Struct,
            "map" => DefinitionKind::Map,
            "array" => DefinitionKind::Array,
            other => DefinitionKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DefinitionKind::Struct => "struct",
            DefinitionKind::Map => "map",
            DefinitionKind::Array => "array",
            DefinitionKind::Unknown(s) => s,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, DefinitionKind::Map | DefinitionKind::Array)
    }
}

impl From<String> for DefinitionKind {
    fn from(s: String) -> Self {
        DefinitionKind::parse(&s)
    }
}

impl From<DefinitionKind> for String {
    fn from(kind: DefinitionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an operation argument is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ArgumentLocation {
    /// Parse a location from a string.
    ///
    /// Returns `None` for unknown values (caller should error).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "path" => Some(ArgumentLocation::Path),
            "query" => Some(ArgumentLocation::Query),
            "header" => Some(ArgumentLocation::Header),
            "body" => Some(ArgumentLocation::Body),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentLocation::Path => "path",
            ArgumentLocation::Query => "query",
            ArgumentLocation::Header => "header",
            ArgumentLocation::Body => "body",
        }
    }
}

impl fmt::Display for ArgumentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
