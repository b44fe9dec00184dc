//! Type shape resolution shared by the parser and the generator.
//!
//! [`resolve`] decomposes a wire schema fragment into a [`ResolvedType`];
//! [`wrap`] and [`reference_node`] go the other way and rebuild a schema
//! node from the `(reference, generic, shape)` triple stored on the document.
//!
//! Nested collections are stored as a prefixed reference: an array of maps
//! of `Pet` is `array` wrapping the reference `map:Pet`.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{GenerateError, ParseError};
use crate::specification::PropertyType;
use crate::types::{
    is_primitive, json_type_name, Shape, DEFAULT_GENERIC, GENERIC_REFERENCE,
};

const MAP_PREFIX: &str = "map:";
const ARRAY_PREFIX: &str = "array:";

/// Keys holding the element schema of a map or array, in lookup order.
pub const ELEMENT_KEYS: &[&str] = &["schema", "additionalProperties", "items"];

/// Result of resolving a schema fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    Primitive {
        name: String,
        format: Option<String>,
    },
    Reference {
        target: String,
        template: Option<IndexMap<String, String>>,
    },
    Generic {
        name: String,
    },
    Map(Box<ResolvedType>),
    Array(Box<ResolvedType>),
    Union(Vec<ResolvedType>),
    Intersection(Vec<ResolvedType>),
}

/// Reference name plus the generic parameter it stands for, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub reference: String,
    pub generic: Option<String>,
}

impl TypeRef {
    pub fn named(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            generic: None,
        }
    }

    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            reference: GENERIC_REFERENCE.to_string(),
            generic: Some(name.into()),
        }
    }

    /// Collapse into a single reference string for slots without a separate
    /// generic field (arguments, payloads, responses): a trailing `generic`
    /// is replaced by the parameter name.
    pub fn into_name(self) -> String {
        match self.generic {
            Some(generic) if self.reference.ends_with(GENERIC_REFERENCE) => {
                let prefix_len = self.reference.len() - GENERIC_REFERENCE.len();
                format!("{}{}", &self.reference[..prefix_len], generic)
            }
            _ => self.reference,
        }
    }

    fn prefixed(self, prefix: &str) -> Self {
        Self {
            reference: format!("{}{}", prefix, self.reference),
            generic: self.generic,
        }
    }
}

impl ResolvedType {
    pub fn shape(&self) -> Shape {
        match self {
            ResolvedType::Map(_) => Shape::Map,
            ResolvedType::Array(_) => Shape::Array,
            _ => Shape::Plain,
        }
    }

    /// Flatten into a reference name, prefixing nested collections.
    ///
    /// Unions and intersections have no reference form and flatten to `any`.
    pub fn type_ref(&self) -> TypeRef {
        match self {
            ResolvedType::Primitive { name, .. } => TypeRef::named(name.clone()),
            ResolvedType::Reference { target, .. } => TypeRef::named(target.clone()),
            ResolvedType::Generic { name } => TypeRef::generic(name.clone()),
            ResolvedType::Map(inner) => inner.type_ref().prefixed(MAP_PREFIX),
            ResolvedType::Array(inner) => inner.type_ref().prefixed(ARRAY_PREFIX),
            ResolvedType::Union(_) | ResolvedType::Intersection(_) => TypeRef::named("any"),
        }
    }

    /// Split off the outermost shape: `map<array<Pet>>` becomes
    /// (`array:Pet`, map).
    pub fn decompose(&self) -> (TypeRef, Shape) {
        match self {
            ResolvedType::Map(inner) => (inner.type_ref(), Shape::Map),
            ResolvedType::Array(inner) => (inner.type_ref(), Shape::Array),
            other => (other.type_ref(), Shape::Plain),
        }
    }

    /// Format of the innermost primitive element, if any.
    pub fn format(&self) -> Option<&str> {
        match self {
            ResolvedType::Primitive { format, .. } => format.as_deref(),
            ResolvedType::Map(inner) | ResolvedType::Array(inner) => inner.format(),
            _ => None,
        }
    }
}

/// Resolve a wire schema fragment into its base type and shape.
///
/// Accepts both the canonical (`target`, `name`) and the historical
/// (`$ref`, `$generic`) spellings.
///
/// # Errors
///
/// Returns `ParseError::SchemaResolution` if the fragment has no reference,
/// generic or type, and `ParseError::InvalidPropertyType` for an
/// unrecognized `type`.
pub fn resolve(fragment: &Value, path: &str) -> Result<ResolvedType, ParseError> {
    let Some(map) = fragment.as_object() else {
        return Err(ParseError::SchemaResolution {
            path: path.to_string(),
            actual: json_type_name(fragment).to_string(),
        });
    };

    if let Some(target) = non_empty_str(map, &["target", "$ref"]) {
        return Ok(ResolvedType::Reference {
            target: target.to_string(),
            template: ["template", "$template"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(template_of),
        });
    }

    if let Some(name) = non_empty_str(map, &["$generic", "name"]) {
        return Ok(ResolvedType::Generic {
            name: name.to_string(),
        });
    }

    if let Some(branches) = map.get("oneOf").and_then(Value::as_array) {
        return resolve_branches(branches, &format!("{}/oneOf", path)).map(ResolvedType::Union);
    }

    if let Some(branches) = map.get("allOf").and_then(Value::as_array) {
        return resolve_branches(branches, &format!("{}/allOf", path))
            .map(ResolvedType::Intersection);
    }

    let element = element_of(map);

    match map.get("type").and_then(Value::as_str) {
        Some("object") | Some("map") if element.is_some() => resolve_element(element, path, true),
        Some("array") if element.is_some() => resolve_element(element, path, false),
        Some("object") => Ok(primitive("any", None)),
        Some(kind @ ("map" | "array")) => Err(ParseError::MissingField {
            path: path.to_string(),
            field: format!("{} schema", kind),
        }),
        Some("reference") => Err(ParseError::MissingField {
            path: path.to_string(),
            field: "target".to_string(),
        }),
        Some("generic") => Err(ParseError::MissingField {
            path: path.to_string(),
            field: "name".to_string(),
        }),
        Some(name) if is_primitive(name) => Ok(primitive(
            name,
            map.get("format").and_then(Value::as_str).map(String::from),
        )),
        Some(other) => Err(ParseError::InvalidPropertyType {
            path: path.to_string(),
            value: other.to_string(),
        }),
        None => match element {
            Some(("additionalProperties", _)) => resolve_element(element, path, true),
            Some(("items", _)) => resolve_element(element, path, false),
            _ => Err(ParseError::SchemaResolution {
                path: path.to_string(),
                actual: "object without type".to_string(),
            }),
        },
    }
}

/// Rebuild the schema node for a stored reference.
///
/// `generic` names the parameter when the innermost reference is `generic`;
/// `format` only applies to a `string` element.
///
/// # Errors
///
/// Returns `GenerateError::MissingField` if the reference is empty or a
/// generic element has no parameter name.
pub fn reference_node(
    reference: &str,
    generic: Option<&str>,
    format: Option<&str>,
    path: &str,
) -> Result<PropertyType, GenerateError> {
    if let Some(rest) = reference.strip_prefix(MAP_PREFIX) {
        return reference_node(rest, generic, format, path).map(PropertyType::map);
    }
    if let Some(rest) = reference.strip_prefix(ARRAY_PREFIX) {
        return reference_node(rest, generic, format, path).map(PropertyType::array);
    }

    let node = match reference {
        "" => {
            return Err(GenerateError::MissingField {
                path: path.to_string(),
                field: "reference".to_string(),
            })
        }
        "string" => PropertyType::string(format.filter(|f| !f.is_empty()).map(String::from)),
        "integer" => PropertyType::integer(),
        "number" => PropertyType::number(),
        "boolean" => PropertyType::boolean(),
        "any" => PropertyType::any(),
        GENERIC_REFERENCE => match generic.filter(|g| !g.is_empty()) {
            Some(name) => PropertyType::generic(name),
            None => {
                return Err(GenerateError::MissingField {
                    path: path.to_string(),
                    field: "generic".to_string(),
                })
            }
        },
        target => PropertyType::reference(target),
    };

    Ok(node)
}

/// Wrap a stored reference into a schema node of the given shape.
///
/// [`Shape::Mime`] has no schema form; callers emit a content type instead,
/// so it is treated like [`Shape::Plain`] here.
pub fn wrap(type_ref: &TypeRef, shape: Shape, path: &str) -> Result<PropertyType, GenerateError> {
    let node = reference_node(&type_ref.reference, type_ref.generic.as_deref(), None, path)?;
    Ok(match shape {
        Shape::Map => PropertyType::map(node),
        Shape::Array => PropertyType::array(node),
        Shape::Plain | Shape::Mime => node,
    })
}

/// Read a generic substitution map. A bare string is the legacy form of a
/// single-parameter template and maps the default parameter.
pub fn template_of(value: &Value) -> Option<IndexMap<String, String>> {
    match value {
        Value::String(s) if !s.is_empty() => {
            let mut template = IndexMap::new();
            template.insert(DEFAULT_GENERIC.to_string(), s.clone());
            Some(template)
        }
        Value::Object(map) => Some(
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect(),
        ),
        _ => None,
    }
}

/// First element schema (`schema`, `additionalProperties`, `items`) that is
/// an object, with the key it was found under.
pub fn element_of(map: &Map<String, Value>) -> Option<(&'static str, &Value)> {
    ELEMENT_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| v.is_object()).map(|v| (*key, v)))
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

fn primitive(name: &str, format: Option<String>) -> ResolvedType {
    ResolvedType::Primitive {
        name: name.to_string(),
        format,
    }
}

fn resolve_element(
    element: Option<(&str, &Value)>,
    path: &str,
    is_map: bool,
) -> Result<ResolvedType, ParseError> {
    let Some((key, schema)) = element else {
        return Err(ParseError::MissingField {
            path: path.to_string(),
            field: "schema".to_string(),
        });
    };

    let inner = Box::new(resolve(schema, &format!("{}/{}", path, key))?);
    Ok(if is_map {
        ResolvedType::Map(inner)
    } else {
        ResolvedType::Array(inner)
    })
}

fn resolve_branches(branches: &[Value], path: &str) -> Result<Vec<ResolvedType>, ParseError> {
    branches
        .iter()
        .enumerate()
        .map(|(i, branch)| resolve(branch, &format!("{}/{}", path, i)))
        .collect()
}
