//! Specification to document conversion.
//!
//! The raw tree first goes through [`crate::normalize`], then every
//! operation and definition is walked with its path so errors can name the
//! offending location. Parsing is all-or-nothing.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::document::{Argument, Document, Import, Operation, Property, Security, Throw, Type};
use crate::error::ParseError;
use crate::normalize;
use crate::resolver::{resolve, ResolvedType, TypeRef};
use crate::source::SchemaSource;
use crate::types::{
    json_type_name, ArgumentLocation, DefinitionKind, PropertyKind, Shape, NO_CONTENT,
};

/// Parse a wire specification into a document.
///
/// Imports are resolved through `source`.
///
/// # Errors
///
/// Returns `ParseError` naming the path of the first structural problem, or
/// `ParseError::ImportResolution` if an import can't be resolved.
pub fn parse(spec: &Value, source: &dyn SchemaSource) -> Result<Document, ParseError> {
    if !spec.is_object() {
        return Err(ParseError::InvalidField {
            path: "/".to_string(),
            field: "specification".to_string(),
            message: format!("expected an object, got {}", json_type_name(spec)),
        });
    }

    let normalized = normalize::specification(spec);
    let empty = Map::new();
    let spec = normalized.as_object().unwrap_or(&empty);

    let mut document = Document {
        base_url: get_string(spec, "baseUrl"),
        security: spec.get("security").and_then(Security::from_value),
        ..Default::default()
    };

    if let Some(imports) = spec.get("import").and_then(Value::as_object) {
        for (alias, url) in imports {
            let Some(url) = url.as_str() else {
                continue;
            };
            document.imports.push(parse_import(alias, url, source)?);
        }
    }

    if let Some(operations) = spec.get("operations").and_then(Value::as_object) {
        for (name, operation) in operations {
            let Some(operation) = operation.as_object() else {
                continue;
            };
            let path = format!("/operations/{}", name);
            document
                .operations
                .push(parse_operation(name, operation, &path)?);
        }
    }

    if let Some(definitions) = spec.get("definitions").and_then(Value::as_object) {
        document.types = parse_definitions(definitions, "/definitions")?;
    }

    if let Some(root) = get_str(spec, "root").filter(|r| !r.is_empty()) {
        if document.type_by_name(root).is_none() {
            return Err(ParseError::RootReference {
                root: root.to_string(),
            });
        }
        document.root = Some(root.to_string());
    }

    Ok(document)
}

/// Parse a specification from a JSON string.
///
/// # Errors
///
/// Returns `ParseError::InvalidJson` if the string isn't valid JSON, and
/// any error of [`parse`].
pub fn parse_str(json: &str, source: &dyn SchemaSource) -> Result<Document, ParseError> {
    let spec: Value =
        serde_json::from_str(json).map_err(|source| ParseError::InvalidJson { source })?;
    parse(&spec, source)
}

fn parse_import(alias: &str, url: &str, source: &dyn SchemaSource) -> Result<Import, ParseError> {
    let mut definitions = source
        .resolve(url)
        .map_err(|source| ParseError::ImportResolution {
            alias: alias.to_string(),
            url: url.to_string(),
            source,
        })?;
    normalize::definitions(&mut definitions);

    let types = parse_definitions(&definitions, &format!("/import/{}", alias))?;
    info!(alias, url, types = types.len(), "resolved import");
    Ok(Import::from_url(alias, url, types))
}

fn parse_definitions(definitions: &Map<String, Value>, path: &str) -> Result<Vec<Type>, ParseError> {
    let mut types = Vec::with_capacity(definitions.len());
    for (name, definition) in definitions {
        let Some(definition) = definition.as_object() else {
            continue;
        };
        let def_path = format!("{}/{}", path, name);
        types.push(parse_definition(name, definition, &def_path)?);
    }
    Ok(types)
}

fn parse_definition(name: &str, def: &Map<String, Value>, path: &str) -> Result<Type, ParseError> {
    debug!(definition = name, "parsing definition");

    let kind = match def.get("type").and_then(Value::as_str) {
        Some(kind) => DefinitionKind::parse(kind),
        None => {
            return Err(ParseError::UnresolvableDefinition {
                path: path.to_string(),
            })
        }
    };

    let mut ty = Type::new(name, kind);
    ty.description = get_string(def, "description");
    ty.deprecated = def.get("deprecated").and_then(Value::as_bool);

    match &ty.kind {
        DefinitionKind::Struct => {
            if let Some(parent) = def.get("parent").and_then(Value::as_object) {
                ty.parent = get_str(parent, "target")
                    .filter(|t| !t.is_empty())
                    .map(String::from);
                if ty.parent.is_some() {
                    ty.template = parent.get("template").and_then(string_map);
                }
            }
            ty.base = def.get("base").and_then(Value::as_bool);
            ty.discriminator = get_string(def, "discriminator").filter(|d| !d.is_empty());
            ty.mapping = def.get("mapping").and_then(string_map);

            if let Some(properties) = def.get("properties").and_then(Value::as_object) {
                for (prop_name, prop) in properties {
                    let prop_path = format!("{}/properties/{}", path, prop_name);
                    ty.properties
                        .push(parse_property(prop_name, prop, &prop_path)?);
                }
            }
        }
        DefinitionKind::Map | DefinitionKind::Array => {
            let schema = def.get("schema").ok_or_else(|| ParseError::MissingField {
                path: path.to_string(),
                field: "schema".to_string(),
            })?;
            let element = resolve(schema, &format!("{}/schema", path))?;
            let TypeRef { reference, generic } = element.type_ref();
            ty.reference = Some(reference);
            ty.generic = generic;
        }
        DefinitionKind::Unknown(value) => {
            return Err(ParseError::InvalidDefinitionType {
                path: path.to_string(),
                value: value.clone(),
            })
        }
    }

    Ok(ty)
}

fn parse_property(name: &str, value: &Value, path: &str) -> Result<Property, ParseError> {
    let resolved = resolve(value, path)?;

    let mut property = match resolved {
        ResolvedType::Reference { target, template } => {
            let mut property = Property::new(name, PropertyKind::Object).with_reference(target);
            property.template = template;
            property
        }
        ResolvedType::Generic { name: generic } => {
            Property::new(name, PropertyKind::Generic).with_generic(generic)
        }
        ResolvedType::Primitive {
            name: primitive,
            format,
        } => {
            let mut property = Property::new(
                name,
                PropertyKind::primitive(&primitive).unwrap_or(PropertyKind::Any),
            );
            property.format = format;
            property
        }
        ResolvedType::Map(ref inner) | ResolvedType::Array(ref inner) => {
            let kind = if matches!(resolved, ResolvedType::Map(_)) {
                PropertyKind::Map
            } else {
                PropertyKind::Array
            };
            let TypeRef { reference, generic } = inner.type_ref();
            let mut property = Property::new(name, kind).with_reference(reference);
            property.generic = generic;
            property.format = inner.format().map(String::from);
            property
        }
        ResolvedType::Union(ref branches) | ResolvedType::Intersection(ref branches) => {
            let kind = if matches!(resolved, ResolvedType::Union(_)) {
                PropertyKind::Union
            } else {
                PropertyKind::Intersection
            };
            warn!(path, kind = %kind, "composite property kept as legacy marker");
            let mut property = Property::new(name, kind);
            property.refs = Some(
                branches
                    .iter()
                    .map(|branch| branch.type_ref().into_name())
                    .collect(),
            );
            property
        }
    };

    property.description = value.get("description").and_then(Value::as_str).map(String::from);
    property.deprecated = value.get("deprecated").and_then(Value::as_bool);

    Ok(property)
}

fn parse_operation(
    name: &str,
    op: &Map<String, Value>,
    path: &str,
) -> Result<Operation, ParseError> {
    debug!(operation = name, "parsing operation");

    let mut operation = Operation::new(name);
    operation.http_method = get_string(op, "method");
    operation.http_path = get_string(op, "path");

    if let Some(arguments) = op.get("arguments").and_then(Value::as_object) {
        for (arg_name, raw) in arguments {
            let arg_path = format!("{}/arguments/{}", path, arg_name);
            let (argument, shape) = parse_argument(arg_name, raw, &arg_path)?;
            if argument.location == Some(ArgumentLocation::Body) {
                operation.payload = argument.type_name;
                operation.payload_shape = shape.non_plain();
            } else {
                operation.arguments.push(argument);
            }
        }
    }

    if let Some(throws) = op.get("throws").and_then(Value::as_array) {
        for (i, raw) in throws.iter().enumerate() {
            let throw_path = format!("{}/throws/{}", path, i);
            operation.throws.push(parse_throw(raw, &throw_path)?);
        }
    }

    if let Some(ret) = op.get("return").and_then(Value::as_object) {
        let ret_path = format!("{}/return", path);
        if let Some(code) = ret.get("code") {
            operation.http_code = status_code(code, &ret_path)?;
        }

        if operation.http_code != NO_CONTENT {
            if let Some((type_name, shape)) = parse_body(ret, &ret_path)? {
                operation.returns = Some(type_name);
                operation.return_shape = shape.non_plain();
            }
        }
    }

    operation.description = get_string(op, "description");
    operation.stability = op.get("stability").and_then(Value::as_i64);
    operation.security = op.get("security").and_then(string_list);
    operation.authorization = op.get("authorization").and_then(Value::as_bool);
    operation.tags = op.get("tags").and_then(string_list);

    Ok(operation)
}

fn parse_argument(
    name: &str,
    raw: &Value,
    path: &str,
) -> Result<(Argument, Shape), ParseError> {
    let Some(raw) = raw.as_object() else {
        return Err(ParseError::InvalidField {
            path: path.to_string(),
            field: name.to_string(),
            message: format!("expected an object, got {}", json_type_name(raw)),
        });
    };

    let location = match get_str(raw, "in") {
        Some(location) => ArgumentLocation::parse(location).ok_or_else(|| {
            ParseError::InvalidField {
                path: path.to_string(),
                field: "in".to_string(),
                message: format!(
                    "expected one of path, query, header or body, got \"{}\"",
                    location
                ),
            }
        })?,
        None => {
            return Err(ParseError::MissingField {
                path: path.to_string(),
                field: "in".to_string(),
            })
        }
    };

    // Positional arguments keep nested shapes in the prefixed reference.
    let body = match (location, raw.get("schema")) {
        (ArgumentLocation::Body, _) => parse_body(raw, path)?,
        (_, Some(schema)) => {
            let resolved = resolve(schema, &format!("{}/schema", path))?;
            Some((resolved.type_ref().into_name(), Shape::Plain))
        }
        (_, None) => get_str(raw, "contentType").map(|ct| (ct.to_string(), Shape::Mime)),
    };
    let (type_name, shape) = body.ok_or_else(|| ParseError::MissingField {
        path: path.to_string(),
        field: "schema".to_string(),
    })?;

    let argument = Argument {
        name: name.to_string(),
        location: Some(location),
        type_name: Some(type_name),
    };
    Ok((argument, shape))
}

fn parse_throw(raw: &Value, path: &str) -> Result<Throw, ParseError> {
    let Some(raw) = raw.as_object() else {
        return Err(ParseError::InvalidField {
            path: path.to_string(),
            field: "throws".to_string(),
            message: format!("expected an object, got {}", json_type_name(raw)),
        });
    };

    let code = match raw.get("code") {
        Some(code) => status_code(code, path)?,
        None => {
            return Err(ParseError::MissingField {
                path: path.to_string(),
                field: "code".to_string(),
            })
        }
    };

    let (type_name, shape) = parse_body(raw, path)?.ok_or_else(|| ParseError::MissingField {
        path: path.to_string(),
        field: "schema".to_string(),
    })?;

    let mut throw = Throw::new(code, type_name);
    throw.type_shape = shape.non_plain();
    Ok(throw)
}

/// Type and shape of a payload or response: a `schema`, split at its
/// outermost shape, or a `contentType` with shape `mime`.
fn parse_body(raw: &Map<String, Value>, path: &str) -> Result<Option<(String, Shape)>, ParseError> {
    if let Some(schema) = raw.get("schema") {
        let resolved = resolve(schema, &format!("{}/schema", path))?;
        let (type_ref, shape) = resolved.decompose();
        return Ok(Some((type_ref.into_name(), shape)));
    }

    if let Some(content_type) = get_str(raw, "contentType") {
        return Ok(Some((content_type.to_string(), Shape::Mime)));
    }

    Ok(None)
}

fn status_code(value: &Value, path: &str) -> Result<u16, ParseError> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .ok_or_else(|| ParseError::InvalidField {
            path: path.to_string(),
            field: "code".to_string(),
            message: format!("expected an HTTP status code, got {}", value),
        })
}

fn get_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key).and_then(Value::as_str)
}

fn get_string(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

fn string_map(value: &Value) -> Option<IndexMap<String, String>> {
    value.as_object().map(|map| {
        map.iter()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
            .collect()
    })
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}
