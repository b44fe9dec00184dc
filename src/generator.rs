//! Document to specification conversion.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::document::{Document, Operation, Property, Type};
use crate::error::GenerateError;
use crate::resolver::{reference_node, wrap, TypeRef};
use crate::specification::{
    self, Argument, DefinitionType, DefinitionTypeKind, PropertyType, Response, Specification,
    StructDefinition,
};
use crate::types::{
    is_payload_method, ArgumentLocation, DefinitionKind, PropertyKind, Shape, NO_CONTENT,
};

/// Name of the synthetic body argument.
pub const PAYLOAD_ARGUMENT: &str = "payload";

/// Options for specification generation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Base URL used when the document doesn't declare one.
    pub base_url: Option<String>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fallback base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Generate the wire specification of a document.
///
/// # Errors
///
/// Returns `GenerateError::Document` for a duplicate operation or type
/// name, and `GenerateError` for a throw without type, a missing argument
/// location or type, a map/array without element reference, or an
/// unrecognized property or definition type.
pub fn generate(
    document: &Document,
    options: &GenerateOptions,
) -> Result<Specification, GenerateError> {
    document.check_unique_names()?;

    let mut spec = Specification {
        base_url: non_empty(&document.base_url)
            .or_else(|| non_empty(&options.base_url))
            .map(String::from),
        security: document.security.clone(),
        ..Default::default()
    };

    let import: IndexMap<String, String> = document
        .imports
        .iter()
        .filter(|import| !import.alias.is_empty())
        .filter_map(|import| import.resolved_url().map(|url| (import.alias.clone(), url)))
        .collect();
    if !import.is_empty() {
        spec.import = Some(import);
    }

    for operation in &document.operations {
        let path = format!("/operations/{}", operation.name);
        spec.operations.insert(
            operation.name.clone(),
            generate_operation(operation, &path)?,
        );
    }

    for ty in &document.types {
        if ty.name.is_empty() {
            continue;
        }
        let path = format!("/definitions/{}", ty.name);
        spec.definitions
            .insert(ty.name.clone(), generate_definition(ty, &path)?);
    }

    spec.root = document.root_type().map(|ty| ty.name.clone());

    Ok(spec)
}

/// Generate the specification as pretty-printed JSON.
///
/// # Errors
///
/// Returns any error of [`generate`], or `GenerateError::Serialize`.
pub fn generate_json(
    document: &Document,
    options: &GenerateOptions,
) -> Result<String, GenerateError> {
    generate(document, options)?
        .to_json_pretty()
        .map_err(|source| GenerateError::Serialize { source })
}

fn generate_operation(
    operation: &Operation,
    path: &str,
) -> Result<specification::Operation, GenerateError> {
    debug!(operation = %operation.name, "generating operation");

    let mut result = specification::Operation {
        description: operation.description.clone(),
        method: operation.http_method.clone(),
        path: operation.http_path.clone(),
        stability: operation.stability,
        security: operation.security.clone(),
        authorization: operation.authorization,
        tags: operation.tags.clone(),
        ..Default::default()
    };

    let mut arguments = IndexMap::new();
    for argument in &operation.arguments {
        if argument.location == Some(ArgumentLocation::Body) || argument.name.is_empty() {
            continue;
        }

        let arg_path = format!("{}/arguments/{}", path, argument.name);
        let location = argument.location.ok_or_else(|| GenerateError::MissingField {
            path: arg_path.clone(),
            field: "in".to_string(),
        })?;
        let type_name = non_empty(&argument.type_name).ok_or_else(|| {
            GenerateError::MissingField {
                path: arg_path.clone(),
                field: "type".to_string(),
            }
        })?;

        arguments.insert(
            argument.name.clone(),
            Argument::schema(location, reference_node(type_name, None, None, &arg_path)?),
        );
    }

    let payload_path = format!("{}/arguments/{}", path, PAYLOAD_ARGUMENT);
    let payload = non_empty(&operation.payload);
    let legacy = operation
        .legacy_payload()
        .and_then(|argument| non_empty(&argument.type_name));

    if payload.is_some() && !is_payload_method(operation.http_method.as_deref()) {
        warn!(
            operation = %operation.name,
            method = operation.http_method.as_deref().unwrap_or(""),
            "payload ignored for method without request body"
        );
    }

    match (payload, legacy) {
        (Some(payload), _) if is_payload_method(operation.http_method.as_deref()) => {
            let shape = operation.payload_shape.unwrap_or_default();
            arguments.insert(
                PAYLOAD_ARGUMENT.to_string(),
                body_argument(payload, shape, &payload_path)?,
            );
        }
        (_, Some(legacy)) => {
            warn!(operation = %operation.name, "legacy body argument emitted as payload");
            arguments.insert(
                PAYLOAD_ARGUMENT.to_string(),
                body_argument(legacy, Shape::Plain, &payload_path)?,
            );
        }
        _ => {}
    }

    if !arguments.is_empty() {
        result.arguments = Some(arguments);
    }

    if !operation.throws.is_empty() {
        let mut throws = Vec::with_capacity(operation.throws.len());
        for (i, throw) in operation.throws.iter().enumerate() {
            let throw_path = format!("{}/throws/{}", path, i);
            let type_name = non_empty(&throw.type_name)
                .ok_or_else(|| GenerateError::MissingType {
                    path: throw_path.clone(),
                })?;
            throws.push(response(
                throw.code,
                type_name,
                throw.type_shape.unwrap_or_default(),
                &throw_path,
            )?);
        }
        result.throws = Some(throws);
    }

    if operation.http_code == NO_CONTENT {
        result.returns = Some(Response::schema(NO_CONTENT, PropertyType::any()));
    } else if let Some(returns) = non_empty(&operation.returns) {
        result.returns = Some(response(
            operation.http_code,
            returns,
            operation.return_shape.unwrap_or_default(),
            &format!("{}/return", path),
        )?);
    }

    Ok(result)
}

fn body_argument(type_name: &str, shape: Shape, path: &str) -> Result<Argument, GenerateError> {
    Ok(match shape {
        Shape::Mime => Argument::content_type(ArgumentLocation::Body, type_name),
        shape => Argument::schema(
            ArgumentLocation::Body,
            wrap(&TypeRef::named(type_name), shape, path)?,
        ),
    })
}

fn response(code: u16, type_name: &str, shape: Shape, path: &str) -> Result<Response, GenerateError> {
    Ok(match shape {
        Shape::Mime => Response::content_type(code, type_name),
        shape => Response::schema(code, wrap(&TypeRef::named(type_name), shape, path)?),
    })
}

fn generate_definition(ty: &Type, path: &str) -> Result<DefinitionType, GenerateError> {
    debug!(definition = %ty.name, kind = %ty.kind, "generating definition");

    let kind = match &ty.kind {
        DefinitionKind::Map | DefinitionKind::Array => {
            let reference = non_empty(&ty.reference).ok_or_else(|| GenerateError::MissingField {
                path: path.to_string(),
                field: "reference".to_string(),
            })?;
            let schema = reference_node(reference, ty.generic.as_deref(), None, path)?;
            if ty.kind == DefinitionKind::Map {
                DefinitionTypeKind::Map { schema }
            } else {
                DefinitionTypeKind::Array { schema }
            }
        }
        DefinitionKind::Struct => DefinitionTypeKind::Struct(generate_struct(ty, path)?),
        DefinitionKind::Unknown(value) => {
            return Err(GenerateError::InvalidDefinitionType {
                path: path.to_string(),
                value: value.clone(),
            })
        }
    };

    let mut definition = DefinitionType::new(kind);
    definition.description = ty.description.clone();
    definition.deprecated = ty.deprecated;
    Ok(definition)
}

fn generate_struct(ty: &Type, path: &str) -> Result<StructDefinition, GenerateError> {
    let mut properties = IndexMap::new();
    for property in &ty.properties {
        if property.name.is_empty() {
            continue;
        }
        let prop_path = format!("{}/properties/{}", path, property.name);
        properties.insert(
            property.name.clone(),
            generate_property(property, &prop_path)?,
        );
    }

    Ok(StructDefinition {
        parent: non_empty(&ty.parent)
            .map(|parent| PropertyType::reference(parent).with_template(ty.template.clone())),
        base: ty.base,
        discriminator: non_empty(&ty.discriminator).map(String::from),
        mapping: ty.mapping.clone(),
        properties: (!properties.is_empty()).then_some(properties),
    })
}

/// Build the schema node of a property.
///
/// # Errors
///
/// Returns `GenerateError::InvalidPropertyType` for an unrecognized type and
/// `GenerateError::MissingField` if a reference or generic name is missing.
pub fn generate_property(property: &Property, path: &str) -> Result<PropertyType, GenerateError> {
    let node = match &property.kind {
        PropertyKind::Object => {
            let reference = non_empty(&property.reference).ok_or_else(|| {
                GenerateError::MissingField {
                    path: path.to_string(),
                    field: "reference".to_string(),
                }
            })?;
            PropertyType::reference(reference).with_template(property.template.clone())
        }
        PropertyKind::Map | PropertyKind::Array => {
            let element = reference_node(
                property.reference.as_deref().unwrap_or_default(),
                property.generic.as_deref(),
                property.format.as_deref(),
                path,
            )?;
            if property.kind == PropertyKind::Map {
                PropertyType::map(element)
            } else {
                PropertyType::array(element)
            }
        }
        PropertyKind::String => {
            PropertyType::string(non_empty(&property.format).map(String::from))
        }
        PropertyKind::Integer => PropertyType::integer(),
        PropertyKind::Number => PropertyType::number(),
        PropertyKind::Boolean => PropertyType::boolean(),
        PropertyKind::Any => PropertyType::any(),
        PropertyKind::Generic => {
            let name = non_empty(&property.generic).ok_or_else(|| GenerateError::MissingField {
                path: path.to_string(),
                field: "generic".to_string(),
            })?;
            PropertyType::generic(name)
        }
        PropertyKind::Union | PropertyKind::Intersection => {
            warn!(path, kind = %property.kind, "composite property generated as any");
            PropertyType::any()
        }
        PropertyKind::Unknown(value) => {
            return Err(GenerateError::InvalidPropertyType {
                path: path.to_string(),
                value: value.clone(),
            })
        }
    };

    Ok(node
        .with_description(property.description.clone())
        .with_deprecated(property.deprecated))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
