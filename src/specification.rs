//! Typed model of the wire specification.
//!
//! These structures serialize to the exact JSON emitted by the generator.
//! The parser reads raw JSON instead, so the model only has to describe the
//! canonical dialect and never the historical spellings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Security;
use crate::types::ArgumentLocation;

/// Root of a wire specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub operations: IndexMap<String, Operation>,
    #[serde(default)]
    pub definitions: IndexMap<String, DefinitionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

impl Specification {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<IndexMap<String, Argument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throws: Option<Vec<Response>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Operation argument. Carries either a `schema` or, for raw bodies, a
/// `contentType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    #[serde(rename = "in")]
    pub location: ArgumentLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Argument {
    pub fn schema(location: ArgumentLocation, schema: PropertyType) -> Self {
        Self {
            location,
            schema: Some(schema),
            content_type: None,
        }
    }

    pub fn content_type(location: ArgumentLocation, content_type: impl Into<String>) -> Self {
        Self {
            location,
            schema: None,
            content_type: Some(content_type.into()),
        }
    }
}

/// Return value or thrown error of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

impl Response {
    pub fn schema(code: u16, schema: PropertyType) -> Self {
        Self {
            code,
            schema: Some(schema),
            content_type: None,
        }
    }

    pub fn content_type(code: u16, content_type: impl Into<String>) -> Self {
        Self {
            code,
            schema: None,
            content_type: Some(content_type.into()),
        }
    }
}

/// Schema node of a property, argument or response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(flatten)]
    pub kind: PropertyTypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyTypeKind {
    Reference {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<IndexMap<String, String>>,
    },
    Map {
        schema: Box<PropertyType>,
    },
    Array {
        schema: Box<PropertyType>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    Integer,
    Number,
    Boolean,
    Any,
    Generic {
        name: String,
    },
}

impl PropertyType {
    fn of(kind: PropertyTypeKind) -> Self {
        Self {
            kind,
            description: None,
            deprecated: None,
        }
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self::of(PropertyTypeKind::Reference {
            target: target.into(),
            template: None,
        })
    }

    pub fn map(schema: PropertyType) -> Self {
        Self::of(PropertyTypeKind::Map {
            schema: Box::new(schema),
        })
    }

    pub fn array(schema: PropertyType) -> Self {
        Self::of(PropertyTypeKind::Array {
            schema: Box::new(schema),
        })
    }

    pub fn string(format: Option<String>) -> Self {
        Self::of(PropertyTypeKind::String { format })
    }

    pub fn integer() -> Self {
        Self::of(PropertyTypeKind::Integer)
    }

    pub fn number() -> Self {
        Self::of(PropertyTypeKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(PropertyTypeKind::Boolean)
    }

    pub fn any() -> Self {
        Self::of(PropertyTypeKind::Any)
    }

    pub fn generic(name: impl Into<String>) -> Self {
        Self::of(PropertyTypeKind::Generic { name: name.into() })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_deprecated(mut self, deprecated: Option<bool>) -> Self {
        self.deprecated = deprecated;
        self
    }

    /// Attach a generic substitution map. No-op unless this is a reference
    /// node; an empty map is dropped.
    pub fn with_template(mut self, template: Option<IndexMap<String, String>>) -> Self {
        if let PropertyTypeKind::Reference { template: slot, .. } = &mut self.kind {
            *slot = template.filter(|t| !t.is_empty());
        }
        self
    }
}

/// Named definition of a specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionType {
    #[serde(flatten)]
    pub kind: DefinitionTypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DefinitionTypeKind {
    Struct(StructDefinition),
    Map { schema: PropertyType },
    Array { schema: PropertyType },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructDefinition {
    /// Reference node naming the parent struct.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, PropertyType>>,
}

impl DefinitionType {
    pub fn new(kind: DefinitionTypeKind) -> Self {
        Self {
            kind,
            description: None,
            deprecated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_type_serializes_tag_first() {
        let node = PropertyType::string(Some("date-time".into()))
            .with_description(Some("Creation date".into()));
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"string","format":"date-time","description":"Creation date"}"#
        );
    }

    #[test]
    fn nested_collection_nodes() {
        let node = PropertyType::map(PropertyType::array(PropertyType::reference("Pet")));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "map",
                "schema": {"type": "array", "schema": {"type": "reference", "target": "Pet"}}
            })
        );
    }

    #[test]
    fn template_only_attaches_to_references() {
        let mut template = IndexMap::new();
        template.insert("T".to_string(), "Pet".to_string());

        let node = PropertyType::reference("Collection").with_template(Some(template.clone()));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "reference", "target": "Collection", "template": {"T": "Pet"}})
        );

        let node = PropertyType::integer().with_template(Some(template));
        assert_eq!(serde_json::to_value(&node).unwrap(), json!({"type": "integer"}));

        let node = PropertyType::reference("Pet").with_template(Some(IndexMap::new()));
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "reference", "target": "Pet"})
        );
    }

    #[test]
    fn struct_definition_serialization() {
        let mut properties = IndexMap::new();
        properties.insert("id".to_string(), PropertyType::integer());
        let definition = DefinitionType::new(DefinitionTypeKind::Struct(StructDefinition {
            discriminator: Some("kind".into()),
            properties: Some(properties),
            ..Default::default()
        }));

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "type": "struct",
                "discriminator": "kind",
                "properties": {"id": {"type": "integer"}}
            })
        );
    }

    #[test]
    fn specification_deserializes_typed_model() {
        let spec: Specification = serde_json::from_value(json!({
            "operations": {
                "pet.get": {
                    "method": "GET",
                    "path": "/pet/:id",
                    "arguments": {"id": {"in": "path", "schema": {"type": "integer"}}},
                    "return": {"code": 200, "schema": {"type": "reference", "target": "Pet"}}
                }
            },
            "definitions": {
                "Pets": {"type": "array", "schema": {"type": "reference", "target": "Pet"}}
            }
        }))
        .unwrap();

        let operation = &spec.operations["pet.get"];
        assert_eq!(operation.returns.as_ref().map(|r| r.code), Some(200));
        assert_eq!(
            operation.arguments.as_ref().unwrap()["id"].location,
            ArgumentLocation::Path
        );
        assert!(matches!(
            spec.definitions["Pets"].kind,
            DefinitionTypeKind::Array { .. }
        ));
    }

    #[test]
    fn response_without_schema() {
        let response = Response::content_type(200, "application/octet-stream");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"code": 200, "contentType": "application/octet-stream"})
        );
    }
}
