use serde::{Deserialize, Serialize};

use crate::types::{ArgumentLocation, Shape, DEFAULT_HTTP_CODE, DEFAULT_THROW_CODE};

/// Endpoint of a document.
///
/// `payload` is the request body type. An argument located in `body` is the
/// older spelling of the same thing; see the generator for which one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_path: Option<String>,
    #[serde(default = "default_http_code")]
    pub http_code: u16,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<Argument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload_shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<Throw>,
    #[serde(rename = "return", default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Operation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            http_method: None,
            http_path: None,
            http_code: DEFAULT_HTTP_CODE,
            arguments: Vec::new(),
            payload: None,
            payload_shape: None,
            throws: Vec::new(),
            returns: None,
            return_shape: None,
            stability: None,
            security: None,
            authorization: None,
            tags: None,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    /// Last argument located in `body`, the legacy payload.
    pub fn legacy_payload(&self) -> Option<&Argument> {
        self.arguments
            .iter()
            .rev()
            .find(|a| a.location == Some(ArgumentLocation::Body))
    }
}

fn default_http_code() -> u16 {
    DEFAULT_HTTP_CODE
}

fn default_throw_code() -> u16 {
    DEFAULT_THROW_CODE
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<ArgumentLocation>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Argument {
    pub fn new(
        name: impl Into<String>,
        location: ArgumentLocation,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
            type_name: Some(type_name.into()),
        }
    }
}

/// Error response an operation may throw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Throw {
    #[serde(default = "default_throw_code")]
    pub code: u16,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_shape: Option<Shape>,
}

impl Throw {
    pub fn new(code: u16, type_name: impl Into<String>) -> Self {
        Self {
            code,
            type_name: Some(type_name.into()),
            type_shape: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_on_load() {
        let operation: Operation = serde_json::from_value(json!({
            "name": "pet.get",
            "throws": [{"type": "Error"}]
        }))
        .unwrap();
        assert_eq!(operation.http_code, 200);
        assert_eq!(operation.throws[0].code, 500);
    }

    #[test]
    fn editor_field_names() {
        let operation: Operation = serde_json::from_value(json!({
            "name": "pet.create",
            "httpMethod": "POST",
            "httpPath": "/pet",
            "httpCode": 201,
            "payload": "Pet",
            "payloadShape": "array",
            "return": "Message",
            "arguments": [{"name": "dry", "in": "query", "type": "boolean"}]
        }))
        .unwrap();

        assert_eq!(operation.http_method.as_deref(), Some("POST"));
        assert_eq!(operation.payload_shape, Some(Shape::Array));
        assert_eq!(operation.returns.as_deref(), Some("Message"));
        assert_eq!(
            operation.argument("dry"),
            Some(&Argument::new("dry", ArgumentLocation::Query, "boolean"))
        );

        let value = serde_json::to_value(&operation).unwrap();
        assert_eq!(value["return"], "Message");
        assert_eq!(value["arguments"][0]["in"], "query");
    }

    #[test]
    fn legacy_payload_is_body_argument() {
        let mut operation = Operation::new("pet.update");
        operation
            .arguments
            .push(Argument::new("id", ArgumentLocation::Path, "integer"));
        operation
            .arguments
            .push(Argument::new("body", ArgumentLocation::Body, "Pet"));

        assert_eq!(
            operation.legacy_payload().and_then(|a| a.type_name.as_deref()),
            Some("Pet")
        );
    }
}
