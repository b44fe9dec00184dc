use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Authentication scheme of an API, shared by the document and the wire
/// specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Security {
    #[serde(rename = "httpBasic")]
    HttpBasic,
    #[serde(rename = "httpBearer")]
    HttpBearer,
    #[serde(rename = "apiKey")]
    ApiKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        #[serde(rename = "tokenUrl", default, skip_serializing_if = "Option::is_none")]
        token_url: Option<String>,
        #[serde(
            rename = "authorizationUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        authorization_url: Option<String>,
        #[serde(default, deserialize_with = "deserialize_scopes")]
        scopes: Vec<String>,
    },
}

impl Security {
    /// Read a security object leniently: an unknown or missing `type`, or
    /// malformed fields, yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        match serde_json::from_value(value.clone()) {
            Ok(security) => Some(security),
            Err(e) => {
                warn!(error = %e, "ignoring unsupported security definition");
                None
            }
        }
    }
}

/// Scopes come either as a list of names or as an object keyed by name.
fn deserialize_scopes<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    })
}

/// Field-level counterpart of [`Security::from_value`].
pub(crate) fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<Security>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Security::from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_key_roundtrip() {
        let value = json!({"type": "apiKey", "name": "X-Api-Key", "in": "header"});
        let security = Security::from_value(&value).unwrap();
        assert_eq!(
            security,
            Security::ApiKey {
                name: Some("X-Api-Key".into()),
                location: Some("header".into()),
            }
        );
        assert_eq!(serde_json::to_value(&security).unwrap(), value);
    }

    #[test]
    fn oauth2_object_scopes_become_list() {
        let security = Security::from_value(&json!({
            "type": "oauth2",
            "tokenUrl": "https://api.acme.com/token",
            "scopes": {"read": "Read access", "write": "Write access"}
        }))
        .unwrap();

        let Security::OAuth2 { scopes, token_url, authorization_url } = security else {
            panic!("expected oauth2");
        };
        assert_eq!(scopes, vec!["read", "write"]);
        assert_eq!(token_url.as_deref(), Some("https://api.acme.com/token"));
        assert_eq!(authorization_url, None);
    }

    #[test]
    fn unknown_type_is_absent() {
        assert_eq!(Security::from_value(&json!({"type": "digest"})), None);
        assert_eq!(Security::from_value(&json!({"name": "key"})), None);
        assert_eq!(Security::from_value(&json!("httpBasic")), None);
    }

    #[test]
    fn unit_variants_serialize_type_only() {
        assert_eq!(
            serde_json::to_value(Security::HttpBearer).unwrap(),
            json!({"type": "httpBearer"})
        );
    }
}
