use serde::{Deserialize, Serialize};

use super::Type;
use crate::types::TYPEHUB_SCHEME;

/// External schema referenced by alias.
///
/// The location is either a direct `url` or a TypeHub triple
/// (`user`, `document`, `version`). `types` caches the definitions the
/// import resolved to when the document was parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Import {
    #[serde(default)]
    pub alias: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Type>,
}

impl Import {
    /// Build an import from a specification entry. TypeHub URIs are split
    /// into their triple; anything else is kept as `url`.
    pub fn from_url(alias: impl Into<String>, url: &str, types: Vec<Type>) -> Self {
        let mut import = Self {
            alias: alias.into(),
            types,
            ..Default::default()
        };

        match parse_typehub_uri(url) {
            Some((user, document, version)) => {
                import.user = Some(user.to_string());
                import.document = Some(document.to_string());
                import.version = Some(version.to_string());
            }
            None => import.url = Some(url.to_string()),
        }

        import
    }

    /// The URL this import points to, or `None` if neither a URL nor a
    /// complete TypeHub triple is set.
    pub fn resolved_url(&self) -> Option<String> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return Some(url.to_string());
        }

        match (
            non_empty(&self.user),
            non_empty(&self.document),
            non_empty(&self.version),
        ) {
            (Some(user), Some(document), Some(version)) => {
                Some(typehub_uri(user, document, version))
            }
            _ => None,
        }
    }

    pub fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Canonical URI of a TypeHub document version.
pub fn typehub_uri(user: &str, document: &str, version: &str) -> String {
    format!("{}{}:{}@{}", TYPEHUB_SCHEME, user, document, version)
}

/// Split `typehub://{user}:{document}@{version}` into its parts.
pub fn parse_typehub_uri(uri: &str) -> Option<(&str, &str, &str)> {
    let rest = uri.strip_prefix(TYPEHUB_SCHEME)?;
    let (user, rest) = rest.split_once(':')?;
    let (document, version) = rest.split_once('@')?;
    if user.is_empty() || document.is_empty() || version.is_empty() {
        return None;
    }
    Some((user, document, version))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
