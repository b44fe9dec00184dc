use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::resolver::template_of;
use crate::types::{DefinitionKind, PropertyKind, DEFAULT_GENERIC, GENERIC_REFERENCE};

/// Named type definition of a document.
///
/// Struct fields (`parent`, `template`, `base`, `discriminator`, `mapping`,
/// `properties`) apply to [`DefinitionKind::Struct`]; `reference` and
/// `generic` describe the element of a map or array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Type {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: DefinitionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_template",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<String>,
}

impl Type {
    pub fn new(name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    pub fn index_of(&self, property_name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name == property_name)
    }
}

/// Property of a struct definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_template",
        skip_serializing_if = "Option::is_none"
    )]
    pub template: Option<IndexMap<String, String>>,
    /// Reference list written by older editors, and by the parser for
    /// union and intersection branches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refs: Option<Vec<String>>,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            format: None,
            deprecated: None,
            reference: None,
            generic: None,
            template: None,
            refs: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_generic(mut self, generic: impl Into<String>) -> Self {
        self.generic = Some(generic.into());
        self
    }

    /// Derive `reference`/`generic` from a legacy `refs` list when no
    /// explicit reference is set.
    pub fn apply_legacy_refs(&mut self) {
        if self.reference.is_some() {
            return;
        }
        let Some(first) = self.refs.as_ref().and_then(|refs| refs.first()) else {
            return;
        };

        if first == DEFAULT_GENERIC {
            if self.kind.is_collection() {
                self.reference = Some(GENERIC_REFERENCE.to_string());
                self.generic = Some(DEFAULT_GENERIC.to_string());
            }
        } else {
            self.reference = Some(first.clone());
        }
    }
}

fn deserialize_template<'de, D>(deserializer: D) -> Result<Option<IndexMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(template_of))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_accepts_kind_alias_and_legacy_object() {
        let ty: Type = serde_json::from_value(json!({"name": "Pet", "kind": "struct"})).unwrap();
        assert_eq!(ty.kind, DefinitionKind::Struct);

        let ty: Type = serde_json::from_value(json!({"name": "Pet", "type": "object"})).unwrap();
        assert_eq!(ty.kind, DefinitionKind::Struct);
    }

    #[test]
    fn type_lookups() {
        let ty: Type = serde_json::from_value(json!({
            "name": "Pet",
            "type": "struct",
            "properties": [
                {"name": "id", "type": "integer"},
                {"name": "name", "type": "string"}
            ]
        }))
        .unwrap();

        assert_eq!(ty.index_of("name"), Some(1));
        assert_eq!(ty.index_of("missing"), None);
        assert_eq!(ty.property("id").map(|p| &p.kind), Some(&PropertyKind::Integer));
    }

    #[test]
    fn bare_string_template_maps_default_generic() {
        let ty: Type = serde_json::from_value(json!({
            "name": "PetCollection",
            "type": "struct",
            "parent": "Collection",
            "template": "Pet"
        }))
        .unwrap();
        assert_eq!(ty.template.unwrap()["T"], "Pet");
    }

    #[test]
    fn legacy_refs_set_reference() {
        let mut property: Property =
            serde_json::from_value(json!({"name": "owner", "type": "object", "refs": ["Person"]}))
                .unwrap();
        property.apply_legacy_refs();
        assert_eq!(property.reference.as_deref(), Some("Person"));
    }

    #[test]
    fn legacy_generic_refs_on_collections() {
        let mut property: Property =
            serde_json::from_value(json!({"name": "entry", "type": "array", "refs": ["T"]}))
                .unwrap();
        property.apply_legacy_refs();
        assert_eq!(property.reference.as_deref(), Some("generic"));
        assert_eq!(property.generic.as_deref(), Some("T"));

        let mut property: Property =
            serde_json::from_value(json!({"name": "entry", "type": "object", "refs": ["T"]}))
                .unwrap();
        property.apply_legacy_refs();
        assert_eq!(property.reference, None);
    }

    #[test]
    fn legacy_refs_never_override_reference() {
        let mut property = Property::new("owner", PropertyKind::Object).with_reference("Person");
        property.refs = Some(vec!["Company".into()]);
        property.apply_legacy_refs();
        assert_eq!(property.reference.as_deref(), Some("Person"));
    }
}
