//! Editor document model.
//!
//! A [`Document`] is the editor's view of an API: operations and type
//! definitions held as ordered lists. It has no conversion logic of its own;
//! see [`crate::generator`] and [`crate::parser`].

mod definition;
mod import;
mod operation;
mod security;

pub use definition::{Property, Type};
pub use import::{parse_typehub_uri, typehub_uri, Import};
pub use operation::{Argument, Operation, Throw};
pub use security::Security;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocumentError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DocumentRepr")]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<Type>,
    /// Name of the root type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

/// Editor JSON as written to disk; `root` may be an index into `types`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRepr {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default, deserialize_with = "security::deserialize_lenient")]
    security: Option<Security>,
    #[serde(default)]
    imports: Vec<Import>,
    #[serde(default)]
    operations: Vec<Operation>,
    #[serde(default)]
    types: Vec<Type>,
    #[serde(default)]
    root: Option<RootRef>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RootRef {
    Index(usize),
    Name(String),
}

impl TryFrom<DocumentRepr> for Document {
    type Error = DocumentError;

    fn try_from(repr: DocumentRepr) -> Result<Self, Self::Error> {
        let root = match repr.root {
            Some(RootRef::Index(index)) => match repr.types.get(index) {
                Some(ty) => Some(ty.name.clone()),
                None => {
                    return Err(DocumentError::RootIndexOutOfRange {
                        index,
                        len: repr.types.len(),
                    })
                }
            },
            Some(RootRef::Name(name)) if !name.is_empty() => Some(name),
            _ => None,
        };

        let mut document = Document {
            base_url: repr.base_url,
            security: repr.security,
            imports: repr.imports,
            operations: repr.operations,
            types: repr.types,
            root,
        };

        let imported = document.imports.iter_mut().flat_map(|i| i.types.iter_mut());
        for ty in document.types.iter_mut().chain(imported) {
            for property in &mut ty.properties {
                property.apply_legacy_refs();
            }
        }

        Ok(document)
    }
}

impl Document {
    /// Deserialize the editor JSON form.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|o| o.name == name)
    }

    pub fn operation_mut(&mut self, name: &str) -> Option<&mut Operation> {
        self.operations.iter_mut().find(|o| o.name == name)
    }

    pub fn index_of_operation(&self, name: &str) -> Option<usize> {
        self.operations.iter().position(|o| o.name == name)
    }

    pub fn type_by_name(&self, name: &str) -> Option<&Type> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn type_by_name_mut(&mut self, name: &str) -> Option<&mut Type> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    pub fn index_of_type(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    pub fn import(&self, alias: &str) -> Option<&Import> {
        self.imports.iter().find(|i| i.alias == alias)
    }

    /// The root type, if `root` names an existing type.
    pub fn root_type(&self) -> Option<&Type> {
        self.root.as_deref().and_then(|name| self.type_by_name(name))
    }

    /// Check the document invariants: unique operation names, unique type
    /// names, and a root that names an existing type.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), DocumentError> {
        self.check_unique_names()?;

        if let Some(root) = &self.root {
            if self.type_by_name(root).is_none() {
                return Err(DocumentError::RootReference { root: root.clone() });
            }
        }

        Ok(())
    }

    /// Check that operation names and type names are unique. Unnamed
    /// entries are not compared.
    ///
    /// # Errors
    ///
    /// Returns the first duplicate found.
    pub fn check_unique_names(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::new();
        for operation in self.operations.iter().filter(|o| !o.name.is_empty()) {
            if !seen.insert(operation.name.as_str()) {
                return Err(DocumentError::DuplicateOperation {
                    name: operation.name.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for ty in self.types.iter().filter(|t| !t.name.is_empty()) {
            if !seen.insert(ty.name.as_str()) {
                return Err(DocumentError::DuplicateType {
                    name: ty.name.clone(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DefinitionKind, PropertyKind};
    use serde_json::json;

    fn pet_store() -> Value {
        json!({
            "baseUrl": "https://api.acme.com",
            "operations": [
                {"name": "pet.get", "httpMethod": "GET", "httpPath": "/pet/:id", "return": "Pet"}
            ],
            "types": [
                {"name": "Error", "type": "struct"},
                {"name": "Pet", "type": "struct", "properties": [{"name": "id", "type": "integer"}]}
            ]
        })
    }

    #[test]
    fn root_index_resolves_to_name() {
        let mut value = pet_store();
        value["root"] = json!(1);
        let document = Document::from_value(value).unwrap();
        assert_eq!(document.root.as_deref(), Some("Pet"));
        assert_eq!(document.root_type().map(|t| t.name.as_str()), Some("Pet"));
    }

    #[test]
    fn root_index_out_of_range_errors() {
        let mut value = pet_store();
        value["root"] = json!(7);
        let err = Document::from_value(value).unwrap_err();
        assert!(err.to_string().contains("root index 7 is out of range"));
    }

    #[test]
    fn root_name_is_kept() {
        let mut value = pet_store();
        value["root"] = json!("Pet");
        let document = Document::from_value(value).unwrap();
        assert_eq!(document.root.as_deref(), Some("Pet"));
        assert_eq!(document.to_value().unwrap()["root"], "Pet");
    }

    #[test]
    fn lookups() {
        let document = Document::from_value(pet_store()).unwrap();
        assert_eq!(document.index_of_type("Pet"), Some(1));
        assert_eq!(document.index_of_operation("pet.get"), Some(0));
        assert!(document.operation("pet.delete").is_none());
        assert_eq!(
            document.type_by_name("Pet").map(|t| &t.kind),
            Some(&DefinitionKind::Struct)
        );
    }

    #[test]
    fn unknown_security_is_dropped() {
        let mut value = pet_store();
        value["security"] = json!({"type": "mutualTls"});
        let document = Document::from_value(value).unwrap();
        assert_eq!(document.security, None);
    }

    #[test]
    fn legacy_refs_applied_on_load() {
        let document = Document::from_value(json!({
            "types": [{
                "name": "Owner",
                "type": "struct",
                "properties": [{"name": "pets", "type": "array", "refs": ["Pet"]}]
            }]
        }))
        .unwrap();

        let property = document.types[0].property("pets").unwrap();
        assert_eq!(property.kind, PropertyKind::Array);
        assert_eq!(property.reference.as_deref(), Some("Pet"));
    }

    #[test]
    fn validate_detects_duplicates() {
        let mut document = Document::from_value(pet_store()).unwrap();
        assert_eq!(document.validate(), Ok(()));

        document.types.push(Type::new("Pet", DefinitionKind::Struct));
        assert_eq!(
            document.validate(),
            Err(DocumentError::DuplicateType { name: "Pet".into() })
        );

        document.types.pop();
        document.operations.push(Operation::new("pet.get"));
        assert_eq!(
            document.validate(),
            Err(DocumentError::DuplicateOperation {
                name: "pet.get".into()
            })
        );
    }

    #[test]
    fn validate_detects_missing_root() {
        let mut document = Document::from_value(pet_store()).unwrap();
        document.root = Some("Owner".into());
        assert_eq!(
            document.validate(),
            Err(DocumentError::RootReference {
                root: "Owner".into()
            })
        );
    }
}
