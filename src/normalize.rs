//! Backward-compatible normalization of wire specifications.
//!
//! Older specification versions spelled the same structures differently:
//! `$ref` instead of `target`, `$extends`/`extends` instead of a `parent`
//! reference, `object` instead of `struct`, `items`/`additionalProperties`
//! instead of `schema`, a bare string `template`. This pass rewrites a raw
//! tree into the canonical spelling so the parser only deals with one form.
//!
//! Normalization never fails; anything it cannot make sense of is left in
//! place for the parser to reject with a proper path.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::warn;

use crate::resolver::{element_of, template_of, ELEMENT_KEYS};

const PARENT_KEYS: &[&str] = &["$extends", "extends"];
const TEMPLATE_KEYS: &[&str] = &["template", "$template"];

/// Normalize a whole specification: root, definitions and operation schemas.
pub fn specification(spec: &Value) -> Value {
    let Some(map) = spec.as_object() else {
        return spec.clone();
    };
    let mut out = map.clone();

    if !out.contains_key("root") {
        if let Some(root) = out.remove("$ref").filter(Value::is_string) {
            out.insert("root".to_string(), root);
        }
    }

    if let Some(Value::Object(definitions)) = out.get_mut("definitions") {
        for def in definitions.values_mut() {
            *def = definition(def);
        }
    }

    if let Some(Value::Object(operations)) = out.get_mut("operations") {
        for op in operations.values_mut() {
            if let Value::Object(op) = op {
                operation(op);
            }
        }
    }

    Value::Object(out)
}

/// Normalize the definitions of an imported schema in place.
pub fn definitions(definitions: &mut Map<String, Value>) {
    for def in definitions.values_mut() {
        *def = definition(def);
    }
}

fn operation(op: &mut Map<String, Value>) {
    if let Some(Value::Object(arguments)) = op.get_mut("arguments") {
        for argument in arguments.values_mut() {
            normalize_schema_slot(argument);
        }
    }
    if let Some(Value::Array(throws)) = op.get_mut("throws") {
        for throw in throws {
            normalize_schema_slot(throw);
        }
    }
    if let Some(ret) = op.get_mut("return") {
        normalize_schema_slot(ret);
    }
}

fn normalize_schema_slot(slot: &mut Value) {
    if let Some(schema) = slot.get_mut("schema") {
        *schema = property(schema);
    }
}

/// Normalize a single definition.
pub fn definition(def: &Value) -> Value {
    let Some(map) = def.as_object() else {
        return def.clone();
    };
    let mut out = map.clone();

    let kind = definition_kind(&out);
    if let Some(kind) = kind {
        out.insert("type".to_string(), Value::String(kind.to_string()));
    }

    match kind {
        Some("struct") => normalize_parent(&mut out),
        Some("map") | Some("array") => normalize_element(&mut out),
        _ => {}
    }

    if let Some(Value::Object(properties)) = out.get_mut("properties") {
        for prop in properties.values_mut() {
            *prop = property(prop);
        }
    }

    Value::Object(out)
}

/// Normalize a property schema, recursing into elements and branches.
pub fn property(prop: &Value) -> Value {
    let Some(map) = prop.as_object() else {
        return prop.clone();
    };
    let mut out = map.clone();

    if !out.contains_key("target") {
        if let Some(target) = out.remove("$ref").filter(Value::is_string) {
            out.insert("target".to_string(), target);
            match out.get("type").and_then(Value::as_str) {
                None | Some("object") => {
                    out.insert("type".to_string(), Value::from("reference"));
                }
                _ => {}
            }
        }
    }

    if let Some(name) = out.remove("$generic").filter(Value::is_string) {
        out.insert("type".to_string(), Value::from("generic"));
        out.insert("name".to_string(), name);
    }

    if let Some(template) = TEMPLATE_KEYS.iter().find_map(|key| out.get(*key)) {
        if template.is_string() {
            warn!(template = %template, "bare string template mapped to the default generic");
        }
        let template = template_of(template);
        out.remove("$template");
        out.remove("template");
        if let Some(template) = template {
            out.insert("template".to_string(), template_value(template));
        }
    }

    let kind = out.get("type").and_then(Value::as_str).map(String::from);
    let has_element = element_of(&out).is_some();
    match kind.as_deref() {
        Some("object") if out.contains_key("target") => {
            out.insert("type".to_string(), Value::from("reference"));
        }
        Some("object") if has_element => {
            out.insert("type".to_string(), Value::from("map"));
        }
        None if out.contains_key("target") => {
            out.insert("type".to_string(), Value::from("reference"));
        }
        None if out.get("additionalProperties").is_some_and(Value::is_object) => {
            out.insert("type".to_string(), Value::from("map"));
        }
        None if out.get("items").is_some_and(Value::is_object) => {
            out.insert("type".to_string(), Value::from("array"));
        }
        _ => {}
    }

    normalize_element(&mut out);

    for key in ["oneOf", "allOf"] {
        if let Some(Value::Array(branches)) = out.get_mut(key) {
            for branch in branches {
                *branch = property(branch);
            }
        }
    }

    Value::Object(out)
}

/// Explicit `type` wins; otherwise infer from the structural shape.
fn definition_kind(def: &Map<String, Value>) -> Option<&'static str> {
    match def.get("type").and_then(Value::as_str) {
        Some("object") => {
            let map_like = def.get("additionalProperties").is_some_and(Value::is_object)
                && !def.contains_key("properties");
            Some(if map_like { "map" } else { "struct" })
        }
        Some("struct") => Some("struct"),
        Some("map") => Some("map"),
        Some("array") => Some("array"),
        Some(_) => None,
        None => {
            if def.get("properties").is_some_and(Value::is_object)
                || def.contains_key("parent")
                || PARENT_KEYS.iter().any(|key| def.contains_key(*key))
            {
                Some("struct")
            } else if def.get("additionalProperties").is_some_and(Value::is_object) {
                Some("map")
            } else if def.get("items").is_some_and(Value::is_object) {
                Some("array")
            } else {
                None
            }
        }
    }
}

/// Rewrite every parent spelling into `parent: {type: reference, target,
/// template}`. First match wins: `parent.target`, `parent.$ref`, string
/// `parent`, a definition-level `$ref`, `$extends`, then `extends`.
fn normalize_parent(def: &mut Map<String, Value>) {
    let parent = def.remove("parent");
    let parent_obj = parent.as_ref().and_then(Value::as_object);

    let target = parent_obj
        .and_then(|p| {
            ["target", "$ref"]
                .iter()
                .find_map(|key| p.get(*key).and_then(Value::as_str))
        })
        .or_else(|| parent.as_ref().and_then(Value::as_str))
        .or_else(|| def.get("$ref").and_then(Value::as_str))
        .or_else(|| {
            PARENT_KEYS
                .iter()
                .find_map(|key| def.get(*key).and_then(Value::as_str))
        })
        .filter(|t| !t.is_empty())
        .map(String::from);

    let template = parent_obj
        .and_then(|p| TEMPLATE_KEYS.iter().find_map(|key| p.get(*key)))
        .or_else(|| TEMPLATE_KEYS.iter().find_map(|key| def.get(*key)))
        .cloned();

    for key in PARENT_KEYS.iter().chain(TEMPLATE_KEYS).chain(&["$ref"]) {
        def.remove(*key);
    }

    let Some(target) = target else {
        return;
    };

    let mut node = Map::new();
    node.insert("type".to_string(), Value::from("reference"));
    node.insert("target".to_string(), Value::String(target));
    if let Some(template) = template {
        if template.is_string() {
            warn!(template = %template, "bare string template mapped to the default generic");
        }
        if let Some(template) = template_of(&template) {
            node.insert("template".to_string(), template_value(template));
        }
    }
    def.insert("parent".to_string(), Value::Object(node));
}

fn template_value(template: IndexMap<String, String>) -> Value {
    Value::Object(
        template
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect(),
    )
}

/// Move the first element schema to `schema` and normalize it.
fn normalize_element(out: &mut Map<String, Value>) {
    let Some((key, _)) = element_of(out) else {
        return;
    };
    let Some(element) = out.remove(key) else {
        return;
    };
    for other in ELEMENT_KEYS {
        if out.get(*other).is_some_and(Value::is_object) {
            out.remove(*other);
        }
    }
    out.insert("schema".to_string(), property(&element));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_object_definition_becomes_struct() {
        let def = definition(&json!({
            "type": "object",
            "properties": {"owner": {"$ref": "Person"}}
        }));
        assert_eq!(
            def,
            json!({
                "type": "struct",
                "properties": {"owner": {"type": "reference", "target": "Person"}}
            })
        );
    }

    #[test]
    fn object_with_additional_properties_becomes_map() {
        let def = definition(&json!({
            "type": "object",
            "additionalProperties": {"type": "string"}
        }));
        assert_eq!(def, json!({"type": "map", "schema": {"type": "string"}}));
    }

    #[test]
    fn untyped_definitions_are_inferred() {
        assert_eq!(definition(&json!({"$extends": "Base"}))["type"], "struct");
        assert_eq!(
            definition(&json!({"additionalProperties": {"type": "integer"}}))["type"],
            "map"
        );
        assert_eq!(definition(&json!({"items": {"$ref": "Pet"}}))["type"], "array");
        assert_eq!(definition(&json!({"description": "?"})).get("type"), None);
    }

    #[test]
    fn extends_becomes_parent_reference() {
        let def = definition(&json!({
            "$extends": "Collection",
            "$template": {"T": "Pet"},
            "properties": {}
        }));
        assert_eq!(
            def["parent"],
            json!({"type": "reference", "target": "Collection", "template": {"T": "Pet"}})
        );
        assert!(def.get("$extends").is_none());
        assert!(def.get("$template").is_none());
    }

    #[test]
    fn parent_target_wins_over_extends() {
        let def = definition(&json!({
            "type": "struct",
            "parent": {"type": "reference", "target": "Base"},
            "$extends": "Other"
        }));
        assert_eq!(def["parent"]["target"], "Base");
    }

    #[test]
    fn definition_ref_wins_over_extends() {
        let def = definition(&json!({
            "type": "struct",
            "$ref": "Base",
            "$extends": "Other"
        }));
        assert_eq!(def["parent"]["target"], "Base");
        assert!(def.get("$ref").is_none());
        assert!(def.get("$extends").is_none());
    }

    #[test]
    fn legacy_string_template_on_parent() {
        let def = definition(&json!({
            "type": "struct",
            "parent": {"$ref": "Collection", "template": "Pet"}
        }));
        assert_eq!(def["parent"]["template"], json!({"T": "Pet"}));
    }

    #[test]
    fn property_generic_and_items() {
        assert_eq!(
            property(&json!({"$generic": "T"})),
            json!({"type": "generic", "name": "T"})
        );
        assert_eq!(
            property(&json!({"type": "array", "items": {"$ref": "Pet"}})),
            json!({"type": "array", "schema": {"type": "reference", "target": "Pet"}})
        );
        assert_eq!(
            property(&json!({"additionalProperties": {"type": "string"}})),
            json!({"type": "map", "schema": {"type": "string"}})
        );
    }

    #[test]
    fn specification_ref_becomes_root() {
        let spec = specification(&json!({
            "$ref": "Pet",
            "definitions": {"Pet": {"type": "object", "properties": {}}}
        }));
        assert_eq!(spec["root"], "Pet");
        assert!(spec.get("$ref").is_none());
        assert_eq!(spec["definitions"]["Pet"]["type"], "struct");
    }

    #[test]
    fn operation_schemas_are_normalized() {
        let spec = specification(&json!({
            "operations": {
                "pet.list": {
                    "return": {"code": 200, "schema": {"type": "array", "items": {"$ref": "Pet"}}},
                    "throws": [{"code": 500, "schema": {"$ref": "Error"}}]
                }
            }
        }));
        let op = &spec["operations"]["pet.list"];
        assert_eq!(
            op["return"]["schema"],
            json!({"type": "array", "schema": {"type": "reference", "target": "Pet"}})
        );
        assert_eq!(
            op["throws"][0]["schema"],
            json!({"type": "reference", "target": "Error"})
        );
    }
}
