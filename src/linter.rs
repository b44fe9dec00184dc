//! Document linting - static analysis of editor document files.
//!
//! Checks editor documents for:
//! - JSON/YAML syntax errors and malformed documents
//! - Duplicate operation and type names, a dangling root
//! - Types the generator would reject
//! - References to unknown types and legacy constructs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::document::{Document, Type};
use crate::loader::load_value;
use crate::types::{
    is_payload_method, is_primitive, DefinitionKind, PropertyKind, Shape, DEFINITION_TYPES,
    GENERIC_REFERENCE, PROPERTY_TYPES,
};

const NESTED_PREFIXES: &[&str] = &["map:", "array:"];

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    /// JSON path to the issue (e.g., "/types/0/properties/1/type")
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(code: &str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory.
///
/// If path is a directory, recursively finds all .json, .yaml and .yml files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let files = collect_document_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path);
        total_errors += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        total_warnings += file_result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single document file.
pub fn lint_file(file: &Path, base_path: &Path) -> FileResult {
    let relative = file.strip_prefix(base_path).unwrap_or(file);
    let relative = if relative.as_os_str().is_empty() {
        file
    } else {
        relative
    };

    let loaded = load_value(file).map_err(|e| e.to_string()).and_then(|value| {
        Document::from_value(value).map_err(|e| format!("invalid document: {}", e))
    });

    let diagnostics = match loaded {
        Ok(document) => lint_document(&document),
        Err(message) => vec![Diagnostic::error("E001", "/", message)],
    };

    FileResult {
        file: relative.to_path_buf(),
        status: status_of(&diagnostics),
        diagnostics,
    }
}

/// Run every check against an in-memory document.
pub fn lint_document(document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let mut seen = HashSet::new();
    for (i, operation) in document.operations.iter().enumerate() {
        if !seen.insert(operation.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                "E002",
                format!("/operations/{}", i),
                format!("duplicate operation \"{}\"", operation.name),
            ));
        }
    }

    let mut seen = HashSet::new();
    for (i, ty) in document.types.iter().enumerate() {
        if !seen.insert(ty.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                "E003",
                format!("/types/{}", i),
                format!("duplicate type \"{}\"", ty.name),
            ));
        }
    }

    if let Some(root) = &document.root {
        if document.type_by_name(root).is_none() {
            diagnostics.push(Diagnostic::error(
                "E004",
                "/root",
                format!("root type \"{}\" not found", root),
            ));
        }
    }

    for (i, operation) in document.operations.iter().enumerate() {
        let path = format!("/operations/{}", i);

        for (j, argument) in operation.arguments.iter().enumerate() {
            if let Some(type_name) = &argument.type_name {
                check_reference(
                    document,
                    type_name,
                    &format!("{}/arguments/{}/type", path, j),
                    &mut diagnostics,
                );
            }
        }

        if let Some(payload) = operation.payload.as_deref().filter(|p| !p.is_empty()) {
            if !is_payload_method(operation.http_method.as_deref()) {
                diagnostics.push(Diagnostic::warning(
                    "W003",
                    format!("{}/payload", path),
                    format!(
                        "payload ignored for method {}",
                        operation.http_method.as_deref().unwrap_or("(none)")
                    ),
                ));
            } else if operation.payload_shape != Some(Shape::Mime) {
                check_reference(
                    document,
                    payload,
                    &format!("{}/payload", path),
                    &mut diagnostics,
                );
            }
        }

        for (j, throw) in operation.throws.iter().enumerate() {
            let throw_path = format!("{}/throws/{}", path, j);
            match throw.type_name.as_deref().filter(|t| !t.is_empty()) {
                None => diagnostics.push(Diagnostic::error(
                    "E005",
                    throw_path,
                    "throw without type",
                )),
                Some(_) if throw.type_shape == Some(Shape::Mime) => {}
                Some(type_name) => check_reference(
                    document,
                    type_name,
                    &format!("{}/type", throw_path),
                    &mut diagnostics,
                ),
            }
        }

        if let Some(returns) = operation.returns.as_deref() {
            if operation.return_shape != Some(Shape::Mime) {
                check_reference(
                    document,
                    returns,
                    &format!("{}/return", path),
                    &mut diagnostics,
                );
            }
        }
    }

    for (i, ty) in document.types.iter().enumerate() {
        lint_type(document, ty, &format!("/types/{}", i), &mut diagnostics);
    }

    diagnostics
}

fn lint_type(document: &Document, ty: &Type, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    match &ty.kind {
        DefinitionKind::Unknown(value) => diagnostics.push(Diagnostic::error(
            "E007",
            format!("{}/type", path),
            format!(
                "unknown definition type \"{}\": expected {}",
                value,
                DEFINITION_TYPES.join(", ")
            ),
        )),
        DefinitionKind::Map | DefinitionKind::Array => {
            if let Some(reference) = &ty.reference {
                check_reference(
                    document,
                    reference,
                    &format!("{}/reference", path),
                    diagnostics,
                );
            }
        }
        DefinitionKind::Struct => {
            if let Some(parent) = ty.parent.as_deref().filter(|p| !p.is_empty()) {
                check_reference(document, parent, &format!("{}/parent", path), diagnostics);
            }
        }
    }

    for (j, property) in ty.properties.iter().enumerate() {
        let prop_path = format!("{}/properties/{}", path, j);
        match &property.kind {
            PropertyKind::Unknown(value) => diagnostics.push(Diagnostic::error(
                "E006",
                format!("{}/type", prop_path),
                format!(
                    "unknown property type \"{}\": expected {}",
                    value,
                    PROPERTY_TYPES.join(", ")
                ),
            )),
            kind if kind.is_legacy() => diagnostics.push(Diagnostic::warning(
                "W002",
                format!("{}/type", prop_path),
                format!("legacy {} property is generated as any", kind),
            )),
            PropertyKind::Object | PropertyKind::Map | PropertyKind::Array => {
                if let Some(reference) = &property.reference {
                    check_reference(
                        document,
                        reference,
                        &format!("{}/reference", prop_path),
                        diagnostics,
                    );
                }
            }
            _ => {}
        }
    }
}

/// Warn if `reference` names neither a primitive, a generic, a local type,
/// nor a type behind a known import alias.
fn check_reference(
    document: &Document,
    reference: &str,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if reference.is_empty() || is_known_reference(document, reference) {
        return;
    }
    diagnostics.push(Diagnostic::warning(
        "W001",
        path,
        format!("unresolved reference \"{}\"", reference),
    ));
}

fn is_known_reference(document: &Document, reference: &str) -> bool {
    let mut name = reference;
    while let Some(rest) = NESTED_PREFIXES.iter().find_map(|p| name.strip_prefix(*p)) {
        name = rest;
    }

    if is_primitive(name) || name == GENERIC_REFERENCE || document.type_by_name(name).is_some() {
        return true;
    }

    match name.split_once(':') {
        Some((alias, type_name)) => document.import(alias).is_some_and(|import| {
            import.types.is_empty() || import.type_by_name(type_name).is_some()
        }),
        None => false,
    }
}

fn status_of(diagnostics: &[Diagnostic]) -> FileStatus {
    if diagnostics.iter().any(|d| d.severity == Severity::Error) {
        FileStatus::Error
    } else if diagnostics.iter().any(|d| d.severity == Severity::Warning) {
        FileStatus::Warning
    } else {
        FileStatus::Ok
    }
}

fn is_document_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

/// Collect all document files in a path (file or directory).
fn collect_document_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if is_document_file(path) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if is_document_file(&path) {
            files.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn codes(document: serde_json::Value) -> Vec<String> {
        let document = Document::from_value(document).unwrap();
        lint_document(&document)
            .into_iter()
            .map(|d| d.code)
            .collect()
    }

    #[test]
    fn lint_clean_document() {
        let document = json!({
            "operations": [{
                "name": "pet.get",
                "httpMethod": "GET",
                "arguments": [{"name": "id", "in": "path", "type": "integer"}],
                "return": "Pet",
                "throws": [{"code": 404, "type": "Error"}]
            }],
            "types": [
                {"name": "Pet", "type": "struct", "properties": [
                    {"name": "tags", "type": "array", "reference": "string"}
                ]},
                {"name": "Error", "type": "struct"}
            ],
            "root": "Pet"
        });
        assert!(codes(document).is_empty());
    }

    #[test]
    fn lint_duplicates_and_root() {
        let document = json!({
            "operations": [{"name": "pet.get"}, {"name": "pet.get"}],
            "types": [{"name": "Pet", "type": "struct"}, {"name": "Pet", "type": "struct"}]
        });
        let found = codes(document);
        assert!(found.contains(&"E002".to_string()));
        assert!(found.contains(&"E003".to_string()));

        let mut document = Document::from_value(json!({"types": []})).unwrap();
        document.root = Some("Pet".into());
        let diagnostics = lint_document(&document);
        assert_eq!(diagnostics[0].code, "E004");
        assert_eq!(diagnostics[0].path, "/root");
    }

    #[test]
    fn lint_throw_without_type() {
        let found = codes(json!({"operations": [{"name": "pet.get", "throws": [{"code": 404}]}]}));
        assert_eq!(found, vec!["E005"]);
    }

    #[test]
    fn lint_unknown_kinds() {
        let found = codes(json!({
            "types": [
                {"name": "Pet", "type": "struct", "properties": [{"name": "id", "type": "uuid"}]},
                {"name": "Ref", "type": "reference"}
            ]
        }));
        assert!(found.contains(&"E006".to_string()));
        assert!(found.contains(&"E007".to_string()));
    }

    #[test]
    fn lint_unresolved_references() {
        let document = Document::from_value(json!({
            "imports": [{"alias": "common", "url": "common.json"}],
            "types": [{"name": "Pet", "type": "struct", "properties": [
                {"name": "owner", "type": "object", "reference": "Person"},
                {"name": "price", "type": "object", "reference": "common:Money"},
                {"name": "matrix", "type": "array", "reference": "array:integer"},
                {"name": "other", "type": "object", "reference": "billing:Invoice"}
            ]}]
        }))
        .unwrap();
        let diagnostics = lint_document(&document);
        let paths: Vec<&str> = diagnostics
            .iter()
            .filter(|d| d.code == "W001")
            .map(|d| d.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "/types/0/properties/0/reference",
                "/types/0/properties/3/reference"
            ]
        );
    }

    #[test]
    fn lint_legacy_union_and_ignored_payload() {
        let found = codes(json!({
            "operations": [{"name": "pet.get", "httpMethod": "GET", "payload": "Pet"}],
            "types": [{"name": "Pet", "type": "struct", "properties": [
                {"name": "either", "type": "union"}
            ]}]
        }));
        assert!(found.contains(&"W002".to_string()));
        assert!(found.contains(&"W003".to_string()));
    }

    #[test]
    fn lint_invalid_syntax() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{ not valid json }}").unwrap();

        let result = lint_file(file.path(), file.path().parent().unwrap());
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn lint_malformed_document() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"types": [], "root": 3}}"#).unwrap();

        let result = lint_file(file.path(), file.path().parent().unwrap());
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("valid.json"),
            r#"{"types": [{"name": "Pet", "type": "struct"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("invalid.json"), "{ not json }").unwrap();
        std::fs::write(
            dir.path().join("nested.yaml"),
            "types:\n  - name: Pet\n    type: struct\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 3);
        assert_eq!(result.passed, 2);
        assert_eq!(result.failed, 1);
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_strict_mode() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("document.json");
        std::fs::write(
            &file_path,
            r#"{"types": [{"name": "Pet", "type": "struct", "parent": "Missing"}]}"#,
        )
        .unwrap();

        let result = lint(&file_path, false);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.passed, 1);
        assert_eq!(result.warnings, 1);

        let result = lint(&file_path, true);
        assert_eq!(result.passed, 0);
        assert_eq!(result.failed, 1);
    }
}
