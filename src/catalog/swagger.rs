//! Discovery and preparation of API model documents.

use super::resolver::{resolve_refs, type_description};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const HTTP_METHODS: &[&str] = &["get", "post", "put", "delete", "options", "head", "patch"];

/// A parsed, validated model document and the file it came from.
#[derive(Debug, Clone)]
pub struct SwaggerDocument {
    pub source: PathBuf,
    pub document: Value,
}

/// Recursively collect candidate model files (`.json`, `.yaml`, `.yml`), sorted.
///
/// Unreadable subdirectories are logged and skipped.
pub fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    collect(dir, &mut found);
    found.sort();
    found
}

fn collect(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read catalog directory");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, found);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json" | "yaml" | "yml")
        ) {
            found.push(path);
        }
    }
}

/// True when `doc` has `info.title`, `info.version`, a `paths` object and a
/// `swagger` or `openapi` version field.
pub fn is_valid_document(doc: &Value) -> bool {
    let non_empty = |v: Option<&Value>| match v {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    };

    non_empty(doc.pointer("/info/title"))
        && non_empty(doc.pointer("/info/version"))
        && doc.get("paths").map(Value::is_object).unwrap_or(false)
        && (non_empty(doc.get("swagger")) || non_empty(doc.get("openapi")))
}

/// Load every valid document under `dir`.
///
/// Only JSON content is parsed; YAML files are discovered but skipped with a
/// warning. A missing directory is an error, a bad individual file is not.
pub fn load_documents(dir: &Path) -> Result<Vec<SwaggerDocument>> {
    if !dir.is_dir() {
        return Err(anyhow!(
            "Failed to load API models: {} is not a directory",
            dir.display()
        ));
    }

    info!(dir = %dir.display(), "Loading API model documents");
    let candidates = find_documents(dir);
    info!(count = candidates.len(), "Found candidate model files");

    let mut documents = Vec::new();
    for path in candidates {
        match load_document(&path) {
            Ok(Some(document)) => {
                debug!(file = %path.display(), "Loaded model document");
                documents.push(SwaggerDocument {
                    source: path,
                    document,
                });
            }
            Ok(None) => {
                warn!(file = %path.display(), "Not a valid Swagger/OpenAPI document");
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Failed to load model document");
            }
        }
    }

    info!(count = documents.len(), "Loaded model documents");
    Ok(documents)
}

fn load_document(path: &Path) -> Result<Option<Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: Value = serde_json::from_str(&contents).context("Failed to parse JSON")?;
    Ok(is_valid_document(&document).then_some(document))
}

/// Resolve references and annotate operations for mapping.
///
/// Each operation gains `_path` and `_method`; each parameter with a type
/// gains `_typeDescription`.
pub fn process_document(document: &Value) -> Value {
    let mut processed = resolve_refs(document);
    enrich_operations(&mut processed);
    processed
}

fn enrich_operations(document: &mut Value) {
    let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };

    for (path, item) in paths.iter_mut() {
        for method in HTTP_METHODS {
            let Some(operation) = item.get_mut(*method).and_then(Value::as_object_mut) else {
                continue;
            };
            operation.insert("_path".to_string(), Value::String(path.clone()));
            operation.insert("_method".to_string(), Value::String(method.to_uppercase()));

            let Some(parameters) = operation.get_mut("parameters").and_then(Value::as_array_mut)
            else {
                continue;
            };
            for parameter in parameters.iter_mut() {
                let description = if parameter.get("type").is_some() {
                    Some(type_description(parameter))
                } else {
                    parameter
                        .get("schema")
                        .filter(|s| s.get("type").is_some())
                        .map(type_description)
                };
                if let (Some(description), Some(map)) = (description, parameter.as_object_mut()) {
                    map.insert("_typeDescription".to_string(), Value::String(description));
                }
            }
        }
    }
}
