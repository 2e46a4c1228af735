use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::rewrite::restore_refs;
use super::target::normalize;
use crate::error::SplitError;
use crate::yaml::OutputFormat;

/// Reads a split tree back into a single document.
///
/// Every `paths` and `components.schemas` entry of the index is replaced by the
/// content of the file it links to, and links to schema files become local
/// `#/components/schemas/<Name>` references again.
///
/// # Errors
///
/// Fails when a file cannot be read or parsed, or when an index entry is not a
/// `$ref` link.
pub fn join_split(index_path: &Path, format: OutputFormat) -> Result<Value, SplitError> {
    let index_path = normalize(index_path);
    let index_dir = index_path.parent().unwrap_or(&index_path).to_path_buf();
    let Value::Object(index) = read_document(&index_path, format)? else {
        return Err(invalid(&index_path, "the index must be a mapping"));
    };

    let schemas = index
        .get("components")
        .and_then(|components| components.get("schemas"));
    let schema_files = linked_files(&index_dir, schemas)?;
    let path_files = linked_files(&index_dir, index.get("paths"))?;
    let names = schema_files
        .iter()
        .map(|(name, file)| (file.clone(), name.clone()))
        .collect::<HashMap<_, _>>();

    let inline = |files: &[(String, PathBuf)]| -> Result<Map<String, Value>, SplitError> {
        files
            .iter()
            .map(|(key, file)| {
                let content = read_document(file, format)?;
                Ok((key.clone(), restore_refs(&content, file, &names)))
            })
            .collect()
    };

    let mut document = Map::new();
    for (key, value) in &index {
        let value = match (key.as_str(), value) {
            ("paths", _) => Value::Object(inline(path_files.as_slice())?),
            ("components", Value::Object(components)) => {
                let mut components = components
                    .iter()
                    .map(|(section, value)| {
                        (section.clone(), restore_refs(value, &index_path, &names))
                    })
                    .collect::<Map<_, _>>();
                if components.contains_key("schemas") {
                    components.insert("schemas".to_string(), Value::Object(inline(schema_files.as_slice())?));
                }
                Value::Object(components)
            }
            _ => restore_refs(value, &index_path, &names),
        };
        document.insert(key.clone(), value);
    }

    debug!(
        index = %index_path.display(),
        schemas = schema_files.len(),
        paths = path_files.len(),
        "split tree joined"
    );
    Ok(Value::Object(document))
}

fn read_document(path: &Path, format: OutputFormat) -> Result<Value, SplitError> {
    let text = fs::read_to_string(path)?;
    format.parse(&text)
}

fn linked_files(base: &Path, section: Option<&Value>) -> Result<Vec<(String, PathBuf)>, SplitError> {
    let Some(section) = section else {
        return Ok(Vec::new());
    };
    let Value::Object(entries) = section else {
        return Err(invalid(base, "an index section must be a mapping"));
    };

    entries
        .iter()
        .map(|(key, entry)| {
            let link = entry
                .get("$ref")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(base, &format!("entry '{key}' is not a $ref link")))?;
            Ok((key.clone(), normalize(&base.join(link))))
        })
        .collect()
}

fn invalid(path: &Path, message: &str) -> SplitError {
    SplitError::InvalidDocument {
        message: format!("{}: {message}", path.display()),
    }
}
