use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::target::{normalize, relative_link};

/// Prefix of local references to schema components.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Extracts the component name of a local schema reference.
///
/// ```rust
/// use specloom_core::split::schema_name;
///
/// assert_eq!(schema_name("#/components/schemas/Menu"), Some("Menu"));
/// assert_eq!(schema_name("./Menu.yaml"), None);
/// ```
#[must_use]
pub fn schema_name(reference: &str) -> Option<&str> {
    reference
        .strip_prefix(SCHEMA_REF_PREFIX)
        .filter(|name| !name.is_empty())
}

/// Rewrites local schema references into links relative to `from_file`.
///
/// Only references to a component listed in `targets` are rewritten, any other
/// `$ref` is kept as is. The other keys of a reference object are copied
/// without being walked.
#[must_use]
pub fn rewrite_refs(value: &Value, from_file: &Path, targets: &IndexMap<String, PathBuf>) -> Value {
    walk(value, &|reference| {
        let target = schema_name(reference).and_then(|name| targets.get(name))?;
        Some(relative_link(from_file, target))
    })
}

/// Turns links relative to `from_file` back into local schema references.
///
/// `names` maps each normalized schema file to its component name. Links to
/// an unknown file, and local references, are kept as is.
#[must_use]
pub fn restore_refs(value: &Value, from_file: &Path, names: &HashMap<PathBuf, String>) -> Value {
    let from_dir = from_file.parent().unwrap_or(from_file);
    walk(value, &|reference| {
        if reference.starts_with('#') {
            return None;
        }
        let name = names.get(&normalize(&from_dir.join(reference)))?;
        Some(format!("{SCHEMA_REF_PREFIX}{name}"))
    })
}

fn walk(value: &Value, replace: &dyn Fn(&str) -> Option<String>) -> Value {
    match value {
        Value::Object(object) => {
            let replaced = object
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(replace);
            if let Some(reference) = replaced {
                let mut copy = object.clone();
                copy.insert("$ref".to_string(), Value::String(reference));
                return Value::Object(copy);
            }
            Value::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), walk(value, replace)))
                    .collect::<Map<_, _>>(),
            )
        }
        Value::Array(values) => Value::Array(values.iter().map(|value| walk(value, replace)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn targets() -> IndexMap<String, PathBuf> {
        IndexMap::from([
            (
                "Menu".to_string(),
                PathBuf::from("/out/schemas/resturant/Menu.yaml"),
            ),
            (
                "MenuItem".to_string(),
                PathBuf::from("/out/schemas/resturant/MenuItem.yaml"),
            ),
        ])
    }

    #[test]
    fn should_rewrite_nested_references() {
        let schema = json!({
            "type": "object",
            "properties": {
                "items": {
                    "type": "array",
                    "items": {"$ref": "#/components/schemas/MenuItem"}
                },
                "main": {"$ref": "#/components/schemas/Menu"}
            },
            "required": ["items"]
        });

        let rewritten = rewrite_refs(&schema, Path::new("/out/schemas/resturant/Menu.yaml"), &targets());

        assert_eq!(
            rewritten["properties"]["items"]["items"],
            json!({"$ref": "./MenuItem.yaml"})
        );
        assert_eq!(rewritten["properties"]["main"], json!({"$ref": "./Menu.yaml"}));
        assert_eq!(rewritten["required"], json!(["items"]));
    }

    #[test]
    fn should_keep_unknown_references() {
        let value = json!([
            {"$ref": "#/components/schemas/Unknown"},
            {"$ref": "#/components/responses/NotFound"},
            {"$ref": "https://example.com/schema.json"}
        ]);

        let rewritten = rewrite_refs(&value, Path::new("/out/openapi.yaml"), &targets());

        assert_eq!(rewritten, value);
    }

    #[test]
    fn should_copy_siblings_of_rewritten_references() {
        let value = json!({
            "$ref": "#/components/schemas/Menu",
            "description": "the menu"
        });

        let rewritten = rewrite_refs(&value, Path::new("/out/openapi.yaml"), &targets());

        assert_eq!(
            rewritten,
            json!({"$ref": "./schemas/resturant/Menu.yaml", "description": "the menu"})
        );
    }

    #[test]
    fn should_restore_rewritten_references() {
        let from_file = Path::new("/out/paths/resturant/restaurant_menu.yaml");
        let value = json!({
            "get": {
                "responses": {
                    "200": {
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/Menu"}
                            }
                        }
                    }
                }
            }
        });
        let names = targets()
            .into_iter()
            .map(|(name, path)| (path, name))
            .collect::<HashMap<_, _>>();

        let rewritten = rewrite_refs(&value, from_file, &targets());
        assert_ne!(rewritten, value);

        assert_eq!(restore_refs(&rewritten, from_file, &names), value);
    }
}
