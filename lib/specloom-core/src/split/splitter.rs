//! Splitting strategies.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::rewrite::rewrite_refs;
use super::target::{relative_link, target_path};
use super::{Fragment, SplitLayout, SplitResult};
use crate::document::Document;
use crate::error::SplitError;
use crate::path::file_id_from_url;
use crate::registry::{ComponentRegistry, PathRegistry};

/// Trait for splitting a document into multiple files.
///
/// ```rust
/// use serde_json::json;
/// use specloom_core::split::{Fragment, OpenApiSplitExt, OpenApiSplitter, SplitResult};
/// use specloom_core::{Document, SplitError};
/// use utoipa::openapi::OpenApiBuilder;
///
/// struct Unsplit;
///
/// impl OpenApiSplitter for Unsplit {
///     type Fragment = serde_json::Value;
///
///     fn split(&self, document: &Document) -> Result<SplitResult, SplitError> {
///         Ok(SplitResult::new(Fragment::new("openapi.json", document.to_value()?)))
///     }
/// }
///
/// let result = Document::from(OpenApiBuilder::new().build()).split_with(&Unsplit)?;
/// assert_eq!(result.fragment_count(), 0);
/// assert_eq!(result.index.content["openapi"], json!("3.1.0"));
/// # Ok::<(), SplitError>(())
/// ```
pub trait OpenApiSplitter {
    /// The type of content extracted into fragments.
    type Fragment: Serialize;

    /// Splits the document into an index and fragments.
    ///
    /// # Errors
    ///
    /// Fails when the document cannot be split consistently.
    fn split(&self, document: &Document) -> Result<SplitResult<Self::Fragment>, SplitError>;
}

/// Extension trait for convenient splitting of documents.
pub trait OpenApiSplitExt {
    /// Splits this document using the provided splitter.
    ///
    /// # Errors
    ///
    /// See [`OpenApiSplitter::split`].
    fn split_with<S: OpenApiSplitter>(
        &self,
        splitter: &S,
    ) -> Result<SplitResult<S::Fragment>, SplitError>;
}

impl OpenApiSplitExt for Document {
    fn split_with<S: OpenApiSplitter>(
        &self,
        splitter: &S,
    ) -> Result<SplitResult<S::Fragment>, SplitError> {
        splitter.split(self)
    }
}

/// File identifier and source location of a path item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathHint {
    /// Name of the path file, without extension.
    pub file_id: String,
    /// Where the path was declared.
    pub source: Option<PathBuf>,
}

/// Source locations of the declared entities, used to mirror the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHints {
    schemas: HashMap<String, PathBuf>,
    paths: HashMap<String, PathHint>,
}

impl SourceHints {
    /// Creates empty hints: every file falls back to its root directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the hints recorded in the registries.
    ///
    /// A URL bound several times takes the hint of its first binding.
    #[must_use]
    pub fn from_registries(components: &ComponentRegistry, paths: &PathRegistry) -> Self {
        let path_hints = paths
            .records()
            .iter()
            .filter_map(|(url, record)| {
                let primary = record.primary()?;
                let hint = PathHint {
                    file_id: primary.file_id().to_string(),
                    source: primary.source().map(Path::to_path_buf),
                };
                Some((url.clone(), hint))
            })
            .collect();

        Self {
            schemas: components.sources(),
            paths: path_hints,
        }
    }

    /// Sets the source location of a schema component.
    #[must_use]
    pub fn with_schema(mut self, name: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        self.schemas.insert(name.into(), source.into());
        self
    }

    /// Sets the file identifier and source location of a path item.
    #[must_use]
    pub fn with_path(
        mut self,
        url: impl Into<String>,
        file_id: impl Into<String>,
        source: Option<PathBuf>,
    ) -> Self {
        let hint = PathHint {
            file_id: file_id.into(),
            source,
        };
        self.paths.insert(url.into(), hint);
        self
    }

    /// Returns the source location of a schema component.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&Path> {
        self.schemas.get(name).map(PathBuf::as_path)
    }

    /// Returns the hint of a path item.
    #[must_use]
    pub fn path(&self, url: &str) -> Option<&PathHint> {
        self.paths.get(url)
    }
}

/// Splits a document into one file per schema component and per path item,
/// linked together with relative `$ref`s.
#[derive(Debug, Clone)]
pub struct RelativeRefSplitter {
    layout: SplitLayout,
    hints: SourceHints,
}

impl RelativeRefSplitter {
    /// Creates a splitter writing into `layout`.
    #[must_use]
    pub fn new(layout: SplitLayout, hints: SourceHints) -> Self {
        Self { layout, hints }
    }

    /// Returns the layout.
    #[must_use]
    pub fn layout(&self) -> &SplitLayout {
        &self.layout
    }

    fn schema_targets(&self, schemas: Option<&Map<String, Value>>) -> IndexMap<String, PathBuf> {
        let base = self.layout.schemas_root();
        let extension = self.layout.format().extension();
        schemas
            .into_iter()
            .flat_map(Map::keys)
            .map(|name| {
                let target = target_path(&base, self.hints.schema(name), name, extension);
                (name.clone(), target)
            })
            .collect()
    }

    fn path_targets(&self, paths: Option<&Map<String, Value>>) -> IndexMap<String, PathBuf> {
        let base = self.layout.paths_root();
        let extension = self.layout.format().extension();
        paths
            .into_iter()
            .flat_map(Map::keys)
            .map(|url| {
                let target = match self.hints.path(url) {
                    Some(hint) => target_path(&base, hint.source.as_deref(), &hint.file_id, extension),
                    None => target_path(&base, None, &file_id_from_url(url), extension),
                };
                (url.clone(), target)
            })
            .collect()
    }
}

impl OpenApiSplitter for RelativeRefSplitter {
    type Fragment = Value;

    fn split(&self, document: &Document) -> Result<SplitResult, SplitError> {
        let Value::Object(document) = document.to_value()? else {
            return Err(SplitError::InvalidDocument {
                message: "a document must serialize to a mapping".to_string(),
            });
        };
        let schemas = document
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object);
        let paths = document.get("paths").and_then(Value::as_object);

        let schema_targets = self.schema_targets(schemas);
        let path_targets = self.path_targets(paths);

        let mut claimed = HashMap::new();
        for (owner, target) in schema_targets.iter().chain(&path_targets) {
            if claimed.insert(target, owner).is_some() {
                return Err(SplitError::TargetCollision {
                    path: target.clone(),
                });
            }
        }

        let index_path = self.layout.index_path();
        if claimed.contains_key(&index_path) {
            return Err(SplitError::TargetCollision { path: index_path });
        }

        let mut fragments = Vec::with_capacity(schema_targets.len() + path_targets.len());
        let sections = [(schemas, &schema_targets), (paths, &path_targets)];
        for (section, targets) in sections {
            for (key, content) in section.into_iter().flatten() {
                if let Some(target) = targets.get(key) {
                    let content = rewrite_refs(content, target, &schema_targets);
                    fragments.push(Fragment::new(target.clone(), content));
                }
            }
        }

        let links = |targets: &IndexMap<String, PathBuf>| {
            targets
                .iter()
                .map(|(key, target)| (key.clone(), json!({"$ref": relative_link(&index_path, target)})))
                .collect::<Map<_, _>>()
        };

        let mut index = Map::new();
        for (key, value) in &document {
            let value = match (key.as_str(), value) {
                ("paths", _) => Value::Object(links(&path_targets)),
                ("components", Value::Object(components)) => {
                    let mut components = components
                        .iter()
                        .map(|(section, value)| {
                            (section.clone(), rewrite_refs(value, &index_path, &schema_targets))
                        })
                        .collect::<Map<_, _>>();
                    if components.contains_key("schemas") {
                        components.insert("schemas".to_string(), Value::Object(links(&schema_targets)));
                    }
                    Value::Object(components)
                }
                _ => rewrite_refs(value, &index_path, &schema_targets),
            };
            index.insert(key.clone(), value);
        }

        debug!(
            schemas = schema_targets.len(),
            paths = path_targets.len(),
            index = %index_path.display(),
            "document split"
        );
        let mut result = SplitResult::new(Fragment::new(index_path, Value::Object(index)));
        for fragment in fragments {
            result.add_fragment(fragment);
        }
        Ok(result)
    }
}
