//! Loading declarations from a tree of files.
//!
//! A declaration tree holds a `schemas/` and a `paths/` directory. Every
//! `.yaml`, `.yml` or `.json` file below them is read in file name order.
//!
//! A schema file maps type identifiers to their fields:
//!
//! ```yaml
//! MenuItem:
//!   fields:
//!     name: { type: string, required: true }
//!     price: { type: number, required: true }
//! Menu:
//!   fields:
//!     items: { type: array, items: MenuItem, required: true }
//! ```
//!
//! A path file maps file identifiers to a URL and its operations:
//!
//! ```yaml
//! restaurant_menu:
//!   url: /restaurants/{id}/menu
//!   tags: [Restaurant]
//!   operations:
//!     get:
//!       params:
//!         - { name: id, in: path, type: integer, format: int64 }
//!       responses:
//!         - { status: 200, description: OK, content: { application/json: Menu } }
//!         - { status: 404, description: Not found }
//!       examples:
//!         - { items: [{ name: Fried Rice, price: 12.5 }] }
//!         - null
//! ```
//!
//! A string used as a reference names a type identifier of the tree, a
//! component name, or a `#/components/schemas/<Name>` reference.

mod files;

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use self::files::{FieldEntry, OperationEntry, ParamEntry, PathEntry, PathFile, SchemaFile};
use crate::error::LoadError;
use crate::path::{
    MediaSpec, OperationSpec, ParamSpec, PathDecl, RequestBodySpec, ResponseSpec, StaticExamples,
};
use crate::pipeline::Declaration;
use crate::schema::{DeclaredType, FieldSpec, ItemsSpec, RefTarget, SchemaDecl};
use crate::security::SecurityRequirement;
use crate::split::{SCHEMA_REF_PREFIX, SplitLayout};
use crate::yaml::OutputFormat;

const SCHEMAS_DIR: &str = "schemas";
const PATHS_DIR: &str = "paths";

/// Reads the declarations of a tree of files.
///
/// By default the source of each declaration is the file it was read from.
/// With [`Self::mirror_into`], sources are rebased onto the output layout so
/// the split tree mirrors the declaration tree.
#[derive(Debug, Clone)]
pub struct DeclarationLoader {
    root: PathBuf,
    mirror: Option<SplitLayout>,
}

impl DeclarationLoader {
    /// Creates a loader of the tree under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mirror: None,
        }
    }

    /// Rebases sources onto the schemas and paths roots of `layout`.
    #[must_use]
    pub fn mirror_into(mut self, layout: &SplitLayout) -> Self {
        self.mirror = Some(layout.clone());
        self
    }

    /// Returns the directory of schema files.
    #[must_use]
    pub fn schemas_dir(&self) -> PathBuf {
        self.root.join(SCHEMAS_DIR)
    }

    /// Returns the directory of path files.
    #[must_use]
    pub fn paths_dir(&self) -> PathBuf {
        self.root.join(PATHS_DIR)
    }

    /// Loads every declaration, schemas first.
    ///
    /// # Errors
    ///
    /// Fails when a directory is missing, when a file cannot be read or
    /// parsed, or when a declaration breaks a strict-mode rule.
    pub fn load(&self) -> Result<Vec<Declaration>, LoadError> {
        let schemas_dir = self.schemas_dir();
        let paths_dir = self.paths_dir();
        for dir in [&schemas_dir, &paths_dir] {
            if !dir.is_dir() {
                return Err(LoadError::MissingDirectory { path: dir.clone() });
            }
        }

        let mut schema_files = Vec::new();
        for file in declaration_files(&schemas_dir)? {
            let content = read_file::<SchemaFile>(&file)?;
            schema_files.push((file, content));
        }
        let mut path_files = Vec::new();
        for file in declaration_files(&paths_dir)? {
            let content = read_file::<PathFile>(&file)?;
            path_files.push((file, content));
        }

        let types = schema_files
            .iter()
            .flat_map(|(_, content)| content.keys())
            .map(|ident| (ident.clone(), DeclaredType::new(ident.clone())))
            .collect::<IndexMap<_, _>>();
        let resolver = Resolver { types: &types };

        let mut declarations = Vec::new();
        for (file, content) in schema_files {
            let source = self.source(&file, &schemas_dir, SplitLayout::schemas_root);
            for (ident, entry) in content {
                let Some(ty) = types.get(&ident) else {
                    continue;
                };
                let mut decl = SchemaDecl::new(ty).with_source(&source);
                if let Some(name) = entry.name {
                    decl = decl.with_name(name);
                }
                for (field, spec) in entry.fields {
                    decl = decl.field(field, resolver.field(spec));
                }
                declarations.push(Declaration::Schema(decl));
            }
        }
        for (file, content) in path_files {
            let source = self.source(&file, &paths_dir, SplitLayout::paths_root);
            for (file_id, entry) in content {
                let decl = resolver.path(file_id, entry).with_source(&source);
                declarations.push(Declaration::Path(decl));
            }
        }

        debug!(
            root = %self.root.display(),
            types = types.len(),
            declarations = declarations.len(),
            "declaration tree loaded"
        );
        Ok(declarations)
    }

    fn source(&self, file: &Path, dir: &Path, mirror_root: fn(&SplitLayout) -> PathBuf) -> PathBuf {
        match (&self.mirror, file.strip_prefix(dir)) {
            (Some(layout), Ok(relative)) => mirror_root(layout).join(relative),
            _ => file.to_path_buf(),
        }
    }
}

fn declaration_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() && OutputFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn read_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let format = OutputFormat::from_path(path).unwrap_or_default();
    let text = fs::read_to_string(path)?;
    format
        .deserialize(&text)
        .map_err(|message| LoadError::ParseError {
            path: path.to_path_buf(),
            message,
        })
}

struct Resolver<'a> {
    types: &'a IndexMap<String, DeclaredType>,
}

impl Resolver<'_> {
    fn target(&self, reference: &str) -> RefTarget {
        if let Some(ty) = self.types.get(reference) {
            return RefTarget::from(ty);
        }
        let name = reference.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(reference);
        RefTarget::from(name)
    }

    fn items(&self, value: Value) -> ItemsSpec {
        match value {
            Value::String(reference) => ItemsSpec::Reference(self.target(&reference)),
            other => ItemsSpec::Schema(other),
        }
    }

    fn field(&self, entry: FieldEntry) -> FieldSpec {
        let mut spec = FieldSpec::new().with_required(entry.required);
        if let Some(field_type) = entry.field_type {
            spec = spec.with_type(field_type);
        }
        if let Some(reference) = entry.reference {
            spec = spec.with_ref(self.target(&reference));
        }
        if let Some(description) = entry.description {
            spec = spec.with_description(description);
        }
        if let Some(format) = entry.format {
            spec = spec.with_format(format);
        }
        if let Some(values) = entry.enum_values {
            spec = spec.with_enum(values);
        }
        if let Some(example) = entry.example {
            spec = spec.with_example(example);
        }
        if let Some(default) = entry.default {
            spec = spec.with_default(default);
        }
        if let Some(items) = entry.items {
            spec = spec.with_items(self.items(items));
        }
        if let Some(properties) = entry.properties {
            spec = spec.with_properties(properties);
        }
        if let Some(required_props) = entry.required_props {
            spec = spec.with_required_props(required_props);
        }
        spec
    }

    fn path(&self, file_id: String, entry: PathEntry) -> PathDecl {
        let mut decl = PathDecl::new(entry.url).with_file_id(file_id);
        for tag in entry.tags {
            decl = decl.with_tag(tag);
        }
        for param in entry.params {
            decl = decl.with_param(param_spec(param));
        }
        if let Some(summary) = entry.summary {
            decl = decl.with_summary(summary);
        }
        if let Some(description) = entry.description {
            decl = decl.with_description(description);
        }
        for (scheme, scopes) in entry.security.into_iter().flatten() {
            decl = decl.with_security(SecurityRequirement::with_scopes(scheme, scopes));
        }

        let mut examples = StaticExamples::new();
        for (method, operation) in entry.operations {
            if !operation.examples.is_empty() {
                examples = examples.with(method, operation.examples.clone());
            }
            decl = decl.operation(self.operation(OperationSpec::new(method), operation));
        }
        if !examples.is_empty() {
            decl = decl.with_examples(examples);
        }
        decl
    }

    fn operation(&self, mut spec: OperationSpec, entry: OperationEntry) -> OperationSpec {
        if let Some(summary) = entry.summary {
            spec = spec.with_summary(summary);
        }
        if let Some(operation_id) = entry.operation_id {
            spec = spec.with_operation_id(operation_id);
        }
        if let Some(description) = entry.description {
            spec = spec.with_description(description);
        }
        for param in entry.params {
            spec = spec.with_param(param_spec(param));
        }
        if let Some(request) = entry.request {
            let content_type = request
                .content_type
                .unwrap_or_else(|| crate::path::APPLICATION_JSON.to_string());
            let mut body = RequestBodySpec::new(MediaSpec::new(content_type, self.items(request.schema)))
                .with_required(request.required);
            if let Some(description) = request.description {
                body = body.with_description(description);
            }
            spec = spec.with_request(body);
        }
        for response in entry.responses {
            let mut declared = ResponseSpec::new(response.status).with_description(response.description);
            for (content_type, schema) in response.content {
                declared = declared.with_content(MediaSpec::new(content_type, self.items(schema)));
            }
            spec = spec.with_response(declared);
        }
        spec
    }
}

fn param_spec(entry: ParamEntry) -> ParamSpec {
    let mut spec = ParamSpec::new(entry.name, entry.location, entry.type_name);
    if let Some(format) = entry.format {
        spec = spec.with_format(format);
    }
    if let Some(required) = entry.required {
        spec = spec.with_required(required);
    }
    if let Some(description) = entry.description {
        spec = spec.with_description(description);
    }
    if let Some(default) = entry.default {
        spec = spec.with_default(default);
    }
    if let Some(example) = entry.example {
        spec = spec.with_example(example);
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeclarationError;
    use crate::pipeline::build_document;
    use serde_json::json;
    use utoipa::openapi::InfoBuilder;

    fn write(root: &Path, relative: &str, text: &str) -> anyhow::Result<()> {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }

    fn tree() -> anyhow::Result<tempfile::TempDir> {
        let temp = tempfile::tempdir()?;
        let root = temp.path();
        write(
            root,
            "schemas/resturant/menu.yaml",
            "MenuItem:
  fields:
    name: { type: string, required: true }
    price: { type: number, required: true }
Menu:
  name: RestaurantMenu
  fields:
    items: { type: array, items: MenuItem, required: true }
",
        )?;
        write(
            root,
            "paths/resturant/menu.json",
            r#"{
  "restaurant_menu": {
    "url": "/restaurants/{id}/menu",
    "tags": ["Restaurant"],
    "security": [{"bearerAuth": []}],
    "operations": {
      "get": {
        "params": [{"name": "id", "in": "path", "type": "integer", "format": "int64"}],
        "responses": [
          {"status": 200, "description": "OK", "content": {"application/json": "Menu"}},
          {"status": 404, "description": "Not found"}
        ],
        "examples": [{"items": []}, null]
      }
    }
  }
}"#,
        )?;
        write(root, "paths/README.md", "ignored")?;
        Ok(temp)
    }

    #[test]
    fn should_load_declarations_in_order() -> anyhow::Result<()> {
        let temp = tree()?;

        let declarations = DeclarationLoader::new(temp.path()).load()?;

        let kinds = declarations
            .iter()
            .map(|declaration| match declaration {
                Declaration::Schema(schema) => schema.declared_type().ident().to_string(),
                Declaration::Path(_) => "path".to_string(),
            })
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["MenuItem", "Menu", "path"]);
        Ok(())
    }

    #[test]
    fn should_build_document_from_tree() -> anyhow::Result<()> {
        let temp = tree()?;
        let declarations = DeclarationLoader::new(temp.path()).load()?;
        let info = InfoBuilder::new().title("Menu API").version("1.0.0").build();

        let document = build_document(info, declarations)?;
        let value = serde_json::to_value(&document)?;

        assert_eq!(
            value["components"]["schemas"]["RestaurantMenu"]["properties"]["items"],
            json!({"type": "array", "items": {"$ref": "#/components/schemas/MenuItem"}})
        );
        let get = &value["paths"]["/restaurants/{id}/menu"]["get"];
        assert_eq!(
            get["responses"]["200"]["content"]["application/json"],
            json!({
                "schema": {"$ref": "#/components/schemas/RestaurantMenu"},
                "example": {"items": []}
            })
        );
        assert_eq!(get["security"], json!([{"bearerAuth": []}]));
        assert_eq!(get["parameters"][0]["schema"], json!({"type": "integer", "format": "int64"}));
        Ok(())
    }

    #[test]
    fn should_mirror_sources_into_layout() -> anyhow::Result<()> {
        let temp = tree()?;
        let layout = SplitLayout::new("/out");

        let declarations = DeclarationLoader::new(temp.path())
            .mirror_into(&layout)
            .load()?;

        let sources = declarations
            .iter()
            .filter_map(|declaration| match declaration {
                Declaration::Schema(schema) => schema.source().map(Path::to_path_buf),
                Declaration::Path(_) => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("/out/schemas/resturant/menu.yaml"),
                PathBuf::from("/out/schemas/resturant/menu.yaml"),
            ]
        );
        Ok(())
    }

    #[test]
    fn should_require_both_directories() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::create_dir_all(temp.path().join("schemas"))?;

        let error = DeclarationLoader::new(temp.path())
            .load()
            .expect_err("should fail");

        assert!(matches!(
            error,
            LoadError::MissingDirectory { path } if path.ends_with("paths")
        ));
        Ok(())
    }

    #[test]
    fn should_report_the_file_that_fails_to_parse() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        write(temp.path(), "schemas/menu.yaml", "Menu:\n  fields: {}\n  colour: red\n")?;
        fs::create_dir_all(temp.path().join("paths"))?;

        let error = DeclarationLoader::new(temp.path())
            .load()
            .expect_err("should fail");

        assert!(matches!(
            error,
            LoadError::ParseError { path, .. } if path.ends_with("schemas/menu.yaml")
        ));
        Ok(())
    }

    #[test]
    fn should_surface_strict_mode_errors_when_compiling() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        write(
            temp.path(),
            "schemas/menu.yaml",
            "Menu:\n  fields:\n    owner: { type: object, properties: { name: { type: string } } }\n",
        )?;
        fs::create_dir_all(temp.path().join("paths"))?;
        let declarations = DeclarationLoader::new(temp.path()).load()?;
        let info = InfoBuilder::new().title("API").version("1.0.0").build();

        let error = build_document(info, declarations).expect_err("should fail");

        assert_eq!(
            error,
            DeclarationError::ObjectRequiresRef {
                field: "owner".to_string()
            }
        );
        Ok(())
    }
}
