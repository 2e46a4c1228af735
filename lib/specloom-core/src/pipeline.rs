//! End-to-end compilation of declarations.
//!
//! A compilation unit is an ordered list of [`Declaration`]s. Each entry point
//! registers the unit into fresh registries, so compiling twice in the same
//! process never mixes the two units.

use std::path::PathBuf;

use tracing::{debug, info};
use utoipa::openapi::Info;

use crate::assemble::DocumentAssembler;
use crate::document::{Document, SchemasDocument};
use crate::error::{DeclarationError, SplitError};
use crate::path::PathDecl;
use crate::registry::{ComponentRegistry, PathRegistry, ScopedRegistry};
use crate::schema::SchemaDecl;
use crate::split::{OpenApiSplitExt, RelativeRefSplitter, SourceHints, SplitLayout};

/// One entry of a compilation unit.
#[derive(Debug, Clone, derive_more::From)]
pub enum Declaration {
    /// A schema component.
    Schema(SchemaDecl),
    /// Operations under a URL template.
    Path(PathDecl),
}

/// Registers a compilation unit into fresh registries.
///
/// Component names are reserved for every schema declaration first, so a
/// reference to a type declared later in the unit resolves to its final name.
///
/// # Errors
///
/// Fails on the first invalid declaration.
pub fn compile(
    declarations: impl IntoIterator<Item = Declaration>,
) -> Result<DocumentAssembler, DeclarationError> {
    let declarations = declarations.into_iter().collect::<Vec<_>>();
    let components = ComponentRegistry::new();
    let paths = PathRegistry::new();

    for declaration in &declarations {
        if let Declaration::Schema(schema) = declaration {
            components.register_type(schema.declared_type(), schema.name());
        }
    }

    let _components_scope = components.enter();
    let _paths_scope = paths.enter();
    for declaration in declarations {
        match declaration {
            Declaration::Schema(schema) => {
                schema.register()?;
            }
            Declaration::Path(path) => {
                path.register()?;
            }
        }
    }
    debug!(schemas = components.schemas().len(), paths = paths.urls().len(), "declarations compiled");

    Ok(DocumentAssembler::new(components, paths))
}

/// Compiles declarations into a single document.
///
/// ```rust
/// use specloom_core::{Declaration, DeclaredType, FieldSpec, SchemaDecl, build_document};
/// use utoipa::openapi::InfoBuilder;
///
/// let info = InfoBuilder::new().title("Menu API").version("1.0.0").build();
/// let menu_item = DeclaredType::new("MenuItem");
///
/// let document = build_document(
///     info,
///     [Declaration::from(
///         SchemaDecl::new(&menu_item).field("name", FieldSpec::of_type("string").required()),
///     )],
/// )?;
///
/// let components = document.components.as_ref().expect("components");
/// assert!(components.schemas.contains_key("MenuItem"));
/// # Ok::<(), specloom_core::DeclarationError>(())
/// ```
///
/// # Errors
///
/// Fails on the first invalid declaration, or when a media schema cannot be
/// resolved.
pub fn build_document(
    info: Info,
    declarations: impl IntoIterator<Item = Declaration>,
) -> Result<Document, DeclarationError> {
    compile(declarations)?.assemble(info)
}

/// Compiles only the schema declarations; path declarations are ignored.
///
/// # Errors
///
/// Fails on the first invalid schema declaration.
pub fn build_schemas_only(
    declarations: impl IntoIterator<Item = Declaration>,
) -> Result<SchemasDocument, DeclarationError> {
    let schemas = declarations
        .into_iter()
        .filter(|declaration| matches!(declaration, Declaration::Schema(_)));
    let assembler = compile(schemas)?;
    let registry = assembler.components();
    Ok(SchemasDocument::new(
        registry.to_components(),
        registry.schemas().keys().cloned().collect(),
    ))
}

/// Compiles declarations and writes them as a split tree.
///
/// Returns the path of the index file.
///
/// # Errors
///
/// Fails on an invalid declaration, on colliding output files, or on the
/// first failing write.
pub fn split_and_write(
    layout: &SplitLayout,
    info: Info,
    declarations: impl IntoIterator<Item = Declaration>,
) -> Result<PathBuf, SplitError> {
    let assembler = compile(declarations)?;
    let document = assembler.assemble(info)?;
    let hints = SourceHints::from_registries(assembler.components(), assembler.paths());

    let splitter = RelativeRefSplitter::new(layout.clone(), hints);
    let result = document.split_with(&splitter)?;
    let index = result.write(layout.format())?;

    info!(
        index = %index.display(),
        files = result.fragment_count() + 1,
        "split document written"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{MediaSpec, OperationSpec, ResponseSpec};
    use crate::schema::{DeclaredType, FieldSpec, ItemsSpec};
    use serde_json::json;
    use utoipa::openapi::InfoBuilder;

    fn info() -> Info {
        InfoBuilder::new().title("Test API").version("1.0.0").build()
    }

    #[test]
    fn should_resolve_forward_references_to_renamed_types() -> anyhow::Result<()> {
        let category = DeclaredType::new("Category");
        let product = DeclaredType::new("Product");
        let declarations: Vec<Declaration> = vec![
            SchemaDecl::new(&category)
                .field("items", FieldSpec::array(ItemsSpec::from(&product)))
                .into(),
            SchemaDecl::new(&product)
                .with_name("CatalogProduct")
                .field("name", FieldSpec::of_type("string"))
                .into(),
        ];

        let document = build_schemas_only(declarations)?;
        let value = serde_json::to_value(&document)?;

        assert_eq!(
            value["components"]["schemas"]["Category"]["properties"]["items"]["items"],
            json!({"$ref": "#/components/schemas/CatalogProduct"})
        );
        assert!(value["components"]["schemas"].get("CatalogProduct").is_some());
        Ok(())
    }

    #[test]
    fn should_write_schemas_only_in_registration_order() -> anyhow::Result<()> {
        let declarations = ["Zebra", "Apple", "Mango"]
            .map(|ident| Declaration::from(SchemaDecl::new(&DeclaredType::new(ident))));

        let document = build_schemas_only(declarations)?;
        let value = serde_json::to_value(&document)?;

        let names = value["components"]["schemas"]
            .as_object()
            .map(|schemas| schemas.keys().cloned().collect::<Vec<_>>());
        assert_eq!(names, Some(vec!["Zebra".to_string(), "Apple".to_string(), "Mango".to_string()]));
        Ok(())
    }

    #[test]
    fn should_ignore_paths_when_building_schemas_only() -> anyhow::Result<()> {
        let declarations: Vec<Declaration> = vec![
            PathDecl::new("/menu")
                .operation(OperationSpec::get().with_response(
                    ResponseSpec::new(200).with_content(MediaSpec::json(json!({"type": "object"}))),
                ))
                .into(),
        ];

        let document = build_schemas_only(declarations)?;

        assert!(document.components().schemas.is_empty());
        assert_eq!(serde_json::to_value(&document)?, json!({"components": {}}));
        Ok(())
    }

    #[test]
    fn should_isolate_compilations() -> anyhow::Result<()> {
        let menu = DeclaredType::new("Menu");
        let first = build_document(info(), [Declaration::from(SchemaDecl::new(&menu))])?;
        let second = build_document(info(), Vec::<Declaration>::new())?;

        assert!(first.components.is_some());
        assert!(second.components.is_none());
        assert!(ComponentRegistry::current().schemas().is_empty());
        Ok(())
    }

    #[test]
    fn should_stop_at_first_invalid_declaration() {
        let broken = DeclaredType::new("Broken");
        let declarations: Vec<Declaration> = vec![
            SchemaDecl::new(&broken)
                .field("tags", FieldSpec::of_type("array"))
                .into(),
        ];

        let error = build_document(info(), declarations).expect_err("should fail");

        assert_eq!(
            error,
            DeclarationError::MissingArrayItems {
                field: "tags".to_string()
            }
        );
    }
}
