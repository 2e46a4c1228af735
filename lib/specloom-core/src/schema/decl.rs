use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::json;
use tracing::debug;
use utoipa::openapi::extensions::Extensions;
use utoipa::openapi::schema::{ObjectBuilder, Type};
use utoipa::openapi::{RefOr, Schema};

use super::{DeclaredType, FieldSpec};
use crate::error::DeclarationError;
use crate::registry::{ComponentRegistry, ScopedRegistry};

/// Declaration of the object schema of a type.
///
/// Fields keep their declaration order. Registration validates every field
/// before touching the registry, a failing declaration leaves no entry behind.
///
/// ```rust
/// use specloom_core::{ComponentRegistry, DeclaredType, FieldSpec, SchemaDecl};
///
/// let registry = ComponentRegistry::new();
/// let menu_item = DeclaredType::new("MenuItem");
///
/// let component = SchemaDecl::new(&menu_item)
///     .field("name", FieldSpec::of_type("string").required())
///     .field("price", FieldSpec::of_type("number").required())
///     .register_in(&registry)?;
///
/// assert_eq!(component.name(), "MenuItem");
/// assert!(registry.contains("MenuItem"));
/// # Ok::<(), specloom_core::DeclarationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SchemaDecl {
    ty: DeclaredType,
    name: Option<String>,
    source: Option<PathBuf>,
    fields: IndexMap<String, FieldSpec>,
    duplicated: Option<String>,
}

impl SchemaDecl {
    /// Starts the declaration of the given type.
    pub fn new(ty: &DeclaredType) -> Self {
        Self {
            ty: ty.clone(),
            name: None,
            source: None,
            fields: IndexMap::new(),
            duplicated: None,
        }
    }

    /// Overrides the component name, the type identifier is used otherwise.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the source location, used to mirror the layout when splitting.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        if self.fields.contains_key(&name) {
            self.duplicated.get_or_insert(name);
        } else {
            self.fields.insert(name, spec);
        }
        self
    }

    /// Returns the declared type.
    #[must_use]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.ty
    }

    /// Returns the overridden component name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the source location, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Builds the object schema without registering it.
    ///
    /// # Errors
    ///
    /// Fails on the first field breaking a strict-mode rule.
    pub fn preview(&self, registry: &ComponentRegistry) -> Result<RefOr<Schema>, DeclarationError> {
        if let Some(field) = &self.duplicated {
            return Err(DeclarationError::DuplicateField {
                owner: self.ty.ident().to_string(),
                field: field.clone(),
            });
        }

        let mut builder = ObjectBuilder::new().schema_type(Type::Object);
        if self.fields.is_empty() {
            // utoipa skips an empty property map
            let empty = [("properties", json!({}))].into_iter().collect::<Extensions>();
            builder = builder.extensions(Some(empty));
        }
        for (name, spec) in &self.fields {
            builder = builder.property(name, spec.to_property(name, registry)?);
            if spec.is_required() {
                builder = builder.required(name);
            }
        }
        Ok(RefOr::T(Schema::Object(builder.build())))
    }

    /// Registers this declaration in the active component registry.
    ///
    /// # Errors
    ///
    /// See [`Self::register_in`].
    pub fn register(self) -> Result<SchemaComponent, DeclarationError> {
        self.register_in(&ComponentRegistry::current())
    }

    /// Registers this declaration in the given registry.
    ///
    /// # Errors
    ///
    /// Fails when a field breaks a strict-mode rule, or when the component name
    /// is already taken by a different schema.
    pub fn register_in(
        self,
        registry: &ComponentRegistry,
    ) -> Result<SchemaComponent, DeclarationError> {
        let schema = self.preview(registry)?;
        let name = registry.register_component(
            &self.ty,
            self.name.as_deref(),
            schema.clone(),
            self.source.clone(),
        )?;
        debug!(%name, ident = self.ty.ident(), fields = self.fields.len(), "schema registered");

        Ok(SchemaComponent {
            name,
            ty: self.ty,
            schema,
            source: self.source,
        })
    }
}

/// A registered schema component.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaComponent {
    name: String,
    ty: DeclaredType,
    schema: RefOr<Schema>,
    source: Option<PathBuf>,
}

impl SchemaComponent {
    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn declared_type(&self) -> &DeclaredType {
        &self.ty
    }

    /// Returns the object schema.
    #[must_use]
    pub fn schema(&self) -> &RefOr<Schema> {
        &self.schema
    }

    /// Returns the source location, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ItemsSpec;
    use serde_json::json;

    fn product_decl(product: &DeclaredType) -> SchemaDecl {
        SchemaDecl::new(product)
            .field("id", FieldSpec::of_type("integer").with_format("int64").required())
            .field("name", FieldSpec::of_type("string").required())
            .field("tags", FieldSpec::array(ItemsSpec::primitive("string")))
            .field("price", FieldSpec::of_type("number").required())
    }

    #[test]
    fn should_keep_required_fields_in_declaration_order() {
        let registry = ComponentRegistry::new();
        let product = DeclaredType::new("Product");

        let component = product_decl(&product)
            .register_in(&registry)
            .expect("should register");
        let value = serde_json::to_value(component.schema()).expect("should serialize");

        assert_eq!(value["required"], json!(["id", "name", "price"]));
        let keys = value["properties"]
            .as_object()
            .expect("properties")
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["id", "name", "tags", "price"]);
        assert_eq!(
            value["properties"]["tags"],
            json!({"type": "array", "items": {"type": "string"}})
        );
    }

    #[test]
    fn should_omit_required_when_nothing_is_required() {
        let registry = ComponentRegistry::new();
        let note = DeclaredType::new("Note");

        let component = SchemaDecl::new(&note)
            .field("text", FieldSpec::of_type("string"))
            .register_in(&registry)
            .expect("should register");
        let value = serde_json::to_value(component.schema()).expect("should serialize");

        assert_eq!(value["type"], json!("object"));
        assert!(value.get("required").is_none());
    }

    #[test]
    fn should_emit_empty_properties_without_fields() {
        let registry = ComponentRegistry::new();
        let marker = DeclaredType::new("Marker");

        let schema = SchemaDecl::new(&marker)
            .preview(&registry)
            .expect("should build");
        let value = serde_json::to_value(schema).expect("should serialize");

        assert_eq!(value, json!({"type": "object", "properties": {}}));
    }

    #[test]
    fn should_reference_registered_type_from_items() {
        let registry = ComponentRegistry::new();
        let product = DeclaredType::new("Product");
        let category = DeclaredType::new("Category");

        product_decl(&product)
            .register_in(&registry)
            .expect("should register product");
        let component = SchemaDecl::new(&category)
            .field("items", FieldSpec::array(&product))
            .register_in(&registry)
            .expect("should register category");
        let value = serde_json::to_value(component.schema()).expect("should serialize");

        assert_eq!(
            value["properties"]["items"]["items"],
            json!({"$ref": "#/components/schemas/Product"})
        );
    }

    #[test]
    fn should_not_register_failing_declaration() {
        let registry = ComponentRegistry::new();
        let broken = DeclaredType::new("Broken");

        let error = SchemaDecl::new(&broken)
            .field("ok", FieldSpec::of_type("string"))
            .field("bad", FieldSpec::of_type("array"))
            .register_in(&registry)
            .expect_err("should fail");

        assert!(matches!(error, DeclarationError::MissingArrayItems { .. }));
        assert!(!registry.contains("Broken"));
        assert!(registry.schemas().is_empty());
    }

    #[test]
    fn should_reject_duplicated_field() {
        let registry = ComponentRegistry::new();
        let twice = DeclaredType::new("Twice");

        let error = SchemaDecl::new(&twice)
            .field("a", FieldSpec::of_type("string"))
            .field("a", FieldSpec::of_type("integer"))
            .register_in(&registry)
            .expect_err("should fail");

        assert_eq!(
            error,
            DeclarationError::DuplicateField {
                owner: "Twice".to_string(),
                field: "a".to_string(),
            }
        );
    }

    #[test]
    fn should_use_name_override() {
        let registry = ComponentRegistry::new();
        let ty = DeclaredType::new("InternalUser");

        let component = SchemaDecl::new(&ty)
            .with_name("User")
            .register_in(&registry)
            .expect("should register");

        assert_eq!(component.name(), "User");
        assert_eq!(registry.resolve_name(&(&ty).into()), Ok("User".to_string()));
    }
}
