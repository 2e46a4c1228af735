//! Field specifications and their strict-mode conversion to property schemas.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use utoipa::openapi::schema::{
    Array, ArrayBuilder, Object, ObjectBuilder, SchemaFormat, SchemaType, Type,
};
use utoipa::openapi::{Ref, RefOr, Schema};

use super::RefTarget;
use crate::error::DeclarationError;
use crate::registry::ComponentRegistry;

/// Declared type of a field: one primitive name or an ordered union of them.
///
/// The order of a union is kept verbatim in the output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldType {
    /// A single primitive name, e.g. `"string"`.
    Single(String),
    /// An ordered union, e.g. `["string", "null"]`.
    Union(Vec<String>),
}

impl FieldType {
    /// Returns the declared primitive names, in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        match self {
            Self::Single(name) => std::slice::from_ref(name),
            Self::Union(names) => names,
        }
    }

    fn resolve(&self, field: &str) -> Result<Vec<Type>, DeclarationError> {
        let names = self.names();
        if names.is_empty() {
            return Err(DeclarationError::InvalidPrimitiveType {
                field: field.to_string(),
                value: "[]".to_string(),
            });
        }

        let types = names
            .iter()
            .map(|name| primitive_type(field, name))
            .collect::<Result<Vec<_>, _>>()?;
        if types.contains(&Type::Object) {
            return Err(DeclarationError::ObjectRequiresRef {
                field: field.to_string(),
            });
        }
        Ok(types)
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl<const N: usize> From<[&str; N]> for FieldType {
    fn from(value: [&str; N]) -> Self {
        Self::Union(value.iter().map(ToString::to_string).collect())
    }
}

impl From<Vec<String>> for FieldType {
    fn from(value: Vec<String>) -> Self {
        Self::Union(value)
    }
}

/// Parses a primitive type name.
pub(crate) fn primitive_type(field: &str, name: &str) -> Result<Type, DeclarationError> {
    let ty = match name {
        "string" => Type::String,
        "integer" => Type::Integer,
        "number" => Type::Number,
        "boolean" => Type::Boolean,
        "object" => Type::Object,
        "array" => Type::Array,
        "null" => Type::Null,
        _ => {
            return Err(DeclarationError::InvalidPrimitiveType {
                field: field.to_string(),
                value: name.to_string(),
            });
        }
    };
    Ok(ty)
}

fn schema_type(types: &[Type]) -> SchemaType {
    match types {
        [] => SchemaType::AnyValue,
        [single] => SchemaType::Type(single.clone()),
        _ => SchemaType::Array(types.to_vec()),
    }
}

/// Optional annotations of a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Facets {
    pub(crate) format: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) example: Option<Value>,
    pub(crate) default: Option<Value>,
}

#[allow(deprecated)]
fn typed_schema(
    field: &str,
    types: &[Type],
    facets: &Facets,
    items: Option<RefOr<Schema>>,
) -> RefOr<Schema> {
    let description = facets
        .description
        .as_deref()
        .filter(|description| !description.is_empty());

    if let Some(items) = items {
        if facets.format.is_some() || facets.enum_values.is_some() {
            warn!(field, "'format' and 'enum' ignored on an array field");
        }
        let array = ArrayBuilder::new()
            .schema_type(schema_type(types))
            .items(items)
            .description(description)
            .default(facets.default.clone())
            .example(facets.example.clone())
            .build();
        return RefOr::T(Schema::Array(array));
    }

    let object = ObjectBuilder::new()
        .schema_type(schema_type(types))
        .format(facets.format.clone().map(SchemaFormat::Custom))
        .description(description)
        .enum_values(facets.enum_values.clone())
        .default(facets.default.clone())
        .example(facets.example.clone())
        .build();
    RefOr::T(Schema::Object(object))
}

/// Schema of array items, or of a request/response media entry.
///
/// Strict mode admits a primitive-shaped schema (a JSON mapping with `type` or
/// `$ref`) or a reference; an inline object is always rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemsSpec {
    /// A raw primitive-shaped schema such as `{"type": "string"}`.
    Schema(Value),
    /// A reference to a named component or a declared type.
    Reference(RefTarget),
}

impl ItemsSpec {
    /// Creates a reference to a component name or a declared type.
    pub fn reference(target: impl Into<RefTarget>) -> Self {
        Self::Reference(target.into())
    }

    /// Creates a primitive schema of the given type name.
    pub fn primitive(type_name: &str) -> Self {
        Self::Schema(serde_json::json!({ "type": type_name }))
    }

    pub(crate) fn to_schema(
        &self,
        field: &str,
        registry: &ComponentRegistry,
    ) -> Result<RefOr<Schema>, DeclarationError> {
        match self {
            Self::Reference(target) => {
                let name = registry.resolve_name(target)?;
                Ok(RefOr::Ref(Ref::from_schema_name(name)))
            }
            Self::Schema(value) => raw_schema(field, value),
        }
    }
}

impl From<Value> for ItemsSpec {
    fn from(value: Value) -> Self {
        Self::Schema(value)
    }
}

impl From<&super::DeclaredType> for ItemsSpec {
    fn from(value: &super::DeclaredType) -> Self {
        Self::Reference(RefTarget::from(value))
    }
}

impl From<RefTarget> for ItemsSpec {
    fn from(value: RefTarget) -> Self {
        Self::Reference(value)
    }
}

fn invalid_items(field: &str, reason: impl Into<String>) -> DeclarationError {
    DeclarationError::InvalidItems {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn raw_schema(field: &str, value: &Value) -> Result<RefOr<Schema>, DeclarationError> {
    let Value::Object(map) = value else {
        return Err(invalid_items(field, "expected a mapping"));
    };

    if let Some(reference) = map.get("$ref") {
        if map.len() > 1 {
            return Err(invalid_items(
                field,
                "a '$ref' must not carry sibling keywords",
            ));
        }
        let Value::String(location) = reference else {
            return Err(invalid_items(field, "'$ref' must be a string"));
        };
        return Ok(RefOr::Ref(Ref::new(location.clone())));
    }

    if map.contains_key("properties") || map.contains_key("required") {
        return Err(DeclarationError::ObjectRequiresRef {
            field: field.to_string(),
        });
    }

    let Some(raw_type) = map.get("type") else {
        return Err(invalid_items(field, "must contain 'type' or '$ref'"));
    };
    let field_type = FieldType::deserialize(raw_type)
        .map_err(|_| invalid_items(field, "'type' must be a string or a list of strings"))?;
    let types = field_type.resolve(field)?;

    // other keywords are kept as written
    let mut map = map.clone();
    let schema = if types.contains(&Type::Array) {
        let nested = map
            .get("items")
            .ok_or_else(|| DeclarationError::MissingArrayItems {
                field: field.to_string(),
            })?;
        let nested = serde_json::to_value(raw_schema(field, nested)?)
            .map_err(|error| invalid_items(field, error.to_string()))?;
        for facet in ["format", "enum"] {
            if map.remove(facet).is_some() {
                warn!(field, facet, "facet ignored on array items");
            }
        }
        map.insert("items".to_string(), nested);
        Array::deserialize(Value::Object(map)).map(Schema::Array)
    } else {
        Object::deserialize(Value::Object(map)).map(Schema::Object)
    };

    schema
        .map(RefOr::T)
        .map_err(|error| invalid_items(field, error.to_string()))
}

/// Declarative metadata of one field of a declared type.
///
/// ```rust
/// use specloom_core::{FieldSpec, ItemsSpec};
///
/// let name = FieldSpec::of_type("string")
///     .required()
///     .with_description("Dish name");
/// let tags = FieldSpec::array(ItemsSpec::primitive("string"));
/// let owner = FieldSpec::reference("User");
///
/// assert!(name.is_required());
/// assert!(!tags.is_required());
/// assert!(!owner.is_required());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    field_type: Option<FieldType>,
    required: bool,
    facets: Facets,
    items: Option<ItemsSpec>,
    properties: Option<Value>,
    required_props: Option<Vec<String>>,
    reference: Option<RefTarget>,
}

impl FieldSpec {
    /// Creates an empty field specification.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a field of the given primitive type or union.
    pub fn of_type(field_type: impl Into<FieldType>) -> Self {
        Self::new().with_type(field_type)
    }

    /// Creates an array field with the given items.
    pub fn array(items: impl Into<ItemsSpec>) -> Self {
        Self::of_type("array").with_items(items)
    }

    /// Creates a field referencing a named component or a declared type.
    pub fn reference(target: impl Into<RefTarget>) -> Self {
        Self::new().with_ref(target)
    }

    /// Sets the primitive type or union.
    #[must_use]
    pub fn with_type(mut self, field_type: impl Into<FieldType>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Sets the reference target.
    #[must_use]
    pub fn with_ref(mut self, target: impl Into<RefTarget>) -> Self {
        self.reference = Some(target.into());
        self
    }

    /// Marks the field as required on its owning object.
    #[must_use]
    pub fn required(self) -> Self {
        self.with_required(true)
    }

    /// Sets whether the field is required on its owning object.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.facets.description = Some(description.into());
        self
    }

    /// Sets the format, e.g. `int64` or `date-time`.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.facets.format = Some(format.into());
        self
    }

    /// Sets the allowed values.
    #[must_use]
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.facets.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the example value. `null` means no example.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.facets.example = Some(example.into()).filter(|value| !value.is_null());
        self
    }

    /// Sets the default value. `null` means no default.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.facets.default = Some(default.into()).filter(|value| !value.is_null());
        self
    }

    /// Sets the array items.
    #[must_use]
    pub fn with_items(mut self, items: impl Into<ItemsSpec>) -> Self {
        self.items = Some(items.into());
        self
    }

    /// Sets inline object properties.
    ///
    /// Inline objects are never accepted below the top level, the conversion fails
    /// with [`DeclarationError::ObjectRequiresRef`].
    #[must_use]
    pub fn with_properties(mut self, properties: Value) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the required list of an inline object. Rejected like [`Self::with_properties`].
    #[must_use]
    pub fn with_required_props<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_props = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` when the field is required on its owning object.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Converts the field into a property schema, enforcing strict mode.
    ///
    /// # Errors
    ///
    /// Any [`DeclarationError`] of the strict-mode rules.
    pub fn to_property(
        &self,
        field: &str,
        registry: &ComponentRegistry,
    ) -> Result<RefOr<Schema>, DeclarationError> {
        if let Some(target) = &self.reference {
            let conflicts = [
                ("type", self.field_type.is_some()),
                ("items", self.items.is_some()),
                ("properties", self.properties.is_some()),
                ("required_props", self.required_props.is_some()),
            ]
            .into_iter()
            .filter_map(|(key, present)| present.then_some(key))
            .collect::<Vec<_>>();
            if !conflicts.is_empty() {
                return Err(DeclarationError::ConflictingFieldSpec {
                    field: field.to_string(),
                    conflict: conflicts.join(", "),
                });
            }

            let name = registry.resolve_name(target)?;
            return Ok(RefOr::Ref(Ref::from_schema_name(name)));
        }

        let types = match &self.field_type {
            Some(field_type) => field_type.resolve(field)?,
            None => Vec::new(),
        };

        let items = if types.contains(&Type::Array) {
            let items = self
                .items
                .as_ref()
                .ok_or_else(|| DeclarationError::MissingArrayItems {
                    field: field.to_string(),
                })?;
            Some(items.to_schema(field, registry)?)
        } else {
            if self.items.is_some() {
                warn!(field, "'items' ignored on a non-array field");
            }
            None
        };

        if self.properties.is_some() || self.required_props.is_some() {
            return Err(DeclarationError::ObjectRequiresRef {
                field: field.to_string(),
            });
        }

        Ok(typed_schema(field, &types, &self.facets, items))
    }
}
