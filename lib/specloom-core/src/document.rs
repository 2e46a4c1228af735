//! The assembled document.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use utoipa::openapi::{Components, OpenApi};

use crate::path::Method;

/// Declared order of the responses of one operation.
#[derive(Debug, Clone)]
pub(crate) struct ResponseOrder {
    pub(crate) url: String,
    pub(crate) method: Method,
    pub(crate) statuses: Vec<String>,
}

/// An assembled document.
///
/// Dereferences to the `utoipa` model. That model keeps component schemas and
/// responses sorted by key, so serializing a `Document` writes component
/// schemas in registration order and responses in declaration order instead.
///
/// ```rust
/// use specloom_core::{Declaration, DeclaredType, SchemaDecl, build_document};
/// use utoipa::openapi::InfoBuilder;
///
/// let info = InfoBuilder::new().title("Zoo API").version("1.0.0").build();
/// let declarations = ["Zebra", "Apple"]
///     .map(|ident| Declaration::from(SchemaDecl::new(&DeclaredType::new(ident))));
///
/// let document = build_document(info, declarations)?;
/// let value = document.to_value()?;
///
/// let names = value["components"]["schemas"]
///     .as_object()
///     .map(|schemas| schemas.keys().cloned().collect::<Vec<_>>());
/// assert_eq!(names, Some(vec!["Zebra".to_string(), "Apple".to_string()]));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, derive_more::Deref)]
pub struct Document {
    #[deref]
    openapi: OpenApi,
    schema_order: Vec<String>,
    response_order: Vec<ResponseOrder>,
}

impl Document {
    /// Wraps a model, keeping the order it serializes with.
    #[must_use]
    pub fn new(openapi: OpenApi) -> Self {
        Self {
            openapi,
            schema_order: Vec::new(),
            response_order: Vec::new(),
        }
    }

    pub(crate) fn with_schema_order(mut self, names: Vec<String>) -> Self {
        self.schema_order = names;
        self
    }

    pub(crate) fn with_response_order(mut self, orders: Vec<ResponseOrder>) -> Self {
        self.response_order = orders;
        self
    }

    /// Returns the `utoipa` model.
    #[must_use]
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// Unwraps the `utoipa` model.
    #[must_use]
    pub fn into_openapi(self) -> OpenApi {
        self.openapi
    }

    /// Converts the document into a JSON value, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails when the model cannot be serialized.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(&self.openapi)?;

        if let Some(schemas) = value
            .pointer_mut("/components/schemas")
            .and_then(Value::as_object_mut)
        {
            reorder(schemas, &self.schema_order);
        }

        for order in &self.response_order {
            let responses = value
                .get_mut("paths")
                .and_then(|paths| paths.get_mut(order.url.as_str()))
                .and_then(|item| item.get_mut(order.method.to_string()))
                .and_then(|operation| operation.get_mut("responses"))
                .and_then(Value::as_object_mut);
            if let Some(responses) = responses {
                reorder(responses, &order.statuses);
            }
        }

        Ok(value)
    }
}

impl From<OpenApi> for Document {
    fn from(openapi: OpenApi) -> Self {
        Self::new(openapi)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// The schemas of a compilation unit, without paths.
///
/// Serializes as `{"components": {"schemas": ...}}`, in registration order.
#[derive(Debug, Clone)]
pub struct SchemasDocument {
    components: Components,
    schema_order: Vec<String>,
}

impl SchemasDocument {
    pub(crate) fn new(components: Components, schema_order: Vec<String>) -> Self {
        Self {
            components,
            schema_order,
        }
    }

    /// Returns the `components` section; only `schemas` is filled.
    #[must_use]
    pub fn components(&self) -> &Components {
        &self.components
    }

    /// Converts the document into a JSON value, in registration order.
    ///
    /// # Errors
    ///
    /// Fails when the schemas cannot be serialized.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut components = serde_json::to_value(&self.components)?;
        if let Some(schemas) = components
            .get_mut("schemas")
            .and_then(Value::as_object_mut)
        {
            reorder(schemas, &self.schema_order);
        }

        let mut document = Map::new();
        document.insert("components".to_string(), components);
        Ok(Value::Object(document))
    }
}

impl Serialize for SchemasDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Moves the listed keys first, in the listed order; other keys follow as they were.
fn reorder(map: &mut Map<String, Value>, order: &[String]) {
    let mut rest = std::mem::take(map);
    for key in order {
        if let Some(value) = rest.shift_remove(key) {
            map.insert(key.clone(), value);
        }
    }
    map.extend(rest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_move_listed_keys_first() {
        let Value::Object(mut map) = json!({"200": 1, "404": 2, "500": 3}) else {
            unreachable!("a mapping");
        };

        reorder(&mut map, &["404".to_string(), "201".to_string(), "200".to_string()]);

        let keys = map.keys().cloned().collect::<Vec<_>>();
        assert_eq!(keys, vec!["404", "200", "500"]);
    }

    #[test]
    fn should_serialize_plain_model_unchanged() -> anyhow::Result<()> {
        let openapi = utoipa::openapi::OpenApiBuilder::new()
            .info(
                utoipa::openapi::InfoBuilder::new()
                    .title("Menu API")
                    .version("1.0.0")
                    .build(),
            )
            .build();

        let document = Document::from(openapi.clone());

        assert_eq!(serde_json::to_value(&document)?, serde_json::to_value(&openapi)?);
        assert_eq!(document.info.title, "Menu API");
        Ok(())
    }
}
