use serde::Deserialize;
use serde_json::Value;
use utoipa::openapi::path::{Parameter, ParameterBuilder, ParameterIn};
use utoipa::openapi::schema::{ObjectBuilder, SchemaFormat, Type};
use utoipa::openapi::{Required, Schema};

use crate::error::DeclarationError;
use crate::schema::primitive_type;

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Part of the URL template.
    #[display("path")]
    Path,
    /// Query string.
    #[display("query")]
    Query,
    /// Request header.
    #[display("header")]
    Header,
    /// Cookie.
    #[display("cookie")]
    Cookie,
}

impl From<ParamLocation> for ParameterIn {
    fn from(value: ParamLocation) -> Self {
        match value {
            ParamLocation::Path => Self::Path,
            ParamLocation::Query => Self::Query,
            ParamLocation::Header => Self::Header,
            ParamLocation::Cookie => Self::Cookie,
        }
    }
}

/// Declaration of a parameter with an inline primitive schema.
///
/// ```rust
/// use specloom_core::ParamSpec;
///
/// let id = ParamSpec::path("id", "integer").with_format("int64");
/// let page = ParamSpec::query("page", "integer").with_default(1);
///
/// assert!(id.is_required());
/// assert!(!page.is_required());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    location: ParamLocation,
    type_name: String,
    format: Option<String>,
    required: bool,
    description: Option<String>,
    default: Option<Value>,
    example: Option<Value>,
}

impl ParamSpec {
    /// Creates a parameter. Path parameters are required, others optional.
    pub fn new(
        name: impl Into<String>,
        location: ParamLocation,
        type_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            type_name: type_name.into(),
            format: None,
            required: location == ParamLocation::Path,
            description: None,
            default: None,
            example: None,
        }
    }

    /// Creates a required path parameter.
    pub fn path(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Path, type_name)
    }

    /// Creates an optional query parameter.
    pub fn query(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Query, type_name)
    }

    /// Creates an optional header parameter.
    pub fn header(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Header, type_name)
    }

    /// Creates an optional cookie parameter.
    pub fn cookie(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Cookie, type_name)
    }

    /// Sets the schema format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Overrides the required flag.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the schema default. `null` means no default.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into()).filter(|value| !value.is_null());
        self
    }

    /// Sets the example. `null` means no example.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into()).filter(|value| !value.is_null());
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter location.
    #[must_use]
    pub fn location(&self) -> ParamLocation {
        self.location
    }

    /// Returns `true` for a required parameter.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    fn schema_type(&self) -> Result<Type, DeclarationError> {
        let ty = primitive_type(&self.name, &self.type_name)?;
        match ty {
            Type::Object => Err(DeclarationError::ObjectRequiresRef {
                field: self.name.clone(),
            }),
            Type::Array => Err(DeclarationError::MissingArrayItems {
                field: self.name.clone(),
            }),
            _ => Ok(ty),
        }
    }

    /// Checks the strict-mode rules of the inline schema.
    pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
        self.schema_type().map(|_| ())
    }

    /// Converts into an `OpenAPI` parameter.
    #[allow(deprecated)]
    pub(crate) fn to_parameter(&self) -> Result<Parameter, DeclarationError> {
        let schema = ObjectBuilder::new()
            .schema_type(self.schema_type()?)
            .format(self.format.clone().map(SchemaFormat::Custom))
            .default(self.default.clone())
            .build();

        let required = if self.required {
            Required::True
        } else {
            Required::False
        };

        let parameter = ParameterBuilder::new()
            .name(&self.name)
            .parameter_in(self.location.into())
            .required(required)
            .description(
                self.description
                    .as_deref()
                    .filter(|description| !description.is_empty()),
            )
            .schema(Some(Schema::Object(schema)))
            .example(self.example.clone())
            .build();
        Ok(parameter)
    }
}
