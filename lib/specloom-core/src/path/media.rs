use utoipa::openapi::request_body::{RequestBody, RequestBodyBuilder};
use utoipa::openapi::{Content, ContentBuilder, Required, Response, ResponseBuilder};

use crate::error::DeclarationError;
use crate::registry::ComponentRegistry;
use crate::schema::ItemsSpec;

/// Content type used by [`MediaSpec::json`].
pub const APPLICATION_JSON: &str = "application/json";

/// A schema exposed under a content type.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSpec {
    content_type: String,
    schema: ItemsSpec,
}

impl MediaSpec {
    /// Creates a media entry for any content type.
    pub fn new(content_type: impl Into<String>, schema: impl Into<ItemsSpec>) -> Self {
        Self {
            content_type: content_type.into(),
            schema: schema.into(),
        }
    }

    /// Creates an `application/json` media entry.
    pub fn json(schema: impl Into<ItemsSpec>) -> Self {
        Self::new(APPLICATION_JSON, schema)
    }

    /// Returns the content type.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    fn to_content(&self, registry: &ComponentRegistry) -> Result<Content, DeclarationError> {
        let schema = self.schema.to_schema(&self.content_type, registry)?;
        Ok(ContentBuilder::new().schema(Some(schema)).build())
    }
}

/// Declaration of one response of an operation.
///
/// ```rust
/// use specloom_core::{ItemsSpec, MediaSpec, ResponseSpec};
///
/// let ok = ResponseSpec::new(200)
///     .with_description("OK")
///     .with_content(MediaSpec::json(ItemsSpec::reference("Menu")))
///     .also_as("application/xml");
/// let not_modified = ResponseSpec::new(304).with_description("Not modified");
///
/// assert_eq!(ok.content_types(), vec!["application/json", "application/xml"]);
/// assert!(not_modified.content_types().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSpec {
    status: String,
    description: String,
    media: Vec<MediaSpec>,
}

impl ResponseSpec {
    /// Creates a response without body.
    pub fn new(status: impl ToString) -> Self {
        Self {
            status: status.to_string(),
            description: String::new(),
            media: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a media entry.
    #[must_use]
    pub fn with_content(mut self, media: MediaSpec) -> Self {
        self.media.push(media);
        self
    }

    /// Exposes the schema of the first media entry under another content type.
    ///
    /// Does nothing when the response has no body.
    #[must_use]
    pub fn also_as(mut self, content_type: impl Into<String>) -> Self {
        if let Some(first) = self.media.first() {
            let extra = MediaSpec::new(content_type, first.schema.clone());
            self.media.push(extra);
        }
        self
    }

    /// Returns the status code key.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the declared content types, in order.
    #[must_use]
    pub fn content_types(&self) -> Vec<&str> {
        self.media.iter().map(MediaSpec::content_type).collect()
    }

    pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
        self.to_response(&ComponentRegistry::new()).map(|_| ())
    }

    pub(crate) fn to_response(
        &self,
        registry: &ComponentRegistry,
    ) -> Result<Response, DeclarationError> {
        let mut builder = ResponseBuilder::new().description(&self.description);
        for media in &self.media {
            builder = builder.content(media.content_type.clone(), media.to_content(registry)?);
        }
        Ok(builder.build())
    }
}

/// Declaration of a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodySpec {
    media: MediaSpec,
    required: bool,
    description: Option<String>,
}

impl RequestBodySpec {
    /// Creates an optional request body.
    #[must_use]
    pub fn new(media: MediaSpec) -> Self {
        Self {
            media,
            required: false,
            description: None,
        }
    }

    /// Sets whether the body is required.
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

    pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
        self.to_request_body(&ComponentRegistry::new()).map(|_| ())
    }

    pub(crate) fn to_request_body(
        &self,
        registry: &ComponentRegistry,
    ) -> Result<RequestBody, DeclarationError> {
        let required = if self.required {
            Required::True
        } else {
            Required::False
        };
        let body = RequestBodyBuilder::new()
            .content(self.media.content_type.clone(), self.media.to_content(registry)?)
            .description(
                self.description
                    .as_deref()
                    .filter(|description| !description.is_empty()),
            )
            .required(Some(required))
            .build();
        Ok(body)
    }
}
