use std::collections::HashSet;

use serde::Deserialize;
use utoipa::openapi::HttpMethod;
use utoipa::openapi::path::{Operation, OperationBuilder};

use super::{ParamSpec, RequestBodySpec, ResponseSpec};
use crate::error::DeclarationError;
use crate::registry::ComponentRegistry;
use crate::security::SecurityRequirement;

/// HTTP method of an operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// `get`
    #[display("get")]
    Get,
    /// `put`
    #[display("put")]
    Put,
    /// `post`
    #[display("post")]
    Post,
    /// `delete`
    #[display("delete")]
    Delete,
    /// `patch`
    #[display("patch")]
    Patch,
    /// `options`
    #[display("options")]
    Options,
    /// `head`
    #[display("head")]
    Head,
    /// `trace`
    #[display("trace")]
    Trace,
}

impl From<Method> for HttpMethod {
    fn from(value: Method) -> Self {
        match value {
            Method::Get => Self::Get,
            Method::Put => Self::Put,
            Method::Post => Self::Post,
            Method::Delete => Self::Delete,
            Method::Patch => Self::Patch,
            Method::Options => Self::Options,
            Method::Head => Self::Head,
            Method::Trace => Self::Trace,
        }
    }
}

/// Declaration of one operation of a path.
///
/// Responses keep their declaration order, which is also the order used to map
/// examples onto them.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationSpec {
    method: Method,
    summary: Option<String>,
    operation_id: Option<String>,
    description: Option<String>,
    params: Vec<ParamSpec>,
    request: Option<RequestBodySpec>,
    responses: Vec<ResponseSpec>,
}

impl OperationSpec {
    /// Creates an operation for the given method.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            summary: None,
            operation_id: None,
            description: None,
            params: Vec::new(),
            request: None,
            responses: Vec::new(),
        }
    }

    /// Creates a `get` operation.
    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// Creates a `put` operation.
    #[must_use]
    pub fn put() -> Self {
        Self::new(Method::Put)
    }

    /// Creates a `post` operation.
    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    /// Creates a `delete` operation.
    #[must_use]
    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    /// Creates a `patch` operation.
    #[must_use]
    pub fn patch() -> Self {
        Self::new(Method::Patch)
    }

    /// Creates an `options` operation.
    #[must_use]
    pub fn options() -> Self {
        Self::new(Method::Options)
    }

    /// Creates a `head` operation.
    #[must_use]
    pub fn head() -> Self {
        Self::new(Method::Head)
    }

    /// Creates a `trace` operation.
    #[must_use]
    pub fn trace() -> Self {
        Self::new(Method::Trace)
    }

    /// Sets the summary.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the operation id.
    #[must_use]
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends an operation parameter.
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_request(mut self, request: RequestBodySpec) -> Self {
        self.request = Some(request);
        self
    }

    /// Appends a response.
    #[must_use]
    pub fn with_response(mut self, response: ResponseSpec) -> Self {
        self.responses.push(response);
        self
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the declared responses, in order.
    #[must_use]
    pub fn responses(&self) -> &[ResponseSpec] {
        &self.responses
    }

    pub(crate) fn validate(&self) -> Result<(), DeclarationError> {
        self.params.iter().try_for_each(ParamSpec::validate)?;
        if let Some(request) = &self.request {
            request.validate()?;
        }

        let mut statuses = HashSet::new();
        for response in &self.responses {
            response.validate()?;
            if !statuses.insert(response.status()) {
                return Err(DeclarationError::DuplicateResponse {
                    method: self.method.to_string(),
                    status: response.status().to_string(),
                });
            }
        }
        Ok(())
    }
}

/// What an operation inherits from the declaration of its path.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OperationContext<'a> {
    pub(crate) path_params: &'a [ParamSpec],
    pub(crate) tags: &'a [String],
    pub(crate) security: &'a [SecurityRequirement],
}

/// Builds an operation.
///
/// Parameters are the path-level ones followed by the operation's own, in
/// declaration order and without deduplication.
pub(crate) fn build_operation(
    context: OperationContext<'_>,
    spec: &OperationSpec,
    registry: &ComponentRegistry,
) -> Result<Operation, DeclarationError> {
    let parameters = context
        .path_params
        .iter()
        .chain(&spec.params)
        .map(ParamSpec::to_parameter)
        .collect::<Result<Vec<_>, _>>()?;
    let request_body = spec
        .request
        .as_ref()
        .map(|request| request.to_request_body(registry))
        .transpose()?;

    let mut builder = OperationBuilder::new()
        .tags((!context.tags.is_empty()).then(|| context.tags.to_vec()))
        .summary(spec.summary.as_deref())
        .operation_id(spec.operation_id.as_deref())
        .description(spec.description.as_deref())
        .parameters((!parameters.is_empty()).then_some(parameters))
        .request_body(request_body)
        .securities(
            (!context.security.is_empty())
                .then(|| context.security.iter().map(SecurityRequirement::to_utoipa)),
        );
    for response in &spec.responses {
        builder = builder.response(response.status(), response.to_response(registry)?);
    }
    Ok(builder.build())
}
