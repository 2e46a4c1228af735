//! Illustrative examples attached to response media.
//!
//! An [`ExampleProvider`] returns, per method, an ordered sequence of optional
//! values. Element `i` goes to the `i`-th declared response:
//! - `None` attaches nothing,
//! - a response without body ignores its element,
//! - a single content type takes the element verbatim,
//! - several content types expect a mapping keyed by content type.
//!
//! Extra elements are ignored. Examples are decoration only, a failing provider
//! never prevents the document from being built.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};
use utoipa::openapi::RefOr;
use utoipa::openapi::path::Operation;

use super::Method;

/// Failure of an [`ExampleProvider`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("{message}")]
pub struct ExampleError {
    message: String,
}

impl ExampleError {
    /// Creates an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Produces illustrative examples for the operations of a path.
pub trait ExampleProvider {
    /// Returns the examples of the operation for `method`, one per response.
    ///
    /// # Errors
    ///
    /// Any error is logged and swallowed: the operation is kept without examples.
    fn produce_examples(&self, method: Method) -> Result<Vec<Option<Value>>, ExampleError>;
}

impl<F> ExampleProvider for F
where
    F: Fn(Method) -> Result<Vec<Option<Value>>, ExampleError>,
{
    fn produce_examples(&self, method: Method) -> Result<Vec<Option<Value>>, ExampleError> {
        self(method)
    }
}

/// Fixed example sequences, keyed by method.
///
/// ```rust
/// use serde_json::json;
/// use specloom_core::{ExampleProvider, Method, StaticExamples};
///
/// let examples = StaticExamples::new().with(Method::Get, [Some(json!({"a": 1})), None]);
///
/// assert_eq!(examples.produce_examples(Method::Get)?.len(), 2);
/// assert!(examples.produce_examples(Method::Post)?.is_empty());
/// # Ok::<(), specloom_core::ExampleError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticExamples {
    by_method: IndexMap<Method, Vec<Option<Value>>>,
}

impl StaticExamples {
    /// Creates an empty set of examples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sequence returned for a method.
    #[must_use]
    pub fn with(mut self, method: Method, examples: impl IntoIterator<Item = Option<Value>>) -> Self {
        self.by_method
            .insert(method, examples.into_iter().collect());
        self
    }

    /// Returns `true` when no method has examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }
}

impl ExampleProvider for StaticExamples {
    fn produce_examples(&self, method: Method) -> Result<Vec<Option<Value>>, ExampleError> {
        Ok(self.by_method.get(&method).cloned().unwrap_or_default())
    }
}

/// Attaches examples to the responses of an operation, positionally.
///
/// `statuses` lists the responses in declaration order; the built operation
/// keeps them sorted by status code.
pub(crate) fn apply_examples(operation: &mut Operation, statuses: &[&str], examples: &[Option<Value>]) {
    for (example, status) in examples.iter().zip(statuses) {
        let Some(example) = example.as_ref().filter(|example| !example.is_null()) else {
            continue;
        };
        let Some(RefOr::T(response)) = operation.responses.responses.get_mut(*status) else {
            continue;
        };

        if response.content.is_empty() {
            debug!(%status, "example ignored for a response without body");
            continue;
        }

        if response.content.len() == 1 {
            if let Some(content) = response.content.values_mut().next() {
                content.example = Some(example.clone());
            }
            continue;
        }

        let Value::Object(by_content_type) = example else {
            warn!(%status, "examples of a multi-content response must be keyed by content type");
            continue;
        };
        for (content_type, value) in by_content_type {
            match response.content.get_mut(content_type) {
                Some(content) if !value.is_null() => content.example = Some(value.clone()),
                Some(_) => {}
                None => warn!(%status, %content_type, "example ignored for an undeclared content type"),
            }
        }
    }

    if examples.len() > statuses.len() {
        debug!(extra = examples.len() - statuses.len(), "extra examples ignored");
    }
}
