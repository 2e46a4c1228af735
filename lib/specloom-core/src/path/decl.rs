use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::{ExampleProvider, OperationSpec, ParamSpec};
use crate::error::DeclarationError;
use crate::registry::{PathRegistry, ScopedRegistry};
use crate::security::SecurityRequirement;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/]+)}").expect("a valid regex"));

/// Derives a file identifier from a URL template.
///
/// Slashes at both ends are stripped, placeholders lose their braces and the
/// remaining slashes become underscores. The root URL yields `root`.
///
/// ```rust
/// use specloom_core::file_id_from_url;
///
/// assert_eq!(file_id_from_url("/foo/{id}/bar-baz"), "foo_id_bar-baz");
/// assert_eq!(file_id_from_url("/"), "root");
/// ```
#[must_use]
pub fn file_id_from_url(url: &str) -> String {
    let trimmed = url.trim_matches('/');
    let file_id = PLACEHOLDER.replace_all(trimmed, "$name").replace('/', "_");
    if file_id.is_empty() {
        "root".to_string()
    } else {
        file_id
    }
}

/// Declaration of the operations served under a URL template.
///
/// ```rust
/// use specloom_core::{ItemsSpec, MediaSpec, OperationSpec, ParamSpec, PathDecl, PathRegistry, ResponseSpec};
///
/// let registry = PathRegistry::new();
/// let binding = PathDecl::new("/restaurants/{id}/menu")
///     .with_file_id("restaurant_menu")
///     .with_tag("Restaurant")
///     .with_param(ParamSpec::path("id", "integer").with_format("int64"))
///     .operation(
///         OperationSpec::get()
///             .with_response(
///                 ResponseSpec::new(200)
///                     .with_description("OK")
///                     .with_content(MediaSpec::json(ItemsSpec::reference("Menu"))),
///             )
///             .with_response(ResponseSpec::new(404).with_description("Not found")),
///     )
///     .register_in(&registry)?;
///
/// assert_eq!(binding.file_id(), "restaurant_menu");
/// assert_eq!(registry.urls(), vec!["/restaurants/{id}/menu"]);
/// # Ok::<(), specloom_core::DeclarationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PathDecl {
    binding: PathBinding,
}

impl PathDecl {
    /// Starts the declaration of a URL template.
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let file_id = file_id_from_url(&url);
        Self {
            binding: PathBinding {
                url,
                file_id,
                tags: Vec::new(),
                params: Vec::new(),
                summary: None,
                description: None,
                security: Vec::new(),
                source: None,
                operations: Vec::new(),
                examples: None,
            },
        }
    }

    /// Overrides the file identifier used when splitting.
    #[must_use]
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.binding.file_id = file_id.into();
        self
    }

    /// Adds a tag inherited by every operation.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.binding.tags.push(tag.into());
        self
    }

    /// Appends a path-level parameter.
    #[must_use]
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.binding.params.push(param);
        self
    }

    /// Sets the summary of the path item.
    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.binding.summary = Some(summary.into());
        self
    }

    /// Sets the description of the path item.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.binding.description = Some(description.into());
        self
    }

    /// Adds a security requirement carried onto every operation.
    #[must_use]
    pub fn with_security(mut self, requirement: SecurityRequirement) -> Self {
        self.binding.security.push(requirement);
        self
    }

    /// Sets the source location, used to mirror the layout when splitting.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.binding.source = Some(source.into());
        self
    }

    /// Adds an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationSpec) -> Self {
        self.binding.operations.push(operation);
        self
    }

    /// Sets the provider of illustrative examples.
    #[must_use]
    pub fn with_examples(mut self, provider: impl ExampleProvider + 'static) -> Self {
        self.binding.examples = Some(ExampleSource(Rc::new(provider)));
        self
    }

    /// Registers this declaration in the active path registry.
    ///
    /// # Errors
    ///
    /// See [`Self::register_in`].
    pub fn register(self) -> Result<Rc<PathBinding>, DeclarationError> {
        self.register_in(&PathRegistry::current())
    }

    /// Validates the declaration and binds it to its URL.
    ///
    /// # Errors
    ///
    /// Fails when a parameter or a media schema breaks a strict-mode rule; the
    /// registry is left untouched.
    pub fn register_in(self, registry: &PathRegistry) -> Result<Rc<PathBinding>, DeclarationError> {
        let binding = self.binding;
        binding.params.iter().try_for_each(ParamSpec::validate)?;
        binding
            .operations
            .iter()
            .try_for_each(OperationSpec::validate)?;

        let binding = Rc::new(binding);
        registry.bind(Rc::clone(&binding));
        debug!(
            url = %binding.url,
            file_id = %binding.file_id,
            operations = binding.operations.len(),
            "path registered"
        );
        Ok(binding)
    }
}

/// Shared handle on an example provider.
#[derive(Clone)]
pub(crate) struct ExampleSource(pub(crate) Rc<dyn ExampleProvider>);

impl fmt::Debug for ExampleSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ExampleSource")
    }
}

/// An immutable path declaration bound to its URL.
#[derive(Debug, Clone)]
pub struct PathBinding {
    url: String,
    file_id: String,
    tags: Vec<String>,
    params: Vec<ParamSpec>,
    summary: Option<String>,
    description: Option<String>,
    security: Vec<SecurityRequirement>,
    source: Option<PathBuf>,
    operations: Vec<OperationSpec>,
    examples: Option<ExampleSource>,
}

impl PathBinding {
    /// Returns the URL template.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the file identifier used when splitting.
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Returns the tags inherited by operations.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the path-level parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Returns the summary of the path item.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Returns the description of the path item.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the security requirements.
    #[must_use]
    pub fn security(&self) -> &[SecurityRequirement] {
        &self.security
    }

    /// Returns the source location, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Returns the operations, in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[OperationSpec] {
        &self.operations
    }

    /// Returns the example provider, if any.
    #[must_use]
    pub fn examples(&self) -> Option<&dyn ExampleProvider> {
        self.examples.as_ref().map(|source| source.0.as_ref())
    }
}
