//! YAML and JSON output.
//!
//! YAML is the default format of the split tree; JSON is available for tools
//! that do not read YAML. Both go through serde, so anything [`Serialize`] can be
//! written with either.

use std::ffi::OsStr;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{SplitError, UnknownFormatError};

/// Error type for YAML serialization operations.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Extension trait for serializing types to YAML.
///
/// This trait is implemented for all types that implement [`Serialize`].
///
/// ```rust
/// use specloom_core::ToYaml;
/// use utoipa::openapi::{InfoBuilder, OpenApiBuilder};
///
/// let document = OpenApiBuilder::new()
///     .info(InfoBuilder::new().title("Menu API").version("1.0.0").build())
///     .build();
///
/// let yaml = document.to_yaml()?;
/// assert!(yaml.starts_with("openapi: 3.1.0"));
/// # Ok::<(), specloom_core::YamlError>(())
/// ```
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlError`] if serialization fails.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

/// Serialization format of written files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum OutputFormat {
    /// YAML, with the `.yaml` extension.
    #[default]
    #[display("yaml")]
    Yaml,
    /// Pretty-printed JSON, with the `.json` extension.
    #[display("json")]
    Json,
}

impl OutputFormat {
    /// Returns the file extension, without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Guesses the format from a file extension.
    ///
    /// Both `yaml` and `yml` are recognized.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(OsStr::to_str)? {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Serializes a value.
    ///
    /// The output always ends with a newline.
    ///
    /// # Errors
    ///
    /// Fails when the value cannot be represented in this format.
    pub fn serialize<T: Serialize>(self, value: &T) -> Result<String, SplitError> {
        let mut text = match self {
            Self::Yaml => value.to_yaml().map_err(|error| SplitError::YamlError {
                message: error.to_string(),
            })?,
            Self::Json => serde_json::to_string_pretty(value)?,
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }

    /// Deserializes a value, reporting failures as plain messages.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic when the text is not valid for `T`.
    pub fn deserialize<T: DeserializeOwned>(self, text: &str) -> Result<T, String> {
        match self {
            Self::Yaml => serde_saphyr::from_str(text).map_err(|error| error.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|error| error.to_string()),
        }
    }

    /// Parses a document into a JSON value.
    ///
    /// # Errors
    ///
    /// Fails when the text is not a valid document in this format.
    pub fn parse(self, text: &str) -> Result<Value, SplitError> {
        match self {
            Self::Yaml => {
                self.deserialize(text)
                    .map_err(|message| SplitError::YamlError { message })
            }
            Self::Json => Ok(serde_json::from_str(text)?),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = UnknownFormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(UnknownFormatError {
                value: value.to_string(),
            }),
        }
    }
}
