use std::path::PathBuf;

/// Errors raised while declaring schemas and paths.
///
/// All variants are fatal: a declaration that fails never leaves a partial entry
/// in a registry.
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display)]
pub enum DeclarationError {
    /// A field mixes `ref` with a type, items or inline object keys.
    #[display("Field '{field}' mixes 'ref' with {conflict}")]
    ConflictingFieldSpec {
        /// Name of the offending field.
        field: String,
        /// Which keys conflict with the reference.
        conflict: String,
    },

    /// An inline object schema was declared below the top level of a type.
    ///
    /// Object-shaped data must be expressed with a named reference.
    #[display("Field '{field}' declares an inline object, use a reference instead")]
    ObjectRequiresRef {
        /// Name of the offending field.
        field: String,
    },

    /// A type name outside of the allowed primitive set.
    #[display(
        "Field '{field}' has invalid type '{value}', expected one of: array, boolean, integer, null, number, object, string"
    )]
    InvalidPrimitiveType {
        /// Name of the offending field.
        field: String,
        /// The rejected type name.
        value: String,
    },

    /// An array-typed field declared no `items`.
    #[display("Array field '{field}' must declare 'items'")]
    MissingArrayItems {
        /// Name of the offending field.
        field: String,
    },

    /// Array items are neither a primitive-shaped schema nor a reference.
    #[display("Field '{field}' has invalid items: {reason}")]
    InvalidItems {
        /// Name of the offending field.
        field: String,
        /// Why the items were rejected.
        reason: String,
    },

    /// Name resolution got neither a component name nor a declared type.
    #[display("Cannot resolve a component name from {value}")]
    InvalidReferenceKind {
        /// The value that could not be resolved.
        value: serde_json::Value,
    },

    /// The same component name was registered with two different schemas.
    #[display("Component '{name}' is already registered with a different schema")]
    AmbiguousComponentName {
        /// The conflicting component name.
        name: String,
    },

    /// An operation declares two responses with the same status code.
    #[display("Operation '{method}' declares response '{status}' more than once")]
    DuplicateResponse {
        /// The operation's method.
        method: String,
        /// The duplicated status code.
        status: String,
    },

    /// A type declares the same field twice.
    #[display("Type '{owner}' declares field '{field}' more than once")]
    DuplicateField {
        /// Identifier of the declaring type.
        owner: String,
        /// The duplicated field name.
        field: String,
    },
}

/// Errors raised while splitting a document and writing the file tree.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SplitError {
    /// File system error, propagated unmodified.
    IoError(std::io::Error),

    /// JSON (de)serialization error.
    JsonError(serde_json::Error),

    /// A declaration failed while compiling the document to split.
    DeclarationError(DeclarationError),

    /// YAML (de)serialization error.
    #[display("YAML error: {message}")]
    #[from(skip)]
    YamlError {
        /// Description of the failure.
        message: String,
    },

    /// Two path items resolve to the same output file.
    #[display("Several path items target the file '{}'", path.display())]
    #[from(skip)]
    TargetCollision {
        /// The contested output file.
        path: PathBuf,
    },

    /// The document does not have the expected shape.
    #[display("Invalid document: {message}")]
    #[from(skip)]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },
}

/// Errors raised while loading declaration files.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum LoadError {
    /// File system error.
    IoError(std::io::Error),

    /// Directory traversal error.
    WalkError(walkdir::Error),

    /// A declaration read from a file is invalid.
    DeclarationError(DeclarationError),

    /// A required directory is missing.
    #[display("Missing directory '{}'", path.display())]
    #[from(skip)]
    MissingDirectory {
        /// The expected directory.
        path: PathBuf,
    },

    /// A declaration file could not be parsed.
    #[display("Failed to parse '{}': {message}", path.display())]
    #[from(skip)]
    ParseError {
        /// The file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// An output format name that is neither `yaml` nor `json`.
#[derive(Debug, Clone, PartialEq, derive_more::Error, derive_more::Display)]
#[display("Unknown output format '{value}', expected 'yaml' or 'json'")]
pub struct UnknownFormatError {
    /// The rejected format name.
    pub value: String,
}
