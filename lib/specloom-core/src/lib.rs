//! # Specloom Core
//!
//! Compile declarative API type definitions into an OpenAPI document, then
//! split that document into a tree of files linked with relative `$ref`s.
//!
//! The building blocks are:
//! - **[`SchemaDecl`]** - the fields of a type, registered as a schema component
//! - **[`PathDecl`]** - the operations served under a URL template
//! - **[`ComponentRegistry`]** and **[`PathRegistry`]** - where declarations land
//! - **[`DocumentAssembler`]** - reads both registries into a [`Document`]
//! - **[`split`]** - writes one file per component and per path item, plus an index
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use specloom_core::{
//!     Declaration, DeclaredType, FieldSpec, MediaSpec, OperationSpec, ParamSpec, PathDecl,
//!     ResponseSpec, SchemaDecl, StaticExamples, Method, build_document,
//! };
//! use utoipa::openapi::InfoBuilder;
//!
//! let menu_item = DeclaredType::new("MenuItem");
//! let menu = DeclaredType::new("Menu");
//!
//! let declarations = [
//!     Declaration::from(
//!         SchemaDecl::new(&menu_item)
//!             .field("name", FieldSpec::of_type("string").required())
//!             .field("price", FieldSpec::of_type("number").required()),
//!     ),
//!     Declaration::from(
//!         SchemaDecl::new(&menu).field("items", FieldSpec::array(&menu_item).required()),
//!     ),
//!     Declaration::from(
//!         PathDecl::new("/restaurants/{id}/menu")
//!             .with_tag("Restaurant")
//!             .operation(
//!                 OperationSpec::get()
//!                     .with_param(ParamSpec::path("id", "integer").with_format("int64"))
//!                     .with_response(
//!                         ResponseSpec::new(200)
//!                             .with_description("OK")
//!                             .with_content(MediaSpec::json(&menu)),
//!                     )
//!                     .with_response(ResponseSpec::new(404).with_description("Not found")),
//!             )
//!             .with_examples(StaticExamples::new().with(
//!                 Method::Get,
//!                 [Some(json!({"items": [{"name": "Fried Rice", "price": 12.5}]})), None],
//!             )),
//!     ),
//! ];
//!
//! let info = InfoBuilder::new().title("Menu API").version("1.0.0").build();
//! let document = build_document(info, declarations)?;
//! let value = serde_json::to_value(&document)?;
//!
//! assert_eq!(
//!     value["components"]["schemas"]["Menu"]["properties"]["items"]["items"],
//!     json!({"$ref": "#/components/schemas/MenuItem"})
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Strict mode
//!
//! Schemas are built in strict mode: object-shaped data below the top level of
//! a type must be a named reference. Violations are reported as
//! [`DeclarationError`]s when the declaration is registered, and a failing
//! declaration never leaves a partial entry behind.
//!
//! ## Registries
//!
//! Each registry kind has an active instance per thread. `register()` uses it,
//! `register_in(..)` targets an explicit one. A registry can be installed for
//! the extent of a block with [`ScopedRegistry::enter`] or
//! [`ScopedRegistry::scoped`]; the previous one is restored on every exit path.
//!
//! ## Splitting
//!
//! [`split_and_write`] compiles declarations and writes:
//! - `<root>/openapi.<ext>`, the index,
//! - `<root>/schemas/**/<Name>.<ext>`, one file per component,
//! - `<root>/paths/**/<fileId>.<ext>`, one file per path item.
//!
//! A declaration whose source lies under the matching root is written to the
//! mirrored location. Running the same compilation twice writes byte-identical
//! files.

mod assemble;
mod document;
mod error;
pub mod load;
mod path;
mod pipeline;
mod registry;
mod schema;
mod security;
pub mod split;
mod yaml;

pub use self::assemble::DocumentAssembler;
pub use self::document::{Document, SchemasDocument};
pub use self::error::{DeclarationError, LoadError, SplitError, UnknownFormatError};
pub use self::load::DeclarationLoader;
pub use self::path::{
    APPLICATION_JSON, ExampleError, ExampleProvider, MediaSpec, Method, OperationSpec,
    ParamLocation, ParamSpec, PathBinding, PathDecl, RequestBodySpec, ResponseSpec,
    StaticExamples, file_id_from_url,
};
pub use self::pipeline::{
    Declaration, build_document, build_schemas_only, compile, split_and_write,
};
pub use self::registry::{
    ComponentRegistry, PathRecord, PathRegistry, RegistryScope, Schemas, ScopedRegistry,
};
pub use self::schema::{
    DeclaredType, FieldSpec, FieldType, ItemsSpec, RefTarget, SchemaComponent, SchemaDecl,
    TypeKey,
};
pub use self::security::SecurityRequirement;
pub use self::split::SplitLayout;
pub use self::yaml::{OutputFormat, ToYaml, YamlError};
