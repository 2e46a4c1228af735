//! Schema declarations and the strict-mode schema builder.
//!
//! A [`SchemaDecl`] lists the fields of a [`DeclaredType`] in order. Registering it
//! produces an object schema whose `properties` follow the declaration order and
//! whose `required` list holds the required fields only (omitted when empty).
//!
//! Strict mode applies to every field:
//! - a reference field is emitted as a bare `$ref`,
//! - inline objects are rejected below the top level,
//! - arrays must declare primitive or reference items.

mod decl;
mod declared;
mod field;

pub use decl::{SchemaComponent, SchemaDecl};
pub use declared::{DeclaredType, RefTarget, TypeKey};
pub use field::{FieldSpec, FieldType, ItemsSpec};

pub(crate) use field::primitive_type;
