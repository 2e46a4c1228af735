//! Path declarations and the operation builder.
//!
//! A [`PathDecl`] binds operations to a URL template. Several declarations may
//! target the same URL, the [`PathRegistry`](crate::PathRegistry) keeps them all
//! in registration order.

mod decl;
mod examples;
mod media;
pub(crate) mod operation;
mod params;

pub use decl::{PathBinding, PathDecl, file_id_from_url};
pub use examples::{ExampleError, ExampleProvider, StaticExamples};
pub use media::{APPLICATION_JSON, MediaSpec, RequestBodySpec, ResponseSpec};
pub use operation::{Method, OperationSpec};
pub use params::{ParamLocation, ParamSpec};

pub(crate) use examples::apply_examples;
