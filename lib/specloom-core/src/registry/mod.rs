//! Component and path registries.
//!
//! Both registries are cheap handles over shared data. Each kind has an active
//! instance per thread, swapped for the extent of a [`RegistryScope`].

mod components;
mod paths;
mod scope;

pub use components::{ComponentRegistry, Schemas};
pub use paths::{PathRecord, PathRegistry};
pub use scope::{RegistryScope, ScopedRegistry};
