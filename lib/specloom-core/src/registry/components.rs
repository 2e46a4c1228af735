use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;
use utoipa::openapi::{Components, RefOr, Schema};

use crate::error::DeclarationError;
use crate::schema::{DeclaredType, RefTarget, TypeKey};

/// Component schemas, keyed by name in registration order.
pub type Schemas = IndexMap<String, RefOr<Schema>>;

#[derive(Debug, Default)]
struct ComponentsState {
    schemas: Schemas,
    names: HashMap<TypeKey, String>,
    sources: HashMap<String, PathBuf>,
}

/// Registry of named schema components.
///
/// This is a handle: clones share the same live data.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    state: Rc<RefCell<ComponentsState>>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when both handles share the same data.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Assigns a component name to a type and returns it.
    ///
    /// The first assignment wins: registering the type again returns the name
    /// assigned the first time. Without `name`, the type identifier is used.
    pub fn register_type(&self, ty: &DeclaredType, name: Option<&str>) -> String {
        let mut state = self.state.borrow_mut();
        let assigned = state
            .names
            .entry(ty.key())
            .or_insert_with(|| name.unwrap_or(ty.ident()).to_string());
        assigned.clone()
    }

    /// Returns the name assigned to a type, if any.
    #[must_use]
    pub fn registered_name(&self, ty: &DeclaredType) -> Option<String> {
        self.state.borrow().names.get(&ty.key()).cloned()
    }

    /// Stores the schema of a component.
    ///
    /// # Errors
    ///
    /// Fails with [`DeclarationError::AmbiguousComponentName`] when the name is
    /// already bound to a different schema. Storing an identical schema again is
    /// accepted.
    pub fn put_schema(
        &self,
        name: impl Into<String>,
        schema: RefOr<Schema>,
    ) -> Result<(), DeclarationError> {
        let name = name.into();
        let mut state = self.state.borrow_mut();
        check_available(&state.schemas, &name, &schema)?;
        state.schemas.insert(name, schema);
        Ok(())
    }

    /// Registers a type and its schema in one step.
    ///
    /// Nothing is mutated when the schema conflicts with an existing component.
    pub(crate) fn register_component(
        &self,
        ty: &DeclaredType,
        name: Option<&str>,
        schema: RefOr<Schema>,
        source: Option<PathBuf>,
    ) -> Result<String, DeclarationError> {
        let mut state = self.state.borrow_mut();
        let assigned = match state.names.get(&ty.key()) {
            Some(existing) => {
                if let Some(requested) = name.filter(|requested| *requested != existing.as_str()) {
                    debug!(%existing, %requested, "type already registered, keeping its first name");
                }
                existing.clone()
            }
            None => name.unwrap_or(ty.ident()).to_string(),
        };
        check_available(&state.schemas, &assigned, &schema)?;

        state.names.insert(ty.key(), assigned.clone());
        state.schemas.insert(assigned.clone(), schema);
        if let Some(source) = source {
            state.sources.insert(assigned.clone(), source);
        }
        Ok(assigned)
    }

    /// Returns a borrow of the live schema mapping.
    ///
    /// The borrow must be released before the registry is mutated again.
    #[must_use]
    pub fn schemas(&self) -> Ref<'_, Schemas> {
        Ref::map(self.state.borrow(), |state| &state.schemas)
    }

    /// Returns a copy of a component schema.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<RefOr<Schema>> {
        self.state.borrow().schemas.get(name).cloned()
    }

    /// Returns `true` when a component with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.state.borrow().schemas.contains_key(name)
    }

    /// Resolves a reference target to a component name.
    ///
    /// Names pass through unchanged. A type resolves to its registered name, or to
    /// its identifier when not registered yet, which allows forward references.
    ///
    /// # Errors
    ///
    /// Fails with [`DeclarationError::InvalidReferenceKind`] for any other target.
    pub fn resolve_name(&self, target: &RefTarget) -> Result<String, DeclarationError> {
        match target {
            RefTarget::Name(name) => Ok(name.clone()),
            RefTarget::Type(ty) => Ok(self
                .registered_name(ty)
                .unwrap_or_else(|| ty.ident().to_string())),
            RefTarget::Other(value) => Err(DeclarationError::InvalidReferenceKind {
                value: value.clone(),
            }),
        }
    }

    /// Records where a component was declared.
    pub fn set_source(&self, name: impl Into<String>, source: impl Into<PathBuf>) {
        self.state
            .borrow_mut()
            .sources
            .insert(name.into(), source.into());
    }

    /// Returns where a component was declared, if known.
    #[must_use]
    pub fn source(&self, name: &str) -> Option<PathBuf> {
        self.state.borrow().sources.get(name).cloned()
    }

    /// Returns the declared source of every component that has one.
    #[must_use]
    pub fn sources(&self) -> HashMap<String, PathBuf> {
        self.state.borrow().sources.clone()
    }

    /// Builds the `components` section from the current content.
    #[must_use]
    pub fn to_components(&self) -> Components {
        let mut components = Components::new();
        for (name, schema) in self.schemas().iter() {
            components.schemas.insert(name.clone(), schema.clone());
        }
        components
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        state.schemas.clear();
        state.names.clear();
        state.sources.clear();
    }
}

fn check_available(
    schemas: &Schemas,
    name: &str,
    schema: &RefOr<Schema>,
) -> Result<(), DeclarationError> {
    match schemas.get(name) {
        Some(existing) if existing != schema => Err(DeclarationError::AmbiguousComponentName {
            name: name.to_string(),
        }),
        _ => Ok(()),
    }
}
