use std::cell::{Ref, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::path::PathBinding;

/// Everything declared for one URL template.
#[derive(Debug, Clone, Default)]
pub struct PathRecord {
    bindings: Vec<Rc<PathBinding>>,
}

impl PathRecord {
    /// Returns the bindings, in registration order.
    #[must_use]
    pub fn bindings(&self) -> &[Rc<PathBinding>] {
        &self.bindings
    }

    /// Returns the first binding, whose path-level metadata wins.
    #[must_use]
    pub fn primary(&self) -> Option<&Rc<PathBinding>> {
        self.bindings.first()
    }
}

/// Registry of URL templates and their bindings.
///
/// This is a handle: clones share the same live data.
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    records: Rc<RefCell<IndexMap<String, PathRecord>>>,
}

impl PathRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when both handles share the same data.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.records, &other.records)
    }

    /// Creates the record of a URL if it does not exist yet.
    pub fn ensure(&self, url: &str) {
        let mut records = self.records.borrow_mut();
        if !records.contains_key(url) {
            records.insert(url.to_string(), PathRecord::default());
        }
    }

    /// Appends a binding to the record of its URL.
    pub fn bind(&self, binding: Rc<PathBinding>) {
        self.records
            .borrow_mut()
            .entry(binding.url().to_string())
            .or_default()
            .bindings
            .push(binding);
    }

    /// Returns a copy of the record of a URL.
    #[must_use]
    pub fn record(&self, url: &str) -> Option<PathRecord> {
        self.records.borrow().get(url).cloned()
    }

    /// Returns a borrow of the live records.
    ///
    /// The borrow must be released before the registry is mutated again.
    #[must_use]
    pub fn records(&self) -> Ref<'_, IndexMap<String, PathRecord>> {
        self.records.borrow()
    }

    /// Returns the registered URLs, in registration order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.records.borrow().keys().cloned().collect()
    }

    /// Returns `true` when no URL is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    /// Removes every record.
    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathDecl;

    #[test]
    fn should_keep_urls_in_registration_order() {
        let registry = PathRegistry::new();

        registry.ensure("/b");
        PathDecl::new("/a")
            .register_in(&registry)
            .expect("should register");
        registry.ensure("/b");

        assert_eq!(registry.urls(), vec!["/b", "/a"]);
        assert!(
            registry
                .record("/b")
                .expect("record")
                .primary()
                .is_none()
        );
    }

    #[test]
    fn should_clear_records() {
        let registry = PathRegistry::new();
        let handle = registry.clone();
        PathDecl::new("/a")
            .register_in(&registry)
            .expect("should register");

        handle.clear();

        assert!(registry.is_empty());
    }
}
