use std::cell::RefCell;
use std::thread::LocalKey;

use super::{ComponentRegistry, PathRegistry};

thread_local! {
    static ACTIVE_COMPONENTS: RefCell<ComponentRegistry> = RefCell::new(ComponentRegistry::new());
    static ACTIVE_PATHS: RefCell<PathRegistry> = RefCell::new(PathRegistry::new());
}

/// A registry that can be installed as the active instance of its kind.
pub trait ScopedRegistry: Clone + 'static {
    /// The slot holding the active instance on the current thread.
    fn slot() -> &'static LocalKey<RefCell<Self>>;

    /// Returns a handle on the active instance.
    #[must_use]
    fn current() -> Self {
        Self::slot().with(|slot| slot.borrow().clone())
    }

    /// Installs this registry until the returned guard is dropped.
    fn enter(&self) -> RegistryScope<Self> {
        RegistryScope::install(self.clone())
    }

    /// Runs `work` with this registry installed.
    fn scoped<T>(&self, work: impl FnOnce() -> T) -> T {
        let _scope = self.enter();
        work()
    }
}

impl ScopedRegistry for ComponentRegistry {
    fn slot() -> &'static LocalKey<RefCell<Self>> {
        &ACTIVE_COMPONENTS
    }
}

impl ScopedRegistry for PathRegistry {
    fn slot() -> &'static LocalKey<RefCell<Self>> {
        &ACTIVE_PATHS
    }
}

/// Guard keeping a registry installed as the active one.
///
/// Dropping the guard restores the registry that was active when it was created,
/// on every exit path including unwinding.
#[must_use = "the previous registry is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct RegistryScope<R: ScopedRegistry> {
    previous: Option<R>,
}

impl<R: ScopedRegistry> RegistryScope<R> {
    fn install(registry: R) -> Self {
        let previous = R::slot().with(|slot| slot.replace(registry));
        Self {
            previous: Some(previous),
        }
    }
}

impl<R: ScopedRegistry> Drop for RegistryScope<R> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            R::slot().with(|slot| {
                slot.replace(previous);
            });
        }
    }
}
