//! Typed per-pipeline value store.
//!
//! Values registered at construction time (options objects, shared state)
//! are looked up later by their type. Absence is a valid state, not an
//! error: resolvers fall back to defaults when nothing was registered.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// A type-keyed map of values shared by all invocations of one pipeline.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.entries.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Look up a previously registered value by type.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Whether a value of type `T` has been registered.
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Settings {
        name: &'static str,
    }

    #[test]
    fn lookup_returns_registered_value() {
        let mut registry = Registry::new();
        registry.insert(Settings { name: "configured" });

        let settings = registry.get::<Settings>().unwrap();
        assert_eq!(settings.name, "configured");
        assert!(registry.contains::<Settings>());
    }

    #[test]
    fn absence_is_a_valid_state() {
        let registry = Registry::new();
        assert!(registry.get::<Settings>().is_none());
        assert!(!registry.contains::<Settings>());
    }

    #[test]
    fn insert_replaces_same_type() {
        let mut registry = Registry::new();
        registry.insert(Settings { name: "first" });
        registry.insert(Settings { name: "second" });

        assert_eq!(registry.get::<Settings>().unwrap().name, "second");
    }
}
