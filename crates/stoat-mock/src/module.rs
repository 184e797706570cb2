//! Module records and the real-loader boundary.
//!
//! A module is a specifier plus a namespace object whose own properties
//! are the exported bindings. The default export is an ordinary binding
//! named `"default"`. The registry talks to the real module graph only
//! through the `ModuleLoader` trait.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

use stoat_value::{Object, ObjectRef, PropertyDescriptor, PropertyKey, Value};

/// Binding name of the default export.
pub const DEFAULT_EXPORT: &str = "default";

/// A module: specifier plus export namespace.
#[derive(Clone, Debug)]
pub struct ModuleRecord {
    specifier: String,
    namespace: ObjectRef,
}

impl ModuleRecord {
    /// Create a record with an empty namespace.
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            namespace: Arc::new(Object::new(None)),
        }
    }

    /// Create a record around an existing namespace object.
    pub fn with_namespace(specifier: impl Into<String>, namespace: ObjectRef) -> Self {
        Self {
            specifier: specifier.into(),
            namespace,
        }
    }

    /// The module specifier.
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// The export namespace.
    pub fn namespace(&self) -> &ObjectRef {
        &self.namespace
    }

    /// Define a named export.
    pub fn define(&self, name: &str, value: Value) {
        let _ = self.namespace.set(PropertyKey::from(name), value);
    }

    /// Define the default export.
    pub fn define_default(&self, value: Value) {
        self.define(DEFAULT_EXPORT, value);
    }

    /// Define an export with an explicit descriptor (accessors,
    /// read-only data).
    pub fn define_with(&self, name: &str, desc: PropertyDescriptor) {
        let _ = self.namespace.define_property(PropertyKey::from(name), desc);
    }
}

/// The real module loader, seen from the registry: given a specifier,
/// produce the actual export bindings.
pub trait ModuleLoader: Send + Sync {
    /// Load a module, or None when the specifier is not in the graph.
    fn load(&self, specifier: &str) -> Option<ModuleRecord>;
}

/// In-memory module graph for tests and embedders.
///
/// Repeated loads of the same specifier return the same namespace
/// object, matching real module-cache semantics.
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: RwLock<FxHashMap<String, ModuleRecord>>,
}

impl StaticModuleLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a module.
    pub fn register(&self, record: ModuleRecord) {
        self.modules
            .write()
            .insert(record.specifier().to_string(), record);
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Check if the loader has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self, specifier: &str) -> Option<ModuleRecord> {
        self.modules.read().get(specifier).cloned()
    }
}
