//! The module mock registry.
//!
//! Consulted before the real module graph: a registered override wins,
//! anything else falls back to the loader, and a specifier neither side
//! knows is an `UnresolvedModule` failure. One registry per test file —
//! overrides and call history registered here are invisible to every
//! other registry, even over the same loader.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use stoat_value::{ObjectRef, PropertyDescriptor, PropertyKey, Value};

use crate::automock::{MockLedger, mock_namespace};
use crate::config::RegistryConfig;
use crate::error::{MockError, MockResult};
use crate::mock_fn::MockFn;
use crate::module::ModuleLoader;

/// A registered substitution for one module specifier.
pub enum MockOverride {
    /// Explicit replacement namespace from a factory, used verbatim.
    Factory(ObjectRef),
    /// Auto-mock directive; the namespace is synthesized on first
    /// resolve.
    Auto(Option<ObjectRef>),
}

/// Intercepts module resolution and substitutes mocks.
pub struct MockRegistry {
    loader: Arc<dyn ModuleLoader>,
    config: RegistryConfig,
    overrides: DashMap<String, MockOverride>,
    originals: DashMap<String, ObjectRef>,
    ledger: Mutex<MockLedger>,
}

impl MockRegistry {
    /// Create a registry over a loader with default configuration.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self::with_config(loader, RegistryConfig::default())
    }

    /// Create a registry with explicit configuration.
    pub fn with_config(loader: Arc<dyn ModuleLoader>, config: RegistryConfig) -> Self {
        Self {
            loader,
            config,
            overrides: DashMap::new(),
            originals: DashMap::new(),
            ledger: Mutex::new(MockLedger::new()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register an auto-mock for a specifier: every function export is
    /// replaced by a tracked stand-in on first resolve.
    pub fn register_mock(&self, specifier: &str) {
        debug!("registered auto mock for '{}'", specifier);
        self.overrides
            .insert(specifier.to_string(), MockOverride::Auto(None));
    }

    /// Register a factory mock: the factory's namespace is substituted
    /// verbatim. Works for virtual specifiers absent from the real
    /// graph.
    pub fn register_mock_with(&self, specifier: &str, factory: impl FnOnce() -> ObjectRef) {
        debug!("registered factory mock for '{}'", specifier);
        self.overrides
            .insert(specifier.to_string(), MockOverride::Factory(factory()));
    }

    /// Check whether a specifier currently has an override.
    pub fn is_mocked(&self, specifier: &str) -> bool {
        self.overrides.contains_key(specifier)
    }

    /// Resolve a specifier to its namespace: the mock when an override
    /// is registered, the real module otherwise.
    pub fn resolve(&self, specifier: &str) -> MockResult<ObjectRef> {
        if let Some(mut entry) = self.overrides.get_mut(specifier) {
            match entry.value_mut() {
                MockOverride::Factory(ns) => return Ok(ns.clone()),
                MockOverride::Auto(Some(ns)) => return Ok(ns.clone()),
                MockOverride::Auto(slot) => {
                    let original = self.load_original(specifier).ok_or_else(|| {
                        MockError::UnresolvedModule {
                            specifier: specifier.to_string(),
                        }
                    })?;
                    let mocked = {
                        let mut ledger = self.ledger.lock();
                        mock_namespace(&original, &self.config, &mut ledger)
                    };
                    debug!("synthesized auto mock for '{}'", specifier);
                    *slot = Some(mocked.clone());
                    return Ok(mocked);
                }
            }
        }

        self.load_original(specifier)
            .ok_or_else(|| MockError::UnresolvedModule {
                specifier: specifier.to_string(),
            })
    }

    /// Drop the override for one specifier, restoring original
    /// bindings. A specifier with no active mock is a no-op.
    pub fn reset(&self, specifier: &str) {
        if self.overrides.remove(specifier).is_some() {
            debug!("reset mock for '{}'", specifier);
        }
    }

    /// Drop every override and all mock bookkeeping.
    pub fn reset_all(&self) {
        self.overrides.clear();
        self.ledger.lock().clear();
        debug!("reset all mocks");
    }

    /// Look up the `MockFn` handle behind a mocked function value.
    pub fn handle_of(&self, value: &Value) -> Option<MockFn> {
        let func = value.as_function()?;
        self.ledger.lock().handle_for(func)
    }

    /// Resolve a specifier and fetch the handle for a function export.
    pub fn mock_fn(&self, specifier: &str, name: &str) -> MockResult<MockFn> {
        let value = self.get_export(specifier, name)?;
        if !value.is_function() {
            return Err(MockError::NotCallable {
                property: name.to_string(),
            });
        }
        self.handle_of(&value).ok_or_else(|| MockError::NotMocked {
            name: name.to_string(),
        })
    }

    /// Handle for the getter spy of a mocked accessor export.
    pub fn mock_getter(&self, specifier: &str, name: &str) -> MockResult<MockFn> {
        self.accessor_handle(specifier, name, AccessorSide::Get)
    }

    /// Handle for the setter spy of a mocked accessor export.
    pub fn mock_setter(&self, specifier: &str, name: &str) -> MockResult<MockFn> {
        self.accessor_handle(specifier, name, AccessorSide::Set)
    }

    /// Read an export off the resolved namespace.
    pub fn get_export(&self, specifier: &str, name: &str) -> MockResult<Value> {
        let ns = self.resolve(specifier)?;
        let key = PropertyKey::from(name);
        ns.get(&key)?
            .ok_or_else(|| MockError::no_such_export(specifier, &key))
    }

    /// Write an export on the resolved namespace. Fails with
    /// `ImmutableProperty` for get-only and read-only bindings.
    pub fn set_export(&self, specifier: &str, name: &str, value: Value) -> MockResult<()> {
        let ns = self.resolve(specifier)?;
        ns.set(PropertyKey::from(name), value)?;
        Ok(())
    }

    fn accessor_handle(
        &self,
        specifier: &str,
        name: &str,
        side: AccessorSide,
    ) -> MockResult<MockFn> {
        let ns = self.resolve(specifier)?;
        let key = PropertyKey::from(name);
        let desc = ns
            .own_descriptor(&key)
            .ok_or_else(|| MockError::no_such_export(specifier, &key))?;

        let PropertyDescriptor::Accessor { get, set, .. } = desc else {
            return Err(MockError::NotCallable {
                property: name.to_string(),
            });
        };

        let accessor = match side {
            AccessorSide::Get => get,
            AccessorSide::Set => set,
        };
        let accessor = accessor.ok_or_else(|| MockError::ImmutableProperty {
            property: name.to_string(),
        })?;

        self.handle_of(&accessor).ok_or_else(|| MockError::NotMocked {
            name: name.to_string(),
        })
    }

    fn load_original(&self, specifier: &str) -> Option<ObjectRef> {
        if let Some(ns) = self.originals.get(specifier) {
            return Some(ns.clone());
        }
        let record = self.loader.load(specifier)?;
        let ns = record.namespace().clone();
        self.originals.insert(specifier.to_string(), ns.clone());
        Some(ns)
    }
}

enum AccessorSide {
    Get,
    Set,
}

impl std::fmt::Debug for MockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRegistry")
            .field("overrides", &self.overrides.len())
            .field("cached_originals", &self.originals.len())
            .finish()
    }
}
