//! Spying on methods and accessors in place.
//!
//! A spy wraps what a descriptor already holds — method, getter, or
//! setter — without disturbing the sibling descriptor flags, records
//! every invocation, and by default delegates to the original so
//! behavior is unchanged until a replacement is installed.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use stoat_value::{ObjectRef, PropertyDescriptor, PropertyKey, Value};

use crate::config::RegistryConfig;
use crate::error::{MockError, MockResult};
use crate::mock_fn::MockFn;

/// Which slot of the property to spy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpyKind {
    /// A method (function-valued data property).
    Call,
    /// The getter of an accessor property.
    Get,
    /// The setter of an accessor property.
    Set,
}

struct SpyInner {
    mock: MockFn,
    target: ObjectRef,
    key: PropertyKey,
    saved: PropertyDescriptor,
    restored: AtomicBool,
}

/// Handle to an installed spy: exposes the mock and can reinstate the
/// original descriptor.
#[derive(Clone)]
pub struct SpyHandle {
    inner: Arc<SpyInner>,
}

impl SpyHandle {
    /// The tracked mock behind the spy.
    pub fn mock(&self) -> &MockFn {
        &self.inner.mock
    }

    /// Put the original descriptor back. Restoring twice is a no-op.
    pub fn restore(&self) {
        if self.inner.restored.swap(true, Ordering::SeqCst) {
            return;
        }
        let _ = self
            .inner
            .target
            .define_property(self.inner.key.clone(), self.inner.saved.clone());
        debug!("restored spy on '{}'", self.inner.key);
    }

    /// Whether the spy has been restored.
    pub fn is_restored(&self) -> bool {
        self.inner.restored.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for SpyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpyHandle")
            .field("key", &self.inner.key.to_string())
            .field("restored", &self.is_restored())
            .finish()
    }
}

/// Installs spies and tears them down between tests.
pub struct SpyTracker {
    call_through: bool,
    active: Mutex<Vec<SpyHandle>>,
}

impl SpyTracker {
    /// Create a tracker whose spies delegate to the original.
    pub fn new() -> Self {
        Self {
            call_through: true,
            active: Mutex::new(Vec::new()),
        }
    }

    /// Create a tracker honoring the registry configuration.
    pub fn with_config(config: &RegistryConfig) -> Self {
        Self {
            call_through: config.spies_call_through,
            active: Mutex::new(Vec::new()),
        }
    }

    /// Wrap a property of `target` in a tracked spy.
    ///
    /// `SpyKind::Call` expects a function-valued data property,
    /// `SpyKind::Get`/`SpyKind::Set` expect an accessor. Spying the
    /// setter of a get-only property fails with `ImmutableProperty`.
    pub fn spy_on(
        &self,
        target: &ObjectRef,
        property: &str,
        kind: SpyKind,
    ) -> MockResult<SpyHandle> {
        let key = PropertyKey::from(property);
        let saved = target
            .own_descriptor(&key)
            .ok_or_else(|| MockError::NoSuchProperty {
                property: property.to_string(),
            })?;

        let mock = match (kind, &saved) {
            (SpyKind::Call, PropertyDescriptor::Data { value, attributes }) => {
                let func = value.as_function().ok_or_else(|| MockError::NotCallable {
                    property: property.to_string(),
                })?;
                let mock = MockFn::spying_on(func, self.call_through);
                target.define_property(
                    key.clone(),
                    PropertyDescriptor::data_with_attrs(
                        Value::function(mock.as_function()),
                        *attributes,
                    ),
                )?;
                mock
            }
            (SpyKind::Get, PropertyDescriptor::Accessor { get, set, attributes }) => {
                let getter = get
                    .as_ref()
                    .and_then(|g| g.as_function())
                    .ok_or_else(|| MockError::NotCallable {
                        property: property.to_string(),
                    })?;
                let mock = MockFn::spying_on(getter, self.call_through);
                target.define_property(
                    key.clone(),
                    PropertyDescriptor::accessor(
                        Some(Value::function(mock.as_function())),
                        set.clone(),
                        *attributes,
                    ),
                )?;
                mock
            }
            (SpyKind::Set, PropertyDescriptor::Accessor { get, set, attributes }) => {
                let setter = set
                    .as_ref()
                    .and_then(|s| s.as_function())
                    .ok_or_else(|| MockError::ImmutableProperty {
                        property: property.to_string(),
                    })?;
                let mock = MockFn::spying_on(setter, self.call_through);
                target.define_property(
                    key.clone(),
                    PropertyDescriptor::accessor(
                        get.clone(),
                        Some(Value::function(mock.as_function())),
                        *attributes,
                    ),
                )?;
                mock
            }
            _ => {
                return Err(MockError::NotCallable {
                    property: property.to_string(),
                });
            }
        };

        debug!("installed {:?} spy on '{}'", kind, property);
        let handle = SpyHandle {
            inner: Arc::new(SpyInner {
                mock,
                target: target.clone(),
                key,
                saved,
                restored: AtomicBool::new(false),
            }),
        };
        self.active.lock().push(handle.clone());
        Ok(handle)
    }

    /// Restore every spy this tracker installed.
    pub fn restore_all(&self) {
        for spy in self.active.lock().drain(..) {
            spy.restore();
        }
    }

    /// Clear call history on every active spy, keeping them installed.
    pub fn clear_all_calls(&self) {
        for spy in self.active.lock().iter() {
            spy.mock().clear_calls();
        }
    }
}

impl Default for SpyTracker {
    fn default() -> Self {
        Self::new()
    }
}
