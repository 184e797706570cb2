//! Callable function objects.
//!
//! Functions carry a name, an async flag, a call strategy, an optional
//! constructor prototype, and an own-property table for statics. The
//! call strategy is fixed at construction; replacing behavior is the
//! mock layer's job and happens by swapping the function installed in a
//! descriptor, never by mutating a live function.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::object::{Object, ObjectRef, PropertyDescriptor, PropertyError, PropertyKey};
use crate::value::Value;

/// Native call strategy.
///
/// `Err` carries a thrown value, mirroring how the mocked system throws
/// arbitrary values rather than typed errors.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> Result<Value, Value> + Send + Sync>;

/// Shared function handle.
pub type FunctionRef = Arc<JsFunction>;

/// A named callable.
pub struct JsFunction {
    /// Function name (for diagnostics and mock reports).
    name: String,
    /// Whether calls settle asynchronously in the source system.
    is_async: bool,
    /// Call strategy.
    call: NativeFn,
    /// Constructor prototype object (present for classes).
    prototype: RwLock<Option<ObjectRef>>,
    /// Own properties (statics).
    statics: ObjectRef,
}

impl JsFunction {
    /// Create a plain function.
    pub fn new(name: impl Into<String>, call: NativeFn) -> Self {
        Self {
            name: name.into(),
            is_async: false,
            call,
            prototype: RwLock::new(None),
            statics: Arc::new(Object::new(None)),
        }
    }

    /// Create an async function.
    pub fn new_async(name: impl Into<String>, call: NativeFn) -> Self {
        Self {
            is_async: true,
            ..Self::new(name, call)
        }
    }

    /// Create a constructor function with a prototype object.
    pub fn constructor(name: impl Into<String>, call: NativeFn, prototype: ObjectRef) -> Self {
        let f = Self::new(name, call);
        *f.prototype.write() = Some(prototype);
        f
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, Value> {
        (self.call)(args)
    }

    /// Function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this function is async.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Constructor prototype, if any.
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.read().clone()
    }

    /// Attach or replace the constructor prototype.
    pub fn set_prototype(&self, proto: Option<ObjectRef>) {
        *self.prototype.write() = proto;
    }

    /// Whether this function looks like a class (has a prototype object).
    pub fn is_constructor(&self) -> bool {
        self.prototype.read().is_some()
    }

    /// Own-property (statics) table.
    pub fn statics(&self) -> &ObjectRef {
        &self.statics
    }

    /// Get a static property.
    pub fn get_static(&self, key: &PropertyKey) -> Result<Option<Value>, PropertyError> {
        self.statics.get(key)
    }

    /// Define a static property.
    pub fn define_static(
        &self,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<(), PropertyError> {
        self.statics.define_property(key, desc)
    }
}

impl std::fmt::Debug for JsFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsFunction")
            .field("name", &self.name)
            .field("is_async", &self.is_async)
            .field("is_constructor", &self.is_constructor())
            .finish()
    }
}
