//! Objects with property descriptors and prototype chains.
//!
//! The mock layer leans on descriptors: spying a getter must leave the
//! sibling flags alone, and auto-mocking a class walks the prototype
//! chain the same way consuming code does. Accessor properties invoke
//! their getter/setter directly on `get`/`set` — there is no interpreter
//! in between.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::value::Value;

/// Shared object handle.
pub type ObjectRef = Arc<Object>;

/// A string property key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyKey(Arc<str>);

impl PropertyKey {
    /// Create a key from a string.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(Arc::from(s.as_ref()))
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Property attributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PropertyAttributes {
    /// Property is writable.
    pub writable: bool,
    /// Property is enumerable.
    pub enumerable: bool,
    /// Property is configurable.
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Default data property attributes.
    pub const fn data() -> Self {
        Self {
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Non-writable, non-enumerable, non-configurable.
    pub const fn frozen() -> Self {
        Self {
            writable: false,
            enumerable: false,
            configurable: false,
        }
    }
}

/// Property descriptor.
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    /// Data property.
    Data {
        /// The value.
        value: Value,
        /// Attributes.
        attributes: PropertyAttributes,
    },
    /// Accessor property.
    Accessor {
        /// Getter function.
        get: Option<Value>,
        /// Setter function.
        set: Option<Value>,
        /// Attributes.
        attributes: PropertyAttributes,
    },
}

impl PropertyDescriptor {
    /// Create a data property with default attributes.
    pub fn data(value: Value) -> Self {
        Self::Data {
            value,
            attributes: PropertyAttributes::data(),
        }
    }

    /// Create a data property with specific attributes.
    pub fn data_with_attrs(value: Value, attributes: PropertyAttributes) -> Self {
        Self::Data { value, attributes }
    }

    /// Create an accessor property.
    pub fn accessor(get: Option<Value>, set: Option<Value>, attributes: PropertyAttributes) -> Self {
        Self::Accessor { get, set, attributes }
    }

    /// Get the value (data properties only).
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Data { value, .. } => Some(value),
            Self::Accessor { .. } => None,
        }
    }

    /// The attributes of either descriptor kind.
    pub fn attributes(&self) -> PropertyAttributes {
        match self {
            Self::Data { attributes, .. } | Self::Accessor { attributes, .. } => *attributes,
        }
    }

    /// Check if a plain write through this descriptor can succeed.
    pub fn is_writable(&self) -> bool {
        match self {
            Self::Data { attributes, .. } => attributes.writable,
            Self::Accessor { set, .. } => set.is_some(),
        }
    }

    /// Check if this is an accessor descriptor.
    pub fn is_accessor(&self) -> bool {
        matches!(self, Self::Accessor { .. })
    }
}

/// Errors raised by property access.
#[derive(Error, Debug)]
pub enum PropertyError {
    /// Write to a non-writable data property.
    #[error("property '{0}' is not writable")]
    ReadOnly(PropertyKey),
    /// Write through an accessor with no setter.
    #[error("property '{0}' has a getter but no setter")]
    GetterOnly(PropertyKey),
    /// New property on a non-extensible object.
    #[error("object is not extensible, cannot add property '{0}'")]
    NotExtensible(PropertyKey),
    /// An accessor function raised.
    #[error("accessor for '{0}' threw: {1:?}")]
    Thrown(PropertyKey, Value),
}

/// An object: a descriptor table plus an optional prototype.
///
/// Thread-safe with interior mutability.
pub struct Object {
    /// Properties storage.
    properties: RwLock<FxHashMap<PropertyKey, PropertyDescriptor>>,
    /// Prototype (None at the end of the chain).
    prototype: RwLock<Option<ObjectRef>>,
    /// Whether new properties may be added.
    extensible: bool,
}

impl Object {
    /// Create a new empty, extensible object.
    pub fn new(prototype: Option<ObjectRef>) -> Self {
        Self {
            properties: RwLock::new(FxHashMap::default()),
            prototype: RwLock::new(prototype),
            extensible: true,
        }
    }

    /// Get a property, walking the prototype chain.
    ///
    /// Accessor properties invoke their getter. `Ok(None)` means the
    /// property does not exist anywhere on the chain.
    pub fn get(&self, key: &PropertyKey) -> Result<Option<Value>, PropertyError> {
        let own = self.properties.read().get(key).cloned();
        if let Some(desc) = own {
            return match desc {
                PropertyDescriptor::Data { value, .. } => Ok(Some(value)),
                PropertyDescriptor::Accessor { get: Some(getter), .. } => {
                    match getter.as_function() {
                        Some(func) => match func.call(&[]) {
                            Ok(v) => Ok(Some(v)),
                            Err(e) => Err(PropertyError::Thrown(key.clone(), e)),
                        },
                        // Non-callable getter slot reads as undefined.
                        None => Ok(Some(Value::undefined())),
                    }
                }
                // Setter-only property reads as undefined.
                PropertyDescriptor::Accessor { get: None, .. } => Ok(Some(Value::undefined())),
            };
        }

        let proto = self.prototype.read().clone();
        match proto {
            Some(p) => p.get(key),
            None => Ok(None),
        }
    }

    /// Set an own property.
    ///
    /// Accessor properties invoke their setter; a get-only accessor and a
    /// non-writable data property both reject the write.
    pub fn set(&self, key: PropertyKey, value: Value) -> Result<(), PropertyError> {
        let existing = self.properties.read().get(&key).cloned();
        match existing {
            Some(PropertyDescriptor::Accessor { set: Some(setter), .. }) => {
                match setter.as_function() {
                    Some(func) => func
                        .call(&[value])
                        .map(|_| ())
                        .map_err(|e| PropertyError::Thrown(key, e)),
                    None => Err(PropertyError::GetterOnly(key)),
                }
            }
            Some(PropertyDescriptor::Accessor { set: None, .. }) => {
                Err(PropertyError::GetterOnly(key))
            }
            Some(PropertyDescriptor::Data { attributes, .. }) => {
                if !attributes.writable {
                    return Err(PropertyError::ReadOnly(key));
                }
                self.properties
                    .write()
                    .insert(key, PropertyDescriptor::data_with_attrs(value, attributes));
                Ok(())
            }
            None => {
                if !self.extensible {
                    return Err(PropertyError::NotExtensible(key));
                }
                self.properties
                    .write()
                    .insert(key, PropertyDescriptor::data(value));
                Ok(())
            }
        }
    }

    /// Define (or redefine) a property with an explicit descriptor.
    pub fn define_property(
        &self,
        key: PropertyKey,
        desc: PropertyDescriptor,
    ) -> Result<(), PropertyError> {
        if !self.extensible && !self.properties.read().contains_key(&key) {
            return Err(PropertyError::NotExtensible(key));
        }
        self.properties.write().insert(key, desc);
        Ok(())
    }

    /// Check for an own property.
    pub fn has_own(&self, key: &PropertyKey) -> bool {
        self.properties.read().contains_key(key)
    }

    /// Check for a property anywhere on the prototype chain.
    pub fn has(&self, key: &PropertyKey) -> bool {
        if self.has_own(key) {
            return true;
        }
        let proto = self.prototype.read().clone();
        match proto {
            Some(p) => p.has(key),
            None => false,
        }
    }

    /// Own property keys, in no particular order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.properties.read().keys().cloned().collect()
    }

    /// Clone of an own property descriptor.
    pub fn own_descriptor(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.read().get(key).cloned()
    }

    /// The prototype, if any.
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.prototype.read().clone()
    }

    /// Replace the prototype.
    pub fn set_prototype(&self, proto: Option<ObjectRef>) {
        *self.prototype.write() = proto;
    }

    /// Check whether `candidate` appears anywhere on this object's
    /// prototype chain.
    pub fn has_in_chain(&self, candidate: &ObjectRef) -> bool {
        let mut current = self.prototype();
        while let Some(p) = current {
            if Arc::ptr_eq(&p, candidate) {
                return true;
            }
            current = p.prototype();
        }
        false
    }
}

impl std::fmt::Debug for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let props = self.properties.read();
        f.debug_struct("Object")
            .field("properties", &props.len())
            .field("has_prototype", &self.prototype.read().is_some())
            .finish()
    }
}
