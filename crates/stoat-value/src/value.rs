//! The `Value` handle.
//!
//! A `Value` is a cheap clone: primitives are inline, everything else is
//! an `Arc`. Cloning a value never deep-copies an object — call records
//! that need an argument *snapshot* rely on objects being effectively
//! frozen from the test's perspective, which matches how the mock layer
//! uses them.

use std::sync::Arc;

use crate::function::{FunctionRef, JsFunction};
use crate::object::{Object, ObjectRef, PropertyDescriptor};
use crate::promise::Promise;

/// A dynamically-typed value.
///
/// This type is `Send + Sync`: all heap-allocated payloads are behind
/// `Arc` and use interior locking.
#[derive(Clone)]
pub enum Value {
    /// The undefined value.
    Undefined,
    /// The null value.
    Null,
    /// Boolean.
    Bool(bool),
    /// IEEE 754 double.
    Number(f64),
    /// Immutable string.
    String(Arc<str>),
    /// Object reference.
    Object(ObjectRef),
    /// Callable function reference.
    Function(FunctionRef),
    /// Promise reference.
    Promise(Arc<Promise>),
}

impl Value {
    /// The undefined value.
    pub fn undefined() -> Self {
        Self::Undefined
    }

    /// The null value.
    pub fn null() -> Self {
        Self::Null
    }

    /// Create a boolean value.
    pub fn boolean(b: bool) -> Self {
        Self::Bool(b)
    }

    /// Create a number value.
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create a string value.
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    /// Create an object value.
    pub fn object(obj: ObjectRef) -> Self {
        Self::Object(obj)
    }

    /// Create a function value.
    pub fn function(f: FunctionRef) -> Self {
        Self::Function(f)
    }

    /// Create a promise value.
    pub fn promise(p: Arc<Promise>) -> Self {
        Self::Promise(p)
    }

    /// Check for undefined.
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Check for null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check for a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    /// Get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as object reference.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Get as function reference.
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Self::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Get as promise reference.
    pub fn as_promise(&self) -> Option<&Arc<Promise>> {
        match self {
            Self::Promise(p) => Some(p),
            _ => None,
        }
    }

    /// Type name for diagnostics ("undefined", "number", "function", ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Promise(_) => "promise",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(Arc::from(s.as_str()))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Self::Object(o)
    }
}

impl From<FunctionRef> for Value {
    fn from(f: FunctionRef) -> Self {
        Self::Function(f)
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{:?}", s),
            Self::Object(o) => write!(f, "{:?}", o),
            Self::Function(func) => write!(f, "[Function: {}]", func.name()),
            Self::Promise(p) => write!(f, "{:?}", p),
        }
    }
}

/// Identity comparison: true when both values are the *same* heap entity
/// (or the same primitive).
///
/// This is the equality the re-export invariant is stated in: two export
/// names that aliased one function before mocking must alias one mock
/// function after.
pub fn same_ref(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Object(x), Value::Object(y)) => Arc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Arc::ptr_eq(x, y),
        (Value::Promise(x), Value::Promise(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}

/// Structural (deep) equality.
///
/// Primitives compare by value (`NaN != NaN`, per IEEE). Strings compare
/// by content. Objects compare by their own data properties, recursively;
/// accessor properties compare by getter/setter identity. Functions and
/// promises compare by identity.
pub fn deep_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Function(x), Value::Function(y)) => Arc::ptr_eq(x, y),
        (Value::Promise(x), Value::Promise(y)) => Arc::ptr_eq(x, y),
        (Value::Object(x), Value::Object(y)) => {
            Arc::ptr_eq(x, y) || objects_deep_equal(x, y)
        }
        _ => false,
    }
}

fn objects_deep_equal(a: &Object, b: &Object) -> bool {
    let mut a_keys = a.own_keys();
    let mut b_keys = b.own_keys();
    if a_keys.len() != b_keys.len() {
        return false;
    }
    a_keys.sort();
    b_keys.sort();
    if a_keys != b_keys {
        return false;
    }

    for key in &a_keys {
        let (da, db) = match (a.own_descriptor(key), b.own_descriptor(key)) {
            (Some(da), Some(db)) => (da, db),
            _ => return false,
        };
        match (&da, &db) {
            (
                PropertyDescriptor::Data { value: va, .. },
                PropertyDescriptor::Data { value: vb, .. },
            ) => {
                if !deep_equals(va, vb) {
                    return false;
                }
            }
            (
                PropertyDescriptor::Accessor { get: ga, set: sa, .. },
                PropertyDescriptor::Accessor { get: gb, set: sb, .. },
            ) => {
                let getters = match (ga, gb) {
                    (Some(x), Some(y)) => same_ref(x, y),
                    (None, None) => true,
                    _ => false,
                };
                let setters = match (sa, sb) {
                    (Some(x), Some(y)) => same_ref(x, y),
                    (None, None) => true,
                    _ => false,
                };
                if !getters || !setters {
                    return false;
                }
            }
            _ => return false,
        }
    }

    true
}

/// Convenience constructor for an empty object value.
pub fn empty_object() -> Value {
    Value::Object(Arc::new(Object::new(None)))
}

/// Convenience constructor for a function value from a name and closure.
pub fn native_fn(
    name: &str,
    f: impl Fn(&[Value]) -> Result<Value, Value> + Send + Sync + 'static,
) -> Value {
    Value::Function(Arc::new(JsFunction::new(name, Arc::new(f))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::PropertyKey;

    #[test]
    fn test_primitives() {
        assert!(Value::undefined().is_undefined());
        assert!(Value::null().is_null());
        assert_eq!(Value::number(4.0).as_number(), Some(4.0));
        assert_eq!(Value::string("hi").as_str(), Some("hi"));
        assert_eq!(Value::boolean(true).as_bool(), Some(true));
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::undefined().type_name(), "undefined");
        assert_eq!(Value::number(1.0).type_name(), "number");
        assert_eq!(empty_object().type_name(), "object");
        assert_eq!(native_fn("f", |_| Ok(Value::undefined())).type_name(), "function");
    }

    #[test]
    fn test_same_ref_objects() {
        let a = Arc::new(Object::new(None));
        let v1 = Value::object(a.clone());
        let v2 = Value::object(a);
        let v3 = empty_object();

        assert!(same_ref(&v1, &v2));
        assert!(!same_ref(&v1, &v3));
    }

    #[test]
    fn test_deep_equals_primitives() {
        assert!(deep_equals(&Value::number(1.5), &Value::number(1.5)));
        assert!(!deep_equals(&Value::number(f64::NAN), &Value::number(f64::NAN)));
        assert!(deep_equals(&Value::string("a"), &Value::string("a")));
        assert!(!deep_equals(&Value::string("a"), &Value::number(1.0)));
    }

    #[test]
    fn test_deep_equals_objects() {
        let a = Arc::new(Object::new(None));
        a.set(PropertyKey::from("x"), Value::number(1.0)).unwrap();
        a.set(PropertyKey::from("y"), Value::string("z")).unwrap();

        let b = Arc::new(Object::new(None));
        b.set(PropertyKey::from("y"), Value::string("z")).unwrap();
        b.set(PropertyKey::from("x"), Value::number(1.0)).unwrap();

        assert!(deep_equals(&Value::object(a.clone()), &Value::object(b.clone())));

        b.set(PropertyKey::from("x"), Value::number(2.0)).unwrap();
        assert!(!deep_equals(&Value::object(a), &Value::object(b)));
    }

    #[test]
    fn test_deep_equals_nested() {
        let inner_a = Arc::new(Object::new(None));
        inner_a.set(PropertyKey::from("n"), Value::number(7.0)).unwrap();
        let outer_a = Arc::new(Object::new(None));
        outer_a.set(PropertyKey::from("inner"), Value::object(inner_a)).unwrap();

        let inner_b = Arc::new(Object::new(None));
        inner_b.set(PropertyKey::from("n"), Value::number(7.0)).unwrap();
        let outer_b = Arc::new(Object::new(None));
        outer_b.set(PropertyKey::from("inner"), Value::object(inner_b)).unwrap();

        assert!(deep_equals(&Value::object(outer_a), &Value::object(outer_b)));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = native_fn("f", |_| Ok(Value::undefined()));
        let g = native_fn("f", |_| Ok(Value::undefined()));

        assert!(deep_equals(&f, &f.clone()));
        assert!(!deep_equals(&f, &g));
    }

    #[test]
    fn test_value_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Value>();
    }
}
