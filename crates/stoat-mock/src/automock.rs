//! Auto-mock synthesis.
//!
//! Given an original export namespace, build a replacement in which
//! every function-valued binding is a tracked mock, classes keep their
//! prototype shape (methods mocked, data preserved, `constructor`
//! pointing back at the mock wrapper), accessors are wrapped in spies
//! that keep the original semantics, and data bindings pass through.
//!
//! The original namespace and the original prototype objects are never
//! mutated; consuming code holding the real module keeps seeing the
//! real module.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use stoat_value::{
    FunctionRef, Object, ObjectRef, PropertyAttributes, PropertyDescriptor, PropertyKey, Value,
};

use crate::config::RegistryConfig;
use crate::mock_fn::MockFn;

/// Bookkeeping shared across all auto-mocks of one registry.
///
/// `memo` maps original function identity to its mock, so aliased
/// bindings (default + named re-export of the same function) mock once
/// and stay reference-equal. `handles` maps mocked function identity to
/// the `MockFn` handle used to configure and interrogate it.
#[derive(Default)]
pub(crate) struct MockLedger {
    memo: FxHashMap<usize, FunctionRef>,
    handles: FxHashMap<usize, MockFn>,
}

impl MockLedger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Look up the handle behind a mocked function.
    pub(crate) fn handle_for(&self, func: &FunctionRef) -> Option<MockFn> {
        self.handles.get(&fn_key(func)).cloned()
    }

    pub(crate) fn clear(&mut self) {
        self.memo.clear();
        self.handles.clear();
    }

    fn remember(&mut self, mocked: &FunctionRef, handle: MockFn) {
        self.handles.insert(fn_key(mocked), handle);
    }
}

fn fn_key(func: &FunctionRef) -> usize {
    Arc::as_ptr(func) as usize
}

/// Build the auto-mocked replacement for a namespace.
pub(crate) fn mock_namespace(
    original: &ObjectRef,
    config: &RegistryConfig,
    ledger: &mut MockLedger,
) -> ObjectRef {
    let mocked = Arc::new(Object::new(original.prototype()));

    let mut keys = original.own_keys();
    keys.sort();
    for key in keys {
        if let Some(desc) = original.own_descriptor(&key) {
            let replacement = mock_descriptor(desc, config.preserve_data_exports, ledger);
            let _ = mocked.define_property(key, replacement);
        }
    }

    mocked
}

/// Mock one descriptor: functions become tracked mocks, accessors get
/// spy-wrapped, data passes through (or is dropped to undefined when
/// `preserve_data` is off).
fn mock_descriptor(
    desc: PropertyDescriptor,
    preserve_data: bool,
    ledger: &mut MockLedger,
) -> PropertyDescriptor {
    match desc {
        PropertyDescriptor::Data { value, attributes } => {
            let replacement = match value {
                Value::Function(f) => Value::function(mock_function(&f, ledger)),
                other if preserve_data => other,
                _ => Value::undefined(),
            };
            PropertyDescriptor::data_with_attrs(replacement, attributes)
        }
        PropertyDescriptor::Accessor { get, set, attributes } => PropertyDescriptor::accessor(
            get.map(|g| wrap_accessor(&g, ledger)),
            set.map(|s| wrap_accessor(&s, ledger)),
            attributes,
        ),
    }
}

/// Mock a function binding, memoized on the original's identity.
///
/// Classes (functions with a prototype object) get a cloned prototype:
/// methods replaced by mocks, non-function data preserved with its
/// descriptor, `constructor` referencing the mock wrapper. Statics are
/// carried the same way, one level up.
pub(crate) fn mock_function(original: &FunctionRef, ledger: &mut MockLedger) -> FunctionRef {
    if let Some(existing) = ledger.memo.get(&fn_key(original)) {
        return existing.clone();
    }

    let handle = MockFn::mirroring(original);
    let mocked = handle.as_function();

    if let Some(proto) = original.prototype() {
        let mocked_proto = mock_prototype(&proto, &mocked, ledger);
        mocked.set_prototype(Some(mocked_proto));
    }

    let mut static_keys = original.statics().own_keys();
    static_keys.sort();
    for key in static_keys {
        if let Some(desc) = original.statics().own_descriptor(&key) {
            let replacement = mock_descriptor(desc, true, ledger);
            let _ = mocked.define_static(key, replacement);
        }
    }

    ledger.memo.insert(fn_key(original), mocked.clone());
    ledger.remember(&mocked, handle);
    mocked
}

/// Clone a class prototype with its methods mocked.
///
/// The chain above the prototype is kept as-is, so descriptor
/// introspection walks the same parents it did before mocking.
fn mock_prototype(
    proto: &ObjectRef,
    constructor: &FunctionRef,
    ledger: &mut MockLedger,
) -> ObjectRef {
    let cloned = Arc::new(Object::new(proto.prototype()));

    let mut keys = proto.own_keys();
    keys.sort();
    let constructor_key = PropertyKey::from("constructor");

    for key in keys {
        let Some(desc) = proto.own_descriptor(&key) else {
            continue;
        };
        if key == constructor_key {
            let _ = cloned.define_property(
                key,
                PropertyDescriptor::data_with_attrs(
                    Value::function(constructor.clone()),
                    desc.attributes(),
                ),
            );
        } else {
            let replacement = mock_descriptor(desc, true, ledger);
            let _ = cloned.define_property(key, replacement);
        }
    }

    // Classes always expose a constructor binding, even if the original
    // prototype was built without one.
    if !cloned.has_own(&constructor_key) {
        let _ = cloned.define_property(
            constructor_key,
            PropertyDescriptor::data_with_attrs(
                Value::function(constructor.clone()),
                PropertyAttributes {
                    writable: true,
                    enumerable: false,
                    configurable: true,
                },
            ),
        );
    }

    cloned
}

/// Wrap an accessor function in a call-through spy.
fn wrap_accessor(value: &Value, ledger: &mut MockLedger) -> Value {
    match value.as_function() {
        Some(func) => {
            let handle = MockFn::spying_on(func, true);
            let mocked = handle.as_function();
            ledger.remember(&mocked, handle);
            Value::function(mocked)
        }
        None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use stoat_value::{JsFunction, NativeFn, native_fn, same_ref};

    fn config() -> RegistryConfig {
        RegistryConfig::default()
    }

    fn make_class(name: &str) -> FunctionRef {
        let proto = Arc::new(Object::new(None));
        proto
            .set(
                PropertyKey::from("greet"),
                native_fn("greet", |_| Ok(Value::string("hello"))),
            )
            .unwrap();
        proto
            .set(PropertyKey::from("species"), Value::string("mustelid"))
            .unwrap();

        let call: NativeFn = Arc::new(|_: &[Value]| Ok(Value::undefined()));
        let ctor = Arc::new(JsFunction::constructor(name, call, proto.clone()));
        proto
            .set(
                PropertyKey::from("constructor"),
                Value::function(ctor.clone()),
            )
            .unwrap();
        ctor
    }

    #[test]
    fn test_function_export_becomes_mock() {
        let ns = Arc::new(Object::new(None));
        ns.set(
            PropertyKey::from("add"),
            native_fn("add", |_| Ok(Value::number(3.0))),
        )
        .unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &config(), &mut ledger);

        let add = mocked.get(&PropertyKey::from("add")).unwrap().unwrap();
        let func = add.as_function().unwrap();
        // Mock returns undefined, not the original 3.0
        assert!(func.call(&[]).unwrap().is_undefined());

        let handle = ledger.handle_for(func).unwrap();
        assert_eq!(handle.call_count(), 1);
    }

    #[test]
    fn test_data_export_preserved() {
        let ns = Arc::new(Object::new(None));
        ns.set(PropertyKey::from("version"), Value::string("2.0")).unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &config(), &mut ledger);

        let version = mocked.get(&PropertyKey::from("version")).unwrap().unwrap();
        assert_eq!(version.as_str(), Some("2.0"));
    }

    #[test]
    fn test_data_export_dropped_when_configured() {
        let ns = Arc::new(Object::new(None));
        ns.set(PropertyKey::from("version"), Value::string("2.0")).unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &RegistryConfig::bare_auto_mocks(), &mut ledger);

        let version = mocked.get(&PropertyKey::from("version")).unwrap().unwrap();
        assert!(version.is_undefined());
    }

    #[test]
    fn test_original_namespace_untouched() {
        let ns = Arc::new(Object::new(None));
        ns.set(
            PropertyKey::from("f"),
            native_fn("f", |_| Ok(Value::number(1.0))),
        )
        .unwrap();

        let mut ledger = MockLedger::new();
        let _ = mock_namespace(&ns, &config(), &mut ledger);

        let f = ns.get(&PropertyKey::from("f")).unwrap().unwrap();
        assert_eq!(f.as_function().unwrap().call(&[]).unwrap().as_number(), Some(1.0));
    }

    #[test]
    fn test_class_prototype_constructor_identity() {
        let ctor = make_class("Widget");
        let mut ledger = MockLedger::new();
        let mocked = mock_function(&ctor, &mut ledger);

        let proto = mocked.prototype().unwrap();
        let back = proto.get(&PropertyKey::from("constructor")).unwrap().unwrap();
        assert!(same_ref(&back, &Value::function(mocked.clone())));
    }

    #[test]
    fn test_class_methods_mocked_data_preserved() {
        let ctor = make_class("Widget");
        let mut ledger = MockLedger::new();
        let mocked = mock_function(&ctor, &mut ledger);

        let proto = mocked.prototype().unwrap();

        let greet = proto.get(&PropertyKey::from("greet")).unwrap().unwrap();
        assert!(greet.is_function());
        // Replaced: returns undefined instead of "hello"
        assert!(greet.as_function().unwrap().call(&[]).unwrap().is_undefined());

        let species = proto.get(&PropertyKey::from("species")).unwrap().unwrap();
        assert_eq!(species.as_str(), Some("mustelid"));
    }

    #[test]
    fn test_original_prototype_untouched() {
        let ctor = make_class("Widget");
        let original_proto = ctor.prototype().unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_function(&ctor, &mut ledger);

        // The mocked prototype is a different object...
        assert!(!Arc::ptr_eq(&mocked.prototype().unwrap(), &original_proto));

        // ...and the original still greets and still owns its constructor.
        let greet = original_proto.get(&PropertyKey::from("greet")).unwrap().unwrap();
        assert_eq!(
            greet.as_function().unwrap().call(&[]).unwrap().as_str(),
            Some("hello")
        );
        let back = original_proto
            .get(&PropertyKey::from("constructor"))
            .unwrap()
            .unwrap();
        assert!(same_ref(&back, &Value::function(ctor)));
    }

    #[test]
    fn test_aliases_mock_once() {
        let shared = native_fn("helper", |_| Ok(Value::undefined()));
        let ns = Arc::new(Object::new(None));
        ns.set(PropertyKey::from("helper"), shared.clone()).unwrap();
        ns.set(PropertyKey::from("default"), shared).unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &config(), &mut ledger);

        let named = mocked.get(&PropertyKey::from("helper")).unwrap().unwrap();
        let default = mocked.get(&PropertyKey::from("default")).unwrap().unwrap();
        assert!(same_ref(&named, &default));
    }

    #[test]
    fn test_accessor_wrapped_with_original_semantics() {
        let cell = Arc::new(Mutex::new(Value::number(1.0)));

        let read = cell.clone();
        let getter = native_fn("get count", move |_| Ok(read.lock().clone()));
        let write = cell.clone();
        let setter = native_fn("set count", move |args: &[Value]| {
            *write.lock() = args.first().cloned().unwrap_or(Value::Undefined);
            Ok(Value::undefined())
        });

        let ns = Arc::new(Object::new(None));
        ns.define_property(
            PropertyKey::from("count"),
            PropertyDescriptor::accessor(Some(getter), Some(setter), PropertyAttributes::data()),
        )
        .unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &config(), &mut ledger);

        // Getter still reads the cell
        let got = mocked.get(&PropertyKey::from("count")).unwrap().unwrap();
        assert_eq!(got.as_number(), Some(1.0));

        // Setter still writes, and the spy saw the exact value
        mocked.set(PropertyKey::from("count"), Value::number(5.0)).unwrap();
        assert_eq!(cell.lock().as_number(), Some(5.0));

        let desc = mocked.own_descriptor(&PropertyKey::from("count")).unwrap();
        let PropertyDescriptor::Accessor { set: Some(set_fn), .. } = desc else {
            panic!("expected accessor descriptor");
        };
        let handle = ledger.handle_for(set_fn.as_function().unwrap()).unwrap();
        assert!(handle.called_with(&[Value::number(5.0)]));
    }

    #[test]
    fn test_get_only_stays_get_only() {
        let ns = Arc::new(Object::new(None));
        ns.define_property(
            PropertyKey::from("id"),
            PropertyDescriptor::accessor(
                Some(native_fn("get id", |_| Ok(Value::number(7.0)))),
                None,
                PropertyAttributes {
                    writable: false,
                    enumerable: true,
                    configurable: false,
                },
            ),
        )
        .unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_namespace(&ns, &config(), &mut ledger);

        assert!(mocked.set(PropertyKey::from("id"), Value::number(0.0)).is_err());

        // Sibling attributes preserved
        let desc = mocked.own_descriptor(&PropertyKey::from("id")).unwrap();
        assert!(!desc.attributes().configurable);
        assert!(desc.attributes().enumerable);
    }

    #[test]
    fn test_statics_carried() {
        let call: NativeFn = Arc::new(|_: &[Value]| Ok(Value::undefined()));
        let ctor = Arc::new(JsFunction::constructor(
            "Widget",
            call,
            Arc::new(Object::new(None)),
        ));
        ctor.define_static(
            PropertyKey::from("MAX"),
            PropertyDescriptor::data(Value::number(10.0)),
        )
        .unwrap();
        ctor.define_static(
            PropertyKey::from("create"),
            PropertyDescriptor::data(native_fn("create", |_| Ok(Value::string("real")))),
        )
        .unwrap();

        let mut ledger = MockLedger::new();
        let mocked = mock_function(&ctor, &mut ledger);

        let max = mocked.get_static(&PropertyKey::from("MAX")).unwrap().unwrap();
        assert_eq!(max.as_number(), Some(10.0));

        let create = mocked.get_static(&PropertyKey::from("create")).unwrap().unwrap();
        assert!(create.as_function().unwrap().call(&[]).unwrap().is_undefined());
    }
}
