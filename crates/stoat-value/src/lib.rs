//! # Stoat Value
//!
//! Dynamic value model for the stoat mocking layer.
//!
//! Module bindings in the mocked system are dynamically typed: a single
//! export slot can hold a function, a class with a prototype, an accessor
//! pair, or plain data. This crate provides the one handle type
//! (`Value`) the mock layer threads through registries, call records,
//! and diagnostics, together with the object model behind it.
//!
//! ## Design Principles
//!
//! - **Thread-safe**: all handles are `Send + Sync`; shared state lives
//!   behind `Arc` and `parking_lot` locks
//! - **Reference semantics where it matters**: objects, functions, and
//!   promises compare by identity (`same_ref`), data compares
//!   structurally (`deep_equals`)
//! - **Descriptors all the way down**: property access honors
//!   writable/enumerable/configurable flags and accessor pairs

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod convert;
pub mod function;
pub mod object;
pub mod promise;
pub mod value;

pub use convert::{to_json, value_from_json};
pub use function::{FunctionRef, JsFunction, NativeFn};
pub use object::{Object, ObjectRef, PropertyAttributes, PropertyDescriptor, PropertyError, PropertyKey};
pub use promise::{Promise, PromiseState};
pub use value::{Value, deep_equals, empty_object, native_fn, same_ref};
