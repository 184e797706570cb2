//! # Stoat Mock
//!
//! Module mocking for a test runner: intercept module resolution,
//! substitute tracked stand-ins, spy on methods and accessors, and
//! raise assertion failures that carry structural diffs.
//!
//! The registry sits in front of the real module loader. A registered
//! override wins; everything else falls back to the real graph:
//!
//! ```
//! use std::sync::Arc;
//! use stoat_mock::{MockRegistry, ModuleRecord, StaticModuleLoader};
//! use stoat_value::{Value, native_fn};
//!
//! let loader = Arc::new(StaticModuleLoader::new());
//! let record = ModuleRecord::new("pkg/greeter");
//! record.define("greet", native_fn("greet", |_| Ok(Value::string("hi"))));
//! loader.register(record);
//!
//! let registry = MockRegistry::new(loader);
//! registry.register_mock("pkg/greeter");
//!
//! let greet = registry.mock_fn("pkg/greeter", "greet").unwrap();
//! greet.mock_return_value(Value::string("mocked"));
//! ```
//!
//! Mock state is scoped to the registry. The harness creates one
//! registry per test file and tears it down afterwards, so no call
//! recorded in one file is visible from another.

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod assertions;
mod automock;
pub mod config;
pub mod error;
pub mod mock_fn;
pub mod module;
pub mod registry;
pub mod spy;

pub use assertions::FailureReport;
pub use config::RegistryConfig;
pub use error::{MockError, MockResult};
pub use mock_fn::{CallOutcome, CallRecord, MockBehavior, MockFn};
pub use module::{DEFAULT_EXPORT, ModuleLoader, ModuleRecord, StaticModuleLoader};
pub use registry::{MockOverride, MockRegistry};
pub use spy::{SpyHandle, SpyKind, SpyTracker};
