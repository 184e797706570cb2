//! Tracked mock functions.
//!
//! A `MockFn` is the shared handle behind every auto-mocked export, spy,
//! and standalone mock: it records calls, dispatches configured
//! behavior, and answers history queries. The callable installed into a
//! namespace or prototype is materialized once via `as_function()` and
//! shares this handle, so configuring the handle reconfigures every
//! alias of the function.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use stoat_value::{FunctionRef, JsFunction, NativeFn, Promise, Value, deep_equals};

/// What a single invocation produced.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// The call returned a value.
    Returned(Value),
    /// The call threw a value.
    Threw(Value),
}

/// A record of one invocation.
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// Arguments passed to the call.
    pub args: Vec<Value>,
    /// Return value or thrown error.
    pub outcome: CallOutcome,
    /// 1-indexed call order.
    pub ordinal: usize,
    /// Timestamp of the call.
    pub timestamp_ms: u64,
}

/// Configuration for mock behavior.
///
/// Dispatch precedence, first match wins: one-shot return queue, throw
/// value, replacement implementation, sticky return value, rejected
/// value, resolved value, call-through to the original, and finally the
/// default (a settled undefined promise for async mocks, undefined
/// otherwise).
#[derive(Clone, Default)]
pub struct MockBehavior {
    /// Values to return on successive calls, drained front-first.
    pub return_values_once: Vec<Value>,
    /// Value to always return.
    pub return_value: Option<Value>,
    /// Replacement implementation.
    pub implementation: Option<NativeFn>,
    /// Whether to call the original implementation.
    pub call_through: bool,
    /// Value the mock should throw.
    pub throws: Option<Value>,
    /// Value to resolve with (async mocks).
    pub resolves: Option<Value>,
    /// Value to reject with (async mocks).
    pub rejects: Option<Value>,
}

impl std::fmt::Debug for MockBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBehavior")
            .field("return_values_once", &self.return_values_once.len())
            .field("return_value", &self.return_value)
            .field("has_implementation", &self.implementation.is_some())
            .field("call_through", &self.call_through)
            .field("throws", &self.throws)
            .field("resolves", &self.resolves)
            .field("rejects", &self.rejects)
            .finish()
    }
}

struct MockState {
    name: String,
    is_async: bool,
    calls: Vec<CallRecord>,
    behavior: MockBehavior,
    original: Option<NativeFn>,
}

/// A mock function handle: call history plus configurable behavior.
#[derive(Clone)]
pub struct MockFn {
    state: Arc<Mutex<MockState>>,
}

enum Dispatch {
    Return(Value),
    Throw(Value),
    Run(NativeFn),
    Resolve(Value),
    Reject(Value),
    DefaultAsync,
    Default,
}

impl MockFn {
    /// Create a new mock function.
    pub fn new(name: impl Into<String>) -> Self {
        Self::build(name.into(), false, None, false)
    }

    /// Create a new async mock function.
    pub fn new_async(name: impl Into<String>) -> Self {
        Self::build(name.into(), true, None, false)
    }

    /// Create a mock mirroring a function's name and async flag, without
    /// keeping its implementation (auto-mock semantics).
    pub fn mirroring(func: &FunctionRef) -> Self {
        Self::build(func.name().to_string(), func.is_async(), None, false)
    }

    /// Create a spy over a function: history is recorded and, when
    /// `call_through` holds, the original still runs.
    pub fn spying_on(func: &FunctionRef, call_through: bool) -> Self {
        let original = func.clone();
        let call: NativeFn = Arc::new(move |args| original.call(args));
        Self::build(func.name().to_string(), func.is_async(), Some(call), call_through)
    }

    fn build(name: String, is_async: bool, original: Option<NativeFn>, call_through: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                name,
                is_async,
                calls: Vec::new(),
                behavior: MockBehavior {
                    call_through,
                    ..MockBehavior::default()
                },
                original,
            })),
        }
    }

    /// Mock name.
    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    /// Whether the mock settles asynchronously.
    pub fn is_async(&self) -> bool {
        self.state.lock().is_async
    }

    // -----------------------------------------------------------------
    // Behavior configuration
    // -----------------------------------------------------------------

    /// Set the value returned by every subsequent call.
    pub fn mock_return_value(&self, value: Value) {
        self.state.lock().behavior.return_value = Some(value);
    }

    /// Queue a value for a single subsequent call.
    pub fn mock_return_value_once(&self, value: Value) {
        self.state.lock().behavior.return_values_once.push(value);
    }

    /// Make every subsequent call return a promise fulfilled with `value`.
    pub fn mock_resolved_value(&self, value: Value) {
        let mut state = self.state.lock();
        state.behavior.resolves = Some(value);
        state.behavior.rejects = None;
    }

    /// Make every subsequent call return a promise rejected with `error`.
    pub fn mock_rejected_value(&self, error: Value) {
        let mut state = self.state.lock();
        state.behavior.rejects = Some(error);
        state.behavior.resolves = None;
    }

    /// Make every subsequent call throw `error`.
    pub fn mock_throw_value(&self, error: Value) {
        self.state.lock().behavior.throws = Some(error);
    }

    /// Install a replacement implementation.
    pub fn mock_implementation(&self, implementation: NativeFn) {
        self.state.lock().behavior.implementation = Some(implementation);
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Clear the call history, keeping configured behavior.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Clear the call history and all configured behavior.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.behavior = MockBehavior::default();
    }

    /// Revert a spy to pass-through: behavior cleared, the original
    /// implementation runs again.
    pub fn restore(&self) {
        let mut state = self.state.lock();
        let call_through = state.original.is_some();
        state.calls.clear();
        state.behavior = MockBehavior {
            call_through,
            ..MockBehavior::default()
        };
    }

    // -----------------------------------------------------------------
    // Invocation
    // -----------------------------------------------------------------

    /// Invoke the mock: dispatch configured behavior and append a call
    /// record. The history is append-only; records are never reordered.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, Value> {
        // Decide under the lock, run user code outside it: the
        // implementation (or the spied original) may re-enter this mock.
        let dispatch = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let behavior = &mut state.behavior;
            if !behavior.return_values_once.is_empty() {
                Dispatch::Return(behavior.return_values_once.remove(0))
            } else if let Some(v) = behavior.throws.clone() {
                Dispatch::Throw(v)
            } else if let Some(f) = behavior.implementation.clone() {
                Dispatch::Run(f)
            } else if let Some(v) = behavior.return_value.clone() {
                Dispatch::Return(v)
            } else if let Some(v) = behavior.rejects.clone() {
                Dispatch::Reject(v)
            } else if let Some(v) = behavior.resolves.clone() {
                Dispatch::Resolve(v)
            } else if behavior.call_through {
                match state.original.clone() {
                    Some(f) => Dispatch::Run(f),
                    None => Dispatch::Default,
                }
            } else if state.is_async {
                Dispatch::DefaultAsync
            } else {
                Dispatch::Default
            }
        };

        let result = match dispatch {
            Dispatch::Return(v) => Ok(v),
            Dispatch::Throw(v) => Err(v),
            Dispatch::Run(f) => f(args),
            Dispatch::Resolve(v) => Ok(Value::promise(Promise::resolved(v))),
            Dispatch::Reject(v) => Ok(Value::promise(Promise::rejected(v))),
            Dispatch::DefaultAsync => Ok(Value::promise(Promise::resolved(Value::undefined()))),
            Dispatch::Default => Ok(Value::undefined()),
        };

        let mut state = self.state.lock();
        let ordinal = state.calls.len() + 1;
        let outcome = match &result {
            Ok(v) => CallOutcome::Returned(v.clone()),
            Err(e) => CallOutcome::Threw(e.clone()),
        };
        state.calls.push(CallRecord {
            args: args.to_vec(),
            outcome,
            ordinal,
            timestamp_ms: now_ms(),
        });

        result
    }

    /// Materialize the tracked callable for installation into a
    /// namespace or prototype. Each call creates a fresh function
    /// identity; callers that need alias equality install one result in
    /// every location.
    pub fn as_function(&self) -> FunctionRef {
        let handle = self.clone();
        let (name, is_async) = {
            let state = self.state.lock();
            (state.name.clone(), state.is_async)
        };
        let call: NativeFn = Arc::new(move |args| handle.invoke(args));
        if is_async {
            Arc::new(JsFunction::new_async(name, call))
        } else {
            Arc::new(JsFunction::new(name, call))
        }
    }

    // -----------------------------------------------------------------
    // History queries
    // -----------------------------------------------------------------

    /// Number of recorded calls.
    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Check if the mock was called at all.
    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    /// Check if the mock was called exactly `n` times.
    pub fn was_called_times(&self, n: usize) -> bool {
        self.call_count() == n
    }

    /// Snapshot of all recorded calls, in call order.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.state.lock().calls.clone()
    }

    /// The last recorded call.
    pub fn last_call(&self) -> Option<CallRecord> {
        self.state.lock().calls.last().cloned()
    }

    /// Check if any call received exactly these arguments (structural
    /// equality).
    pub fn called_with(&self, expected: &[Value]) -> bool {
        self.state.lock().calls.iter().any(|call| {
            call.args.len() == expected.len()
                && call.args.iter().zip(expected).all(|(a, b)| deep_equals(a, b))
        })
    }

    /// Check if any call returned this value (structural equality).
    pub fn returned_with(&self, expected: &Value) -> bool {
        self.state.lock().calls.iter().any(|call| match &call.outcome {
            CallOutcome::Returned(v) => deep_equals(v, expected),
            CallOutcome::Threw(_) => false,
        })
    }
}

impl std::fmt::Debug for MockFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockFn")
            .field("name", &state.name)
            .field("is_async", &state.is_async)
            .field("calls", &state.calls.len())
            .field("behavior", &state.behavior)
            .finish()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
