//! Settled-state promises.
//!
//! The mock layer only needs to hand back a value that *will* resolve or
//! reject; scheduling belongs to the host event loop. A `Promise` here
//! is therefore just a state cell: pending, fulfilled, or rejected.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::value::Value;

/// Promise state.
#[derive(Debug, Clone)]
pub enum PromiseState {
    /// Not yet settled.
    Pending,
    /// Resolved with a value.
    Fulfilled(Value),
    /// Rejected with an error value.
    Rejected(Value),
}

impl PromiseState {
    /// Check if settled (fulfilled or rejected).
    pub fn is_settled(&self) -> bool {
        !matches!(self, PromiseState::Pending)
    }
}

/// A promise.
pub struct Promise {
    state: Mutex<PromiseState>,
}

impl Promise {
    /// Create a pending promise.
    pub fn pending() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PromiseState::Pending),
        })
    }

    /// Create an already-fulfilled promise.
    pub fn resolved(value: Value) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PromiseState::Fulfilled(value)),
        })
    }

    /// Create an already-rejected promise.
    pub fn rejected(error: Value) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(PromiseState::Rejected(error)),
        })
    }

    /// Fulfill a pending promise. Settled promises are not re-settled.
    pub fn resolve(&self, value: Value) {
        let mut state = self.state.lock();
        if !state.is_settled() {
            *state = PromiseState::Fulfilled(value);
        }
    }

    /// Reject a pending promise. Settled promises are not re-settled.
    pub fn reject(&self, error: Value) {
        let mut state = self.state.lock();
        if !state.is_settled() {
            *state = PromiseState::Rejected(error);
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PromiseState {
        self.state.lock().clone()
    }

    /// Check if settled.
    pub fn is_settled(&self) -> bool {
        self.state.lock().is_settled()
    }
}

impl std::fmt::Debug for Promise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &*self.state.lock() {
            PromiseState::Pending => write!(f, "Promise {{ <pending> }}"),
            PromiseState::Fulfilled(v) => write!(f, "Promise {{ <fulfilled>: {:?} }}", v),
            PromiseState::Rejected(v) => write!(f, "Promise {{ <rejected>: {:?} }}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved() {
        let p = Promise::resolved(Value::number(1.0));
        assert!(p.is_settled());
        assert!(matches!(p.state(), PromiseState::Fulfilled(v) if v.as_number() == Some(1.0)));
    }

    #[test]
    fn test_rejected() {
        let p = Promise::rejected(Value::string("nope"));
        assert!(matches!(p.state(), PromiseState::Rejected(v) if v.as_str() == Some("nope")));
    }

    #[test]
    fn test_settle_once() {
        let p = Promise::pending();
        assert!(!p.is_settled());

        p.resolve(Value::number(1.0));
        p.reject(Value::string("late"));

        assert!(matches!(p.state(), PromiseState::Fulfilled(_)));
    }
}
