//! Assertion helpers over mock call history.
//!
//! Failures are never bare booleans: every mismatch carries a message
//! built by the diff renderer plus the machine-readable diff trees, one
//! per recorded call.

use serde::Serialize;
use serde_json::Value as JsonValue;

use stoat_diff::{DiffRenderer, DiffTree, RenderConfig, diff};
use stoat_value::{Value, to_json};

use crate::mock_fn::{CallOutcome, MockFn};

/// A structured assertion failure.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    /// Human-readable failure message, diff blocks included.
    pub message: String,
    /// Machine-readable diff trees, one per recorded call, in call
    /// order. Empty when no calls were recorded or the assertion has no
    /// value to diff.
    pub diffs: Vec<DiffTree>,
}

impl FailureReport {
    fn simple(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diffs: Vec::new(),
        }
    }
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn display_name(mock: &MockFn) -> String {
    let name = mock.name();
    if name.is_empty() { "(anonymous)".to_string() } else { name }
}

/// Assert the mock was called at least once.
pub fn assert_called(mock: &MockFn) -> Result<(), FailureReport> {
    if mock.was_called() {
        Ok(())
    } else {
        Err(FailureReport::simple(format!(
            "Expected mock {} to have been called",
            display_name(mock)
        )))
    }
}

/// Assert the mock was never called.
pub fn assert_not_called(mock: &MockFn) -> Result<(), FailureReport> {
    if !mock.was_called() {
        Ok(())
    } else {
        Err(FailureReport::simple(format!(
            "Expected mock {} to not have been called, but was called {} times",
            display_name(mock),
            mock.call_count()
        )))
    }
}

/// Assert the mock was called exactly `n` times.
pub fn assert_called_times(mock: &MockFn, n: usize) -> Result<(), FailureReport> {
    if mock.was_called_times(n) {
        Ok(())
    } else {
        Err(FailureReport::simple(format!(
            "Expected mock {} to have been called {} times, but was called {} times",
            display_name(mock),
            n,
            mock.call_count()
        )))
    }
}

/// Assert some call received exactly these arguments (structural
/// equality). On failure, every recorded argument list is diffed
/// against the expectation.
pub fn assert_called_with(mock: &MockFn, expected: &[Value]) -> Result<(), FailureReport> {
    if mock.called_with(expected) {
        return Ok(());
    }

    let expected_json = JsonValue::Array(expected.iter().map(to_json).collect());
    let actual: Vec<JsonValue> = mock
        .calls()
        .iter()
        .map(|call| JsonValue::Array(call.args.iter().map(to_json).collect()))
        .collect();

    Err(report(
        &format!(
            "Expected mock {} to have been called with:",
            display_name(mock)
        ),
        &expected_json,
        &actual,
        &RenderConfig::plain(),
    ))
}

/// Assert some call returned this value (structural equality). On
/// failure, every recorded return value is diffed against the
/// expectation — zero calls render a distinct "no calls" block.
pub fn assert_returned_with(mock: &MockFn, expected: &Value) -> Result<(), FailureReport> {
    assert_returned_with_config(mock, expected, &RenderConfig::plain())
}

/// `assert_returned_with` with an explicit render configuration
/// (e.g. ANSI styling).
pub fn assert_returned_with_config(
    mock: &MockFn,
    expected: &Value,
    config: &RenderConfig,
) -> Result<(), FailureReport> {
    if mock.returned_with(expected) {
        return Ok(());
    }

    let expected_json = to_json(expected);
    let actual: Vec<JsonValue> = mock
        .calls()
        .iter()
        .map(|call| match &call.outcome {
            CallOutcome::Returned(v) => to_json(v),
            CallOutcome::Threw(e) => JsonValue::String(format!("[Threw: {:?}]", e)),
        })
        .collect();

    Err(report(
        &format!(
            "Expected mock {} to have returned:",
            display_name(mock)
        ),
        &expected_json,
        &actual,
        config,
    ))
}

fn report(
    header: &str,
    expected: &JsonValue,
    actual: &[JsonValue],
    config: &RenderConfig,
) -> FailureReport {
    let renderer = DiffRenderer::new(config.clone());
    FailureReport {
        message: renderer.render_mismatch_report(header, expected, actual),
        diffs: actual.iter().map(|a| diff(expected, a)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stoat_value::value_from_json;

    #[test]
    fn test_called_assertions() {
        let mock = MockFn::new("m");

        assert!(assert_not_called(&mock).is_ok());
        assert!(assert_called(&mock).is_err());

        mock.invoke(&[Value::number(1.0)]).unwrap();

        assert!(assert_called(&mock).is_ok());
        assert!(assert_not_called(&mock).is_err());
        assert!(assert_called_times(&mock, 1).is_ok());
        assert!(assert_called_times(&mock, 2).is_err());
    }

    #[test]
    fn test_called_with_success_is_structural() {
        let mock = MockFn::new("m");
        mock.invoke(&[value_from_json(&serde_json::json!({"id": 3.0}))]).unwrap();

        let expected = value_from_json(&serde_json::json!({"id": 3.0}));
        assert!(assert_called_with(&mock, &[expected]).is_ok());
    }

    #[test]
    fn test_called_with_failure_has_diff_per_call() {
        let mock = MockFn::new("m");
        mock.invoke(&[Value::number(1.0)]).unwrap();
        mock.invoke(&[Value::number(2.0)]).unwrap();

        let failure = assert_called_with(&mock, &[Value::number(3.0)]).unwrap_err();
        assert_eq!(failure.diffs.len(), 2);
        assert!(failure.message.contains("1st call:"));
        assert!(failure.message.contains("2nd call:"));
    }

    #[test]
    fn test_returned_with_no_calls_block() {
        let mock = MockFn::new("fetchTotals");
        let failure = assert_returned_with(&mock, &Value::number(1.0)).unwrap_err();

        assert!(failure.message.contains("No calls recorded."));
        assert!(failure.diffs.is_empty());
    }

    #[test]
    fn test_returned_with_ordinal_blocks() {
        let mock = MockFn::new("m");
        mock.mock_return_value_once(Value::number(1.0));
        mock.mock_return_value_once(Value::number(2.0));
        mock.invoke(&[]).unwrap();
        mock.invoke(&[]).unwrap();

        let failure = assert_returned_with(&mock, &Value::number(9.0)).unwrap_err();

        assert!(failure.message.contains("1st call:"));
        assert!(failure.message.contains("2nd call:"));
        assert!(failure.message.contains("Number of calls: 2"));
        assert_eq!(failure.diffs.len(), 2);
    }

    #[test]
    fn test_returned_with_object_field_diff() {
        let mock = MockFn::new("m");
        mock.mock_return_value(value_from_json(&serde_json::json!({"a": 1.0, "b": 2.0})));
        mock.invoke(&[]).unwrap();

        let expected = value_from_json(&serde_json::json!({"a": 1.0, "b": 3.0}));
        let failure = assert_returned_with(&mock, &expected).unwrap_err();

        // Field-level lines, not a flat inequality
        assert!(failure.message.contains("a: 1.0"));
        assert!(failure.message.contains("- b: 3.0"));
        assert!(failure.message.contains("+ b: 2.0"));
    }

    #[test]
    fn test_returned_with_matches_any_call() {
        let mock = MockFn::new("m");
        mock.mock_return_value_once(Value::number(1.0));
        mock.mock_return_value_once(Value::number(2.0));
        mock.invoke(&[]).unwrap();
        mock.invoke(&[]).unwrap();

        assert!(assert_returned_with(&mock, &Value::number(2.0)).is_ok());
    }

    #[test]
    fn test_failure_serializes() {
        let mock = MockFn::new("m");
        mock.invoke(&[]).unwrap();

        let failure = assert_returned_with(&mock, &Value::number(1.0)).unwrap_err();
        let encoded = serde_json::to_value(&failure).unwrap();
        assert!(encoded["message"].is_string());
        assert!(encoded["diffs"].is_array());
    }
}
