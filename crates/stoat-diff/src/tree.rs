//! The diff tree.
//!
//! `diff` compares two JSON values and produces a `DiffTree`. Object and
//! array mismatches break down into per-field / per-index children, so a
//! consumer sees additions and removals at the field level rather than a
//! flat inequality.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeSet;

/// A tree of field-level differences between an expected and an actual
/// value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffTree {
    /// Both sides hold this value.
    Same {
        /// The shared value.
        value: JsonValue,
    },
    /// Both sides present, values differ (and are not both containers).
    Changed {
        /// Expected value.
        expected: JsonValue,
        /// Actual value.
        actual: JsonValue,
    },
    /// Present only on the actual side.
    Added {
        /// Actual value.
        actual: JsonValue,
    },
    /// Present only on the expected side.
    Removed {
        /// Expected value.
        expected: JsonValue,
    },
    /// Object compared field by field.
    Object {
        /// Field name → sub-diff, sorted by name.
        fields: Vec<(String, DiffTree)>,
    },
    /// Array compared index by index.
    Array {
        /// Sub-diff per index.
        items: Vec<DiffTree>,
    },
}

impl DiffTree {
    /// True when no difference exists anywhere in the tree.
    pub fn is_match(&self) -> bool {
        match self {
            Self::Same { .. } => true,
            Self::Changed { .. } | Self::Added { .. } | Self::Removed { .. } => false,
            Self::Object { fields } => fields.iter().all(|(_, sub)| sub.is_match()),
            Self::Array { items } => items.iter().all(DiffTree::is_match),
        }
    }

    /// Number of differing leaves in the tree.
    pub fn difference_count(&self) -> usize {
        match self {
            Self::Same { .. } => 0,
            Self::Changed { .. } | Self::Added { .. } | Self::Removed { .. } => 1,
            Self::Object { fields } => fields.iter().map(|(_, sub)| sub.difference_count()).sum(),
            Self::Array { items } => items.iter().map(DiffTree::difference_count).sum(),
        }
    }

    /// Rebuild the expected side of the comparison, if it existed.
    pub fn expected_value(&self) -> Option<JsonValue> {
        match self {
            Self::Same { value } => Some(value.clone()),
            Self::Changed { expected, .. } | Self::Removed { expected } => Some(expected.clone()),
            Self::Added { .. } => None,
            Self::Object { fields } => {
                let mut map = Map::new();
                for (name, sub) in fields {
                    if let Some(v) = sub.expected_value() {
                        map.insert(name.clone(), v);
                    }
                }
                Some(JsonValue::Object(map))
            }
            Self::Array { items } => Some(JsonValue::Array(
                items.iter().filter_map(DiffTree::expected_value).collect(),
            )),
        }
    }

    /// Rebuild the actual side of the comparison, if it existed.
    pub fn actual_value(&self) -> Option<JsonValue> {
        match self {
            Self::Same { value } => Some(value.clone()),
            Self::Changed { actual, .. } | Self::Added { actual } => Some(actual.clone()),
            Self::Removed { .. } => None,
            Self::Object { fields } => {
                let mut map = Map::new();
                for (name, sub) in fields {
                    if let Some(v) = sub.actual_value() {
                        map.insert(name.clone(), v);
                    }
                }
                Some(JsonValue::Object(map))
            }
            Self::Array { items } => Some(JsonValue::Array(
                items.iter().filter_map(DiffTree::actual_value).collect(),
            )),
        }
    }
}

/// Compare two values structurally.
pub fn diff(expected: &JsonValue, actual: &JsonValue) -> DiffTree {
    if expected == actual {
        return DiffTree::Same {
            value: expected.clone(),
        };
    }

    match (expected, actual) {
        (JsonValue::Object(e), JsonValue::Object(a)) => {
            let keys: BTreeSet<&String> = e.keys().chain(a.keys()).collect();
            let fields = keys
                .into_iter()
                .map(|key| {
                    let sub = match (e.get(key), a.get(key)) {
                        (Some(ev), Some(av)) => diff(ev, av),
                        (Some(ev), None) => DiffTree::Removed {
                            expected: ev.clone(),
                        },
                        (None, Some(av)) => DiffTree::Added { actual: av.clone() },
                        (None, None) => unreachable!("key came from one of the maps"),
                    };
                    (key.clone(), sub)
                })
                .collect();
            DiffTree::Object { fields }
        }
        (JsonValue::Array(e), JsonValue::Array(a)) => {
            let len = e.len().max(a.len());
            let items = (0..len)
                .map(|i| match (e.get(i), a.get(i)) {
                    (Some(ev), Some(av)) => diff(ev, av),
                    (Some(ev), None) => DiffTree::Removed {
                        expected: ev.clone(),
                    },
                    (None, Some(av)) => DiffTree::Added { actual: av.clone() },
                    (None, None) => unreachable!("index below max length"),
                })
                .collect();
            DiffTree::Array { items }
        }
        _ => DiffTree::Changed {
            expected: expected.clone(),
            actual: actual.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_values_match() {
        let tree = diff(&json!({"a": 1}), &json!({"a": 1}));
        assert!(tree.is_match());
        assert_eq!(tree.difference_count(), 0);
    }

    #[test]
    fn test_scalar_change() {
        let tree = diff(&json!(1), &json!(2));
        assert_eq!(
            tree,
            DiffTree::Changed {
                expected: json!(1),
                actual: json!(2)
            }
        );
        assert!(!tree.is_match());
    }

    #[test]
    fn test_field_level_changes() {
        let tree = diff(
            &json!({"name": "a", "count": 1, "gone": true}),
            &json!({"name": "a", "count": 2, "new": false}),
        );

        let DiffTree::Object { fields } = &tree else {
            panic!("expected object diff");
        };

        // Sorted by field name: count, gone, name, new
        assert_eq!(fields[0].0, "count");
        assert!(matches!(fields[0].1, DiffTree::Changed { .. }));
        assert_eq!(fields[1].0, "gone");
        assert!(matches!(fields[1].1, DiffTree::Removed { .. }));
        assert_eq!(fields[2].0, "name");
        assert!(matches!(fields[2].1, DiffTree::Same { .. }));
        assert_eq!(fields[3].0, "new");
        assert!(matches!(fields[3].1, DiffTree::Added { .. }));

        assert_eq!(tree.difference_count(), 3);
    }

    #[test]
    fn test_nested_objects() {
        let tree = diff(
            &json!({"outer": {"inner": 1}}),
            &json!({"outer": {"inner": 2}}),
        );

        let DiffTree::Object { fields } = &tree else {
            panic!("expected object diff");
        };
        let DiffTree::Object { fields: inner } = &fields[0].1 else {
            panic!("expected nested object diff");
        };
        assert!(matches!(inner[0].1, DiffTree::Changed { .. }));
    }

    #[test]
    fn test_array_diff() {
        let tree = diff(&json!([1, 2, 3]), &json!([1, 9]));

        let DiffTree::Array { items } = &tree else {
            panic!("expected array diff");
        };
        assert!(matches!(items[0], DiffTree::Same { .. }));
        assert!(matches!(items[1], DiffTree::Changed { .. }));
        assert!(matches!(items[2], DiffTree::Removed { .. }));
    }

    #[test]
    fn test_type_mismatch_is_flat_change() {
        let tree = diff(&json!({"a": 1}), &json!("oops"));
        assert!(matches!(tree, DiffTree::Changed { .. }));
    }

    #[test]
    fn test_rebuild_both_sides() {
        let expected = json!({"a": 1, "only_e": true});
        let actual = json!({"a": 2, "only_a": false});
        let tree = diff(&expected, &actual);

        assert_eq!(tree.expected_value(), Some(expected));
        assert_eq!(tree.actual_value(), Some(actual));
    }

    #[test]
    fn test_serializes_for_machine_consumers() {
        let tree = diff(&json!(1), &json!(2));
        let encoded = serde_json::to_value(&tree).unwrap();
        assert_eq!(encoded["kind"], "changed");
        assert_eq!(encoded["expected"], 1);
        assert_eq!(encoded["actual"], 2);
    }
}
