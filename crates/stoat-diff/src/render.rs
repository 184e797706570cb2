//! Rendering diff trees and multi-call mismatch reports.
//!
//! A failed "returned with" assertion renders one block per recorded
//! call, labeled with its 1-indexed ordinal, in call order. Zero calls
//! renders a distinct "No calls recorded." block rather than an empty
//! list.

use serde_json::Value as JsonValue;
use std::fmt::Write;

use crate::style::RenderStyle;
use crate::tree::{DiffTree, diff};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Line styling.
    pub style: RenderStyle,
    /// Spaces per nesting level.
    pub indent: usize,
    /// Nesting depth beyond which subtrees render as compact values.
    pub max_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: RenderStyle::Plain,
            indent: 2,
            max_depth: 8,
        }
    }
}

impl RenderConfig {
    /// Plain-text rendering (the default).
    pub fn plain() -> Self {
        Self::default()
    }

    /// ANSI-colored rendering.
    pub fn ansi() -> Self {
        Self {
            style: RenderStyle::Ansi,
            ..Self::default()
        }
    }
}

/// English ordinal for a 1-indexed call number: "1st", "2nd", "3rd",
/// "4th", ..., "11th", "12th", "13th", "21st", ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Renders diff trees and call-mismatch reports.
#[derive(Debug, Clone, Default)]
pub struct DiffRenderer {
    config: RenderConfig,
}

impl DiffRenderer {
    /// Create a renderer with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a single diff tree as `-`/`+` lines.
    pub fn render_tree(&self, tree: &DiffTree) -> String {
        let mut out = String::new();
        self.write_node(tree, None, 0, &mut out);
        out
    }

    /// Render a full mismatch report: header, expected value, one
    /// ordinal block per recorded call (or a "no calls" block), and a
    /// call-count footer.
    pub fn render_mismatch_report(
        &self,
        header: &str,
        expected: &JsonValue,
        calls: &[JsonValue],
    ) -> String {
        let mut out = String::new();
        writeln!(out, "{}", header).ok();
        writeln!(out, "  {}", compact(expected)).ok();

        if calls.is_empty() {
            writeln!(out).ok();
            writeln!(out, "No calls recorded.").ok();
            return out;
        }

        writeln!(out).ok();
        writeln!(out, "{}", self.config.style.removed("- Expected")).ok();
        writeln!(out, "{}", self.config.style.added("+ Received")).ok();

        for (i, actual) in calls.iter().enumerate() {
            let tree = diff(expected, actual);
            writeln!(out).ok();
            writeln!(out, "{} call:", ordinal(i + 1)).ok();
            out.push_str(&self.render_tree(&tree));
        }

        writeln!(out).ok();
        writeln!(out, "Number of calls: {}", calls.len()).ok();
        out
    }

    fn write_node(&self, tree: &DiffTree, label: Option<&str>, depth: usize, out: &mut String) {
        let pad = " ".repeat(depth * self.config.indent);
        let prefix = match label {
            Some(l) => format!("{}: ", l),
            None => String::new(),
        };

        match tree {
            DiffTree::Same { value } => {
                self.context_line(out, &pad, &format!("{}{}", prefix, compact(value)));
            }
            DiffTree::Changed { expected, actual } => {
                self.removed_line(out, &pad, &format!("{}{}", prefix, compact(expected)));
                self.added_line(out, &pad, &format!("{}{}", prefix, compact(actual)));
            }
            DiffTree::Added { actual } => {
                self.added_line(out, &pad, &format!("{}{}", prefix, compact(actual)));
            }
            DiffTree::Removed { expected } => {
                self.removed_line(out, &pad, &format!("{}{}", prefix, compact(expected)));
            }
            DiffTree::Object { .. } | DiffTree::Array { .. } if depth >= self.config.max_depth => {
                // Too deep: fall back to a compact changed pair.
                if let Some(expected) = tree.expected_value() {
                    self.removed_line(out, &pad, &format!("{}{}", prefix, compact(&expected)));
                }
                if let Some(actual) = tree.actual_value() {
                    self.added_line(out, &pad, &format!("{}{}", prefix, compact(&actual)));
                }
            }
            DiffTree::Object { fields } => {
                self.context_line(out, &pad, &format!("{}{{", prefix));
                for (name, sub) in fields {
                    self.write_node(sub, Some(name), depth + 1, out);
                }
                self.context_line(out, &pad, "}");
            }
            DiffTree::Array { items } => {
                self.context_line(out, &pad, &format!("{}[", prefix));
                for sub in items {
                    self.write_node(sub, None, depth + 1, out);
                }
                self.context_line(out, &pad, "]");
            }
        }
    }

    fn context_line(&self, out: &mut String, pad: &str, body: &str) {
        writeln!(out, "    {}{}", pad, body).ok();
    }

    fn removed_line(&self, out: &mut String, pad: &str, body: &str) {
        let line = format!("  {}- {}", pad, body);
        writeln!(out, "{}", self.config.style.removed(&line)).ok();
    }

    fn added_line(&self, out: &mut String, pad: &str, body: &str) {
        let line = format!("  {}+ {}", pad, body);
        writeln!(out, "{}", self.config.style.added(&line)).ok();
    }
}

fn compact(value: &JsonValue) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
