//! Explanation model and rendering.
//!
//! An `ExplanationList` is the final product of the pipeline: one numbered
//! line per corrected part, each with a single Japanese reason.

use serde::Serialize;

/// Fixed line rendered when the two sentences are identical.
pub const NO_CORRECTIONS_LINE: &str = "修正はありません。";

/// One (corrected part, Japanese reason) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplanationItem {
    /// Label for the corrected span, e.g. `go→went`.
    pub part: String,
    /// Concise Japanese reason for the edit.
    pub reason: String,
}

impl ExplanationItem {
    /// Create a new item.
    pub fn new(part: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            part: part.into(),
            reason: reason.into(),
        }
    }
}

/// The ordered list of explanations for one sentence pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExplanationList {
    /// Items in sentence order.
    pub items: Vec<ExplanationItem>,
}

impl ExplanationList {
    /// Create a list from items.
    pub fn new(items: Vec<ExplanationItem>) -> Self {
        Self { items }
    }

    /// An empty list (no corrections needed).
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    /// Whether there are no corrections.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of explanation items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Render the list in the required output format:
    ///
    /// ```text
    /// 1. <corrected part #1>:<reason #1>
    /// ...
    /// N. <corrected part #N>:<reason #N>
    /// ```
    ///
    /// An empty list renders as the fixed no-corrections line so the student
    /// always sees a definite answer.
    pub fn render(&self) -> String {
        if self.items.is_empty() {
            return NO_CORRECTIONS_LINE.to_string();
        }

        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}:{}", i + 1, item.part, item.reason))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
