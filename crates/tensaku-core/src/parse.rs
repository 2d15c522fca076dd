//! Parsing of model output into explanation items.
//!
//! The model is instructed to emit `N. <part>:<reason>` lines, but real
//! output is messy: full-width separators, stray prose, duplicated parts.
//! Parsing is lenient (take every line that matches the shape); strict
//! validation happens in the review loop.

use regex::Regex;

use crate::explain::ExplanationItem;

/// Pattern for one explanation line: number, dot, part, colon, reason.
///
/// Accepts ASCII `.`/`:` as well as the full-width `．`/`：` a
/// Japanese-tuned model is likely to emit.
fn explanation_line_pattern() -> Regex {
    Regex::new(r"^\s*(\d+)\s*[.．]\s*(.+?)\s*[:：]\s*(.*)$").expect("Invalid regex")
}

/// Pattern matching any Japanese-script character.
fn japanese_script_pattern() -> Regex {
    Regex::new(r"[\p{Hiragana}\p{Katakana}\p{Han}]").expect("Invalid regex")
}

/// True if the text contains at least one Japanese-script character.
pub fn contains_japanese(text: &str) -> bool {
    japanese_script_pattern().is_match(text)
}

/// Parse model output into explanation items.
///
/// Lines that do not match the explanation shape are skipped. Duplicate
/// parts keep the first occurrence, preserving the one-explanation-per-part
/// invariant. Returns the items in the order they appear.
pub fn parse_explanations(text: &str) -> Vec<ExplanationItem> {
    let pattern = explanation_line_pattern();
    let mut items: Vec<ExplanationItem> = Vec::new();

    for line in text.lines() {
        let Some(caps) = pattern.captures(line) else {
            continue;
        };

        let part = caps[2].trim().to_string();
        let reason = caps[3].trim().to_string();

        if items.iter().any(|item| item.part == part) {
            continue;
        }

        items.push(ExplanationItem::new(part, reason));
    }

    items
}
