//! The review pipeline: diff, infer reasons, validate, render.
//!
//! `Reviewer` drives the whole flow for one sentence pair. Validation is
//! shared with the LLM reasoner's retry loop: `validate_items` returns the
//! complaint list that is either empty (output accepted) or fed back to the
//! model on retry.

use std::sync::Arc;

use crate::diff::{Edit, sentence_edits};
use crate::error::Result;
use crate::explain::{ExplanationItem, ExplanationList};
use crate::parse::contains_japanese;
use crate::reason::ReasonInference;

/// Find the index of the item matching an edit, skipping already-used items.
///
/// Exact label matches win over substring matches across the whole list:
/// a short corrected word like "a" or "the" must not steal another edit's
/// item when that edit's canonical label is present.
fn find_match(edit: &Edit, items: &[ExplanationItem], used: &[bool]) -> Option<usize> {
    let label = edit.part_label();

    if let Some(i) = items
        .iter()
        .enumerate()
        .position(|(i, item)| !used[i] && item.part == label)
    {
        return Some(i);
    }

    let corrected = edit.corrected_text();
    let original = edit.original_text();

    items.iter().enumerate().position(|(i, item)| {
        if used[i] {
            return false;
        }
        if !corrected.is_empty() && item.part.contains(&corrected) {
            return true;
        }
        !original.is_empty() && item.part.contains(&original)
    })
}

/// Validate parsed items against the computed edits.
///
/// Returns Japanese complaints suitable for feeding back to the model; an
/// empty list means the output satisfies every invariant: one item per edit,
/// no extras, every reason non-empty and in Japanese.
pub fn validate_items(edits: &[Edit], items: &[ExplanationItem]) -> Vec<String> {
    let mut complaints = Vec::new();

    if items.len() != edits.len() {
        complaints.push(format!(
            "修正箇所は{}件ですが、説明は{}件です。修正箇所ひとつにつき説明をひとつ書いてください。",
            edits.len(),
            items.len()
        ));
    }

    let mut used = vec![false; items.len()];
    for edit in edits {
        match find_match(edit, items, &used) {
            Some(i) => used[i] = true,
            None => complaints.push(format!(
                "修正箇所「{}」に対応する説明がありません。",
                edit.part_label()
            )),
        }
    }

    for item in items {
        if item.reason.is_empty() || !contains_japanese(&item.reason) {
            complaints.push(format!(
                "「{}」の説明が空か、日本語で書かれていません。",
                item.part
            ));
        }
    }

    complaints
}

/// Re-order items into sentence order, one per edit.
///
/// Returns None when some edit has no matching item (callers validate
/// first, so this only fails on racy part labels).
pub fn align_items(edits: &[Edit], items: &[ExplanationItem]) -> Option<Vec<ExplanationItem>> {
    let mut used = vec![false; items.len()];
    let mut aligned = Vec::with_capacity(edits.len());

    for edit in edits {
        let i = find_match(edit, items, &used)?;
        used[i] = true;
        aligned.push(items[i].clone());
    }

    Some(aligned)
}

/// Drives the full pipeline for one (original, corrected) pair.
pub struct Reviewer {
    primary: Arc<dyn ReasonInference>,
    fallback: Option<Arc<dyn ReasonInference>>,
}

impl Reviewer {
    /// Create a reviewer with the given reasoning strategy.
    pub fn new(primary: Arc<dyn ReasonInference>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// Add a fallback strategy used when the primary fails.
    pub fn with_fallback(mut self, fallback: Arc<dyn ReasonInference>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Produce the explanation list for a sentence pair.
    ///
    /// Identical sentences short-circuit to an empty list. When the primary
    /// strategy errors and a fallback is configured, the fallback runs on
    /// the same edits so the caller always receives a well-formed list.
    pub async fn review(&self, original: &str, corrected: &str) -> Result<ExplanationList> {
        let edits = sentence_edits(original, corrected);
        if edits.is_empty() {
            tracing::debug!("No edits between sentences");
            return Ok(ExplanationList::empty());
        }

        tracing::debug!(
            edits = edits.len(),
            strategy = self.primary.name(),
            "Inferring reasons"
        );

        match self.primary.explain(original, corrected, &edits).await {
            Ok(list) => Ok(list),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(
                        error = %e,
                        strategy = self.primary.name(),
                        fallback = fallback.name(),
                        "Primary strategy failed, falling back"
                    );
                    fallback.explain(original, corrected, &edits).await
                }
                None => Err(e),
            },
        }
    }
}
