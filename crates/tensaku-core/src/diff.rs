//! Word-level sentence diffing.
//!
//! Compares the student's original sentence against the corrected version
//! and produces one `Edit` per corrected part. Edits come out in sentence
//! order, and an adjacent delete+insert pair is a single substitution, so
//! "one corrected part, one edit" holds by construction.

use serde::Serialize;
use similar::{DiffTag, TextDiff};

/// The kind of a single edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    /// Words present only in the corrected sentence.
    Insertion,
    /// Words present only in the original sentence.
    Deletion,
    /// A span replaced by different words.
    Substitution,
}

/// A single edited span between the original and corrected sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    /// What happened to this span.
    pub kind: EditKind,
    /// The words from the original sentence (empty for insertions).
    pub original: Vec<String>,
    /// The words from the corrected sentence (empty for deletions).
    pub corrected: Vec<String>,
    /// Word offset of the span in the corrected sentence.
    pub position: usize,
}

impl Edit {
    /// Human-readable label for the corrected part.
    ///
    /// Substitutions render as `old→new`, insertions as `+word`, deletions
    /// as `-word`.
    pub fn part_label(&self) -> String {
        match self.kind {
            EditKind::Substitution => {
                format!("{}→{}", self.original.join(" "), self.corrected.join(" "))
            }
            EditKind::Insertion => format!("+{}", self.corrected.join(" ")),
            EditKind::Deletion => format!("-{}", self.original.join(" ")),
        }
    }

    /// The original span as one string.
    pub fn original_text(&self) -> String {
        self.original.join(" ")
    }

    /// The corrected span as one string.
    pub fn corrected_text(&self) -> String {
        self.corrected.join(" ")
    }
}

/// Split a sentence into word tokens.
///
/// Whitespace-delimited, with terminal punctuation split into its own token
/// so `school.` vs `school` does not register as an edit.
pub fn tokenize(sentence: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in sentence.split_whitespace() {
        let trailing: String = word
            .chars()
            .rev()
            .take_while(|c| matches!(c, '.' | ',' | '!' | '?' | ';' | ':'))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        let core = &word[..word.len() - trailing.len()];
        if !core.is_empty() {
            tokens.push(core.to_string());
        }
        for c in trailing.chars() {
            tokens.push(c.to_string());
        }
    }

    tokens
}

/// Compute the edits between an original and a corrected sentence.
///
/// Deterministic: the same sentence pair always yields the same edit list,
/// ordered by position in the sentence.
pub fn sentence_edits(original: &str, corrected: &str) -> Vec<Edit> {
    let old_tokens = tokenize(original);
    let new_tokens = tokenize(corrected);

    let old_refs: Vec<&str> = old_tokens.iter().map(String::as_str).collect();
    let new_refs: Vec<&str> = new_tokens.iter().map(String::as_str).collect();

    let diff = TextDiff::from_slices(&old_refs, &new_refs);

    let mut edits = Vec::new();
    for op in diff.ops() {
        let old_range = op.old_range();
        let new_range = op.new_range();

        let kind = match op.tag() {
            DiffTag::Equal => continue,
            DiffTag::Delete => EditKind::Deletion,
            DiffTag::Insert => EditKind::Insertion,
            DiffTag::Replace => EditKind::Substitution,
        };

        edits.push(Edit {
            kind,
            original: old_tokens[old_range].to_vec(),
            corrected: new_tokens[new_range.clone()].to_vec(),
            position: new_range.start,
        });
    }

    edits
}
