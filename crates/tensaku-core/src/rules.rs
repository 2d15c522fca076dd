//! Deterministic grammar rules for explaining edits.
//!
//! Rules are checked in priority order per edit and the first match wins,
//! which guarantees exactly one reason per corrected part. Every reason
//! string is Japanese. This engine backs the offline/test path and the
//! fallback when the LLM path cannot produce valid output.

use crate::diff::{Edit, EditKind};

/// Irregular verb base forms and their past tense.
const IRREGULAR_PAST: &[(&str, &str)] = &[
    ("go", "went"),
    ("eat", "ate"),
    ("buy", "bought"),
    ("see", "saw"),
    ("come", "came"),
    ("take", "took"),
    ("get", "got"),
    ("make", "made"),
    ("have", "had"),
    ("do", "did"),
    ("say", "said"),
    ("know", "knew"),
    ("think", "thought"),
    ("write", "wrote"),
    ("run", "ran"),
    ("speak", "spoke"),
    ("teach", "taught"),
    ("give", "gave"),
    ("find", "found"),
    ("tell", "told"),
];

/// Third-person singular agreement for irregular verbs.
const IRREGULAR_AGREEMENT: &[(&str, &str)] = &[("have", "has"), ("do", "does"), ("go", "goes")];

/// Common verb stems used to tell third-person `-s` apart from plural `-s`.
const COMMON_VERBS: &[&str] = &[
    "like", "want", "play", "watch", "live", "work", "study", "read", "write", "walk", "talk",
    "look", "need", "make", "take", "eat", "know", "think", "say", "get",
];

const BE_FORMS: &[&str] = &["am", "is", "are", "was", "were", "be", "been", "being"];

const ARTICLES: &[&str] = &["a", "an", "the"];

const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "to", "for", "with", "by", "from", "of", "about", "into", "during",
];

/// Produce one Japanese reason for an edit.
pub fn reason_for(edit: &Edit) -> String {
    match edit.kind {
        EditKind::Insertion => insertion_reason(edit),
        EditKind::Deletion => deletion_reason(edit),
        EditKind::Substitution => substitution_reason(edit),
    }
}

fn insertion_reason(edit: &Edit) -> String {
    if let [word] = edit.corrected.as_slice() {
        let lower = word.to_lowercase();
        if ARTICLES.contains(&lower.as_str()) {
            return format!("名詞の前に冠詞 '{}' が必要です。", word);
        }
        if PREPOSITIONS.contains(&lower.as_str()) {
            return format!("この文脈では前置詞 '{}' を補う必要があります。", word);
        }
    }
    format!(
        "'{}' を補うとより自然な英文になります。",
        edit.corrected_text()
    )
}

fn deletion_reason(edit: &Edit) -> String {
    if let [word] = edit.original.as_slice() {
        let lower = word.to_lowercase();
        if ARTICLES.contains(&lower.as_str()) {
            return format!("この文では冠詞 '{}' は不要です。", word);
        }
    }
    format!("この文では '{}' は不要です。", edit.original_text())
}

fn substitution_reason(edit: &Edit) -> String {
    // Multiword spans get the generic reason; word-shape rules below only
    // make sense for single words.
    let ([original], [corrected]) = (edit.original.as_slice(), edit.corrected.as_slice()) else {
        return generic_substitution(edit);
    };

    let orig_lower = original.to_lowercase();
    let corr_lower = corrected.to_lowercase();

    // Irregular past tense: base form replaced by its past form, or a
    // mis-regularized form ("buyed") replaced by the true past form.
    if let Some((base, past)) = IRREGULAR_PAST
        .iter()
        .find(|(_, past)| *past == corr_lower.as_str())
    {
        if orig_lower == *base || orig_lower == format!("{}ed", base) || orig_lower == format!("{}d", base) {
            return format!(
                "過去の出来事を表すため、過去形 '{}' を使う必要があります。",
                past
            );
        }
    }

    // Irregular third-person agreement (have→has, do→does, go→goes).
    if IRREGULAR_AGREEMENT
        .iter()
        .any(|(base, third)| *base == orig_lower.as_str() && *third == corr_lower.as_str())
    {
        return format!(
            "主語が三人称単数なので、'{}' を使う必要があります。",
            corrected
        );
    }

    // Be-verb agreement.
    if BE_FORMS.contains(&orig_lower.as_str()) && BE_FORMS.contains(&corr_lower.as_str()) {
        return "主語と be 動詞を一致させる必要があります。".to_string();
    }

    // a/an alternation.
    if orig_lower == "a" && corr_lower == "an" {
        return "母音の発音で始まる語の前では 'an' を使います。".to_string();
    }
    if orig_lower == "an" && corr_lower == "a" {
        return "子音の発音で始まる語の前では 'a' を使います。".to_string();
    }

    // Capitalization. Direction matters: the correction may add a capital
    // letter or remove an unneeded one.
    if orig_lower == corr_lower {
        if *corrected == "I" {
            return "英語の一人称 'I' は常に大文字で書きます。".to_string();
        }
        let starts_upper = corrected.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper {
            return format!("'{}' は大文字で書く必要があります。", corrected);
        }
        return format!("'{}' は固有名詞ではないため、小文字で書きます。", corrected);
    }

    // Regular past tense.
    if corr_lower == format!("{}ed", orig_lower) || corr_lower == format!("{}d", orig_lower) {
        return format!(
            "過去の出来事を表すため、過去形 '{}' を使います。",
            corrected
        );
    }

    // Third-person -s vs plural -s: verb list decides.
    if corr_lower == format!("{}s", orig_lower) || corr_lower == format!("{}es", orig_lower) {
        if COMMON_VERBS.contains(&orig_lower.as_str()) {
            return "主語が三人称単数なので、動詞に -s を付けます。".to_string();
        }
        return format!("複数を表すため、'{}' を複数形にします。", original);
    }

    // Preposition choice.
    if PREPOSITIONS.contains(&orig_lower.as_str()) && PREPOSITIONS.contains(&corr_lower.as_str()) {
        return format!("この文脈では前置詞 '{}' が適切です。", corrected);
    }

    // Spelling: close enough in edit distance to be a typo.
    if orig_lower.len() >= 4 && levenshtein(&orig_lower, &corr_lower) <= 2 {
        return format!("つづりの誤りです。正しくは '{}' です。", corrected);
    }

    generic_substitution(edit)
}

fn generic_substitution(edit: &Edit) -> String {
    format!(
        "'{}' よりも '{}' の方が文法的に適切です。",
        edit.original_text(),
        edit.corrected_text()
    )
}

/// Edit distance between two strings, by character.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
