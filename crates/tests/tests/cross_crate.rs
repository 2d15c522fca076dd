//! Cross-crate integration and E2E tests
//!
//! These tests run full sentence pairs through the review pipeline and
//! verify the output contract: numbered lines, one Japanese reason per
//! corrected part, no duplicates, no omissions.

use std::sync::Arc;

use tensaku_core::{
    LlmReasoner, MockBackend, NO_CORRECTIONS_LINE, ReasonInference, Reviewer, RuleBasedReasoner,
    contains_japanese, sentence_edits,
};

/// Every rendered line must match `N. <part>:<reason>` with N contiguous
/// from 1.
fn assert_output_shape(rendered: &str) {
    for (i, line) in rendered.lines().enumerate() {
        let prefix = format!("{}. ", i + 1);
        assert!(
            line.starts_with(&prefix),
            "line {} does not start with {:?}: {}",
            i + 1,
            prefix,
            line
        );

        let rest = &line[prefix.len()..];
        let (part, reason) = rest.split_once(':').expect("line has no colon");
        assert!(!part.is_empty(), "empty part in: {}", line);
        assert!(!reason.is_empty(), "empty reason in: {}", line);
    }
}

/// The worked example: past-tense correction.
#[tokio::test]
async fn test_e2e_past_tense_example() {
    let reviewer = Reviewer::new(Arc::new(RuleBasedReasoner::new()));

    let list = reviewer
        .review("I go to school yesterday.", "I went to school yesterday.")
        .await
        .unwrap();

    assert_eq!(
        list.render(),
        "1. go→went:過去の出来事を表すため、過去形 'went' を使う必要があります。"
    );
}

/// Multi-edit sentence through the rule engine: one item per edit, sentence
/// order, all reasons Japanese.
#[tokio::test]
async fn test_e2e_rule_engine_multi_edit() {
    let original = "She go to library and buyed a book.";
    let corrected = "She goes to the library and bought a book.";

    let reviewer = Reviewer::new(Arc::new(RuleBasedReasoner::new()));
    let list = reviewer.review(original, corrected).await.unwrap();

    let edits = sentence_edits(original, corrected);
    assert_eq!(list.len(), edits.len());

    // One item per distinct part, no duplicates.
    let mut parts: Vec<&str> = list.items.iter().map(|i| i.part.as_str()).collect();
    parts.sort_unstable();
    parts.dedup();
    assert_eq!(parts.len(), list.len());

    for item in &list.items {
        assert!(contains_japanese(&item.reason), "not Japanese: {}", item.reason);
    }

    assert_output_shape(&list.render());
}

/// Full LLM path with a mock backend returning a well-formed list.
#[tokio::test]
async fn test_e2e_llm_pipeline() {
    let backend = Arc::new(MockBackend::with_text(
        "1. go→went:過去の出来事を表すため、過去形 'went' を使う必要があります。",
    ));
    let reasoner = LlmReasoner::new(backend.clone(), "test-model");
    let reviewer = Reviewer::new(Arc::new(reasoner) as Arc<dyn ReasonInference>);

    let list = reviewer
        .review("I go to school yesterday.", "I went to school yesterday.")
        .await
        .unwrap();

    assert_eq!(list.len(), 1);
    assert_output_shape(&list.render());
    assert_eq!(backend.request_count(), 1);
}

/// The LLM gets two chances, then the rule engine takes over.
#[tokio::test]
async fn test_e2e_llm_retry_then_fallback() {
    let backend = Arc::new(MockBackend::with_texts(vec![
        "Here are your corrections, in English!".to_string(),
        "still not a numbered list".to_string(),
    ]));
    let reasoner = LlmReasoner::new(backend.clone(), "test-model").with_max_attempts(2);

    let reviewer = Reviewer::new(Arc::new(reasoner) as Arc<dyn ReasonInference>)
        .with_fallback(Arc::new(RuleBasedReasoner::new()));

    let list = reviewer
        .review("I have pen.", "I have a pen.")
        .await
        .unwrap();

    assert_eq!(backend.request_count(), 2);
    assert_eq!(list.len(), 1);
    assert_eq!(list.items[0].part, "+a");
    assert!(contains_japanese(&list.items[0].reason));
}

/// A mock model that shuffles order and pads with prose still comes out as a
/// clean, sentence-ordered list.
#[tokio::test]
async fn test_e2e_llm_output_is_reordered() {
    let backend = Arc::new(MockBackend::with_text(
        "以下が修正点です。\n\
         1. +the:特定の場所なので定冠詞が必要です。\n\
         2. go→goes:主語が三人称単数だからです。\n\
         以上です。",
    ));
    let reasoner = LlmReasoner::new(backend, "test-model");
    let reviewer = Reviewer::new(Arc::new(reasoner) as Arc<dyn ReasonInference>);

    let list = reviewer
        .review("She go to library.", "She goes to the library.")
        .await
        .unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list.items[0].part, "go→goes");
    assert_eq!(list.items[1].part, "+the");
    assert_output_shape(&list.render());
}

/// Identical sentences produce the fixed no-corrections line without any
/// backend traffic.
#[tokio::test]
async fn test_e2e_identical_sentences_skip_backend() {
    let backend = Arc::new(MockBackend::new(vec![]));
    let reasoner = LlmReasoner::new(backend.clone(), "test-model");
    let reviewer = Reviewer::new(Arc::new(reasoner) as Arc<dyn ReasonInference>);

    let list = reviewer
        .review("I went home.", "I went home.")
        .await
        .unwrap();

    assert!(list.is_empty());
    assert_eq!(list.render(), NO_CORRECTIONS_LINE);
    assert_eq!(backend.request_count(), 0);
}

/// Diff determinism across repeated runs (same pair, same edit set).
#[tokio::test]
async fn test_e2e_stable_parts_across_runs() {
    let original = "He like apple and banana yesterday.";
    let corrected = "He liked apples and bananas yesterday.";

    let reviewer = Reviewer::new(Arc::new(RuleBasedReasoner::new()));

    let first = reviewer.review(original, corrected).await.unwrap();
    let second = reviewer.review(original, corrected).await.unwrap();

    let parts = |l: &tensaku_core::ExplanationList| {
        l.items.iter().map(|i| i.part.clone()).collect::<Vec<_>>()
    };
    assert_eq!(parts(&first), parts(&second));
}
