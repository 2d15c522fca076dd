//! Reason inference strategies.
//!
//! The diffing is deterministic; working out *why* each edit was made is
//! not. That step sits behind the `ReasonInference` trait with two
//! implementations: a deterministic rule engine and an LLM-backed reasoner.

use async_trait::async_trait;

use crate::backend::SharedBackend;
use crate::diff::Edit;
use crate::error::{Result, TensakuError};
use crate::explain::{ExplanationItem, ExplanationList};
use crate::parse::parse_explanations;
use crate::prompts::{TUTOR_PROMPT, retry_message, sentence_pair_message};
use crate::review::{align_items, validate_items};
use crate::rules;
use crate::types::{ChatMessage, ChatRequest};

/// Strategy for inferring the reason behind each edit.
#[async_trait]
pub trait ReasonInference: Send + Sync {
    /// Produce one explanation per edit, in edit order.
    async fn explain(
        &self,
        original: &str,
        corrected: &str,
        edits: &[Edit],
    ) -> Result<ExplanationList>;

    /// Get the name of this strategy.
    fn name(&self) -> &str;
}

/// Deterministic reasoner backed by the grammar rule engine.
#[derive(Debug, Default)]
pub struct RuleBasedReasoner;

impl RuleBasedReasoner {
    /// Create a new rule-based reasoner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReasonInference for RuleBasedReasoner {
    async fn explain(
        &self,
        _original: &str,
        _corrected: &str,
        edits: &[Edit],
    ) -> Result<ExplanationList> {
        let items = edits
            .iter()
            .map(|edit| ExplanationItem::new(edit.part_label(), rules::reason_for(edit)))
            .collect();

        Ok(ExplanationList::new(items))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

/// LLM-backed reasoner.
///
/// Sends the instruction prompt plus the sentence pair to the chat backend,
/// parses the numbered-list output, and retries with the validation
/// complaints appended when the output is malformed.
pub struct LlmReasoner {
    backend: SharedBackend,
    model: String,
    max_attempts: u32,
}

impl LlmReasoner {
    /// Create a new LLM reasoner over the given backend.
    pub fn new(backend: SharedBackend, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            max_attempts: 3,
        }
    }

    /// Set how many attempts to make before giving up.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

#[async_trait]
impl ReasonInference for LlmReasoner {
    async fn explain(
        &self,
        original: &str,
        corrected: &str,
        edits: &[Edit],
    ) -> Result<ExplanationList> {
        let mut request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage::system(TUTOR_PROMPT),
                ChatMessage::user(sentence_pair_message(original, corrected)),
            ],
        )
        .with_temperature(0.0);

        let mut last_complaints = Vec::new();

        for attempt in 1..=self.max_attempts {
            let response = self.backend.complete(request.clone()).await?;
            let items = parse_explanations(&response.content);

            let complaints = validate_items(edits, &items);
            if complaints.is_empty() {
                // Alignment re-orders the items to sentence order; validation
                // already guaranteed a one-to-one mapping exists.
                if let Some(aligned) = align_items(edits, &items) {
                    return Ok(ExplanationList::new(aligned));
                }
            }

            tracing::debug!(
                attempt,
                max_attempts = self.max_attempts,
                complaints = complaints.len(),
                "Model output failed validation"
            );

            request.push(ChatMessage::assistant(response.content));
            request.push(ChatMessage::user(retry_message(&complaints)));
            last_complaints = complaints;
        }

        Err(TensakuError::InvalidOutput(format!(
            "model output failed validation after {} attempts: {}",
            self.max_attempts,
            last_complaints.join("; ")
        )))
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::diff::sentence_edits;
    use std::sync::Arc;

    const ORIGINAL: &str = "I go to school yesterday.";
    const CORRECTED: &str = "I went to school yesterday.";

    #[tokio::test]
    async fn test_rule_based_reasoner_one_item_per_edit() {
        let edits = sentence_edits(ORIGINAL, CORRECTED);
        let reasoner = RuleBasedReasoner::new();

        let list = reasoner.explain(ORIGINAL, CORRECTED, &edits).await.unwrap();

        assert_eq!(list.len(), edits.len());
        assert_eq!(list.items[0].part, "go→went");
        assert!(list.items[0].reason.contains("過去形"));
    }

    #[tokio::test]
    async fn test_llm_reasoner_happy_path() {
        let backend = Arc::new(MockBackend::with_text(
            "1. go→went:過去の出来事を表すため、過去形 'went' を使う必要があります。",
        ));
        let reasoner = LlmReasoner::new(backend.clone(), "test-model");

        let edits = sentence_edits(ORIGINAL, CORRECTED);
        let list = reasoner.explain(ORIGINAL, CORRECTED, &edits).await.unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list.items[0].part, "go→went");
        assert_eq!(backend.request_count(), 1);

        // The system prompt and sentence pair both go out on the wire.
        let requests = backend.requests();
        assert!(requests[0].messages[0].content.contains("英語教師"));
        assert!(requests[0].messages[1].content.contains(ORIGINAL));
    }

    #[tokio::test]
    async fn test_llm_reasoner_retries_on_english_reason() {
        let backend = Arc::new(MockBackend::with_texts(vec![
            "1. go→went:because it is past tense".to_string(),
            "1. go→went:過去の出来事なので過去形にします。".to_string(),
        ]));
        let reasoner = LlmReasoner::new(backend.clone(), "test-model");

        let edits = sentence_edits(ORIGINAL, CORRECTED);
        let list = reasoner.explain(ORIGINAL, CORRECTED, &edits).await.unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(backend.request_count(), 2);

        // The retry carried the previous output plus the complaints.
        let second = &backend.requests()[1];
        assert_eq!(second.messages.len(), 4);
        assert!(second.messages[3].content.contains("問題"));
    }

    #[tokio::test]
    async fn test_llm_reasoner_gives_up_after_max_attempts() {
        let backend = Arc::new(MockBackend::with_texts(vec![
            "garbage".to_string(),
            "garbage".to_string(),
        ]));
        let reasoner = LlmReasoner::new(backend.clone(), "test-model").with_max_attempts(2);

        let edits = sentence_edits(ORIGINAL, CORRECTED);
        let result = reasoner.explain(ORIGINAL, CORRECTED, &edits).await;

        assert!(matches!(result, Err(TensakuError::InvalidOutput(_))));
        assert_eq!(backend.request_count(), 2);
    }
}
