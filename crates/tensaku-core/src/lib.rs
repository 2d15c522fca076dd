//! tensaku-core: grammar-correction explanation engine
//!
//! Given a student's original English sentence and its corrected version,
//! this crate produces a numbered list of corrected parts, each with a
//! single concise Japanese reason:
//!
//! ```text
//! 1. go→went:過去の出来事を表すため、過去形 'went' を使う必要があります。
//! ```
//!
//! The pipeline is: word-level diff (deterministic) → reason inference
//! (pluggable: rule engine or LLM) → validation → rendering. The LLM path
//! retries on malformed output and can fall back to the rule engine.

pub mod backend;
pub mod diff;
pub mod error;
pub mod explain;
pub mod openai;
pub mod parse;
pub mod prompts;
pub mod reason;
pub mod review;
pub mod rules;
pub mod types;

pub use backend::{ChatBackend, LoggingBackend, MockBackend, SharedBackend, with_retry};
pub use diff::{Edit, EditKind, sentence_edits, tokenize};
pub use error::{Result, TensakuError};
pub use explain::{ExplanationItem, ExplanationList, NO_CORRECTIONS_LINE};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use parse::{contains_japanese, parse_explanations};
pub use prompts::TUTOR_PROMPT;
pub use reason::{LlmReasoner, ReasonInference, RuleBasedReasoner};
pub use review::{Reviewer, align_items, validate_items};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatRole, FinishReason, Usage};
