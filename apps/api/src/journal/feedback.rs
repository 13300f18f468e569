//! Feedback Generator — turns the substantive journal sections into English-writing feedback.
//!
//! Flow: compose journal body → one model call → extract content → parse JSON
//!       → per-key extraction → `FeedbackResult`.
//!
//! Every failure point is a distinct `FeedbackFailure` variant. `generate()`
//! logs the failure and returns `FeedbackResult::fallback()` flagged as not
//! succeeded, so callers never see an error from this module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::journal::classifier::JournalSection;
use crate::journal::prompts::feedback_system_prompt;
use crate::llm_client::{strip_json_fences, ChatCompletion, ChatResponse, LlmError};

/// Shown to the user whenever generation could not complete.
pub const FALLBACK_MESSAGE: &str = "Feedback generation failed. Please try again later.";

/// Shown to the user when no section was long enough to send to the model.
pub const SKIPPED_SHORT_MESSAGE: &str =
    "今回は日記の内容がとても短かったため、英語フィードバックは生成していません。";

/// Corrections beyond this many are dropped.
pub const MAX_CORRECTIONS: usize = 3;

/// Longest slice of a bad payload echoed into the logs.
const LOG_EXCERPT_CHARS: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A single grammar / vocabulary / expression note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub before: String,
    pub after: String,
    pub note_ja: String,
}

/// Normalized feedback for one entry. Serialized with the same keys the model emits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub english_text: Option<String>,
    #[serde(rename = "feedback_overall")]
    pub overall_comment: Option<String>,
    #[serde(rename = "feedback_corrections", default)]
    pub corrections: Vec<Correction>,
    #[serde(rename = "key_phrase_en")]
    pub key_phrase_english: Option<String>,
    #[serde(rename = "key_phrase_ja")]
    pub key_phrase_japanese: Option<String>,
    #[serde(rename = "key_phrase_reason_ja")]
    pub key_phrase_reason: Option<String>,
}

impl FeedbackResult {
    /// The fixed result returned for every generation failure.
    pub fn fallback() -> Self {
        Self {
            overall_comment: Some(FALLBACK_MESSAGE.to_string()),
            ..Self::default()
        }
    }

    /// The fixed result recorded when the model was never called.
    pub fn skipped_short() -> Self {
        Self {
            overall_comment: Some(SKIPPED_SHORT_MESSAGE.to_string()),
            ..Self::default()
        }
    }
}

/// Why a generation attempt produced no usable feedback.
#[derive(Debug, Error)]
pub enum FeedbackFailure {
    /// Network error, timeout, non-2xx status, missing configuration or an
    /// undecodable response envelope.
    #[error("model call failed: {0}")]
    Transport(#[from] LlmError),

    #[error("model response has no content")]
    MissingContent,

    #[error("model content is not valid JSON: {source}")]
    InvalidJson {
        source: serde_json::Error,
        content: String,
    },

    #[error("model content is JSON but not an object")]
    NotAnObject,

    /// Caller skipped the `has_substantive_content` check.
    #[error("no sections to send to the model")]
    EmptyInput,
}

pub type FeedbackOutcome = Result<FeedbackResult, FeedbackFailure>;

/// What `generate` hands back: always a displayable result, plus whether it
/// came from the model or is the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub feedback: FeedbackResult,
    pub succeeded: bool,
}

impl From<FeedbackOutcome> for Generated {
    /// The one place a failure becomes the fallback result.
    fn from(outcome: FeedbackOutcome) -> Self {
        match outcome {
            Ok(feedback) => Generated {
                feedback,
                succeeded: true,
            },
            Err(failure) => {
                log_failure(&failure);
                Generated {
                    feedback: FeedbackResult::fallback(),
                    succeeded: false,
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request construction
// ────────────────────────────────────────────────────────────────────────────

/// Renders sections as `"Label (ラベル): text"`, one per line, in order.
/// Blank lines are dropped, including blank lines inside a section's text.
pub fn compose_journal_body(sections: &[JournalSection]) -> String {
    sections
        .iter()
        .map(|s| {
            let label_ja = s.label_ja.trim();
            if label_ja.is_empty() {
                format!("{}: {}", s.label_en, s.text)
            } else {
                format!("{} ({}): {}", s.label_en, label_ja, s.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ────────────────────────────────────────────────────────────────────────────
// Response validation
// ────────────────────────────────────────────────────────────────────────────

/// Stage b: the response must carry a non-empty content string.
pub fn extract_content(response: &ChatResponse) -> Result<&str, FeedbackFailure> {
    response.text().ok_or(FeedbackFailure::MissingContent)
}

/// Stage c: the content must be a JSON object.
pub fn parse_feedback_payload(content: &str) -> Result<Map<String, Value>, FeedbackFailure> {
    let value: Value = serde_json::from_str(strip_json_fences(content)).map_err(|source| {
        FeedbackFailure::InvalidJson {
            source,
            content: content.to_string(),
        }
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(FeedbackFailure::NotAnObject),
    }
}

/// Stage d: each key is read independently. A missing or wrongly typed key
/// becomes `None` (or an empty list) without failing the others.
pub fn extract_feedback(payload: &Map<String, Value>) -> FeedbackResult {
    FeedbackResult {
        english_text: string_field(payload, "english_text"),
        overall_comment: string_field(payload, "feedback_overall"),
        corrections: corrections_field(payload),
        key_phrase_english: string_field(payload, "key_phrase_en"),
        key_phrase_japanese: string_field(payload, "key_phrase_ja"),
        key_phrase_reason: string_field(payload, "key_phrase_reason_ja"),
    }
}

fn string_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn corrections_field(payload: &Map<String, Value>) -> Vec<Correction> {
    let Some(items) = payload.get("feedback_corrections").and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| Correction {
            before: string_field(item, "before").unwrap_or_default(),
            after: string_field(item, "after").unwrap_or_default(),
            note_ja: string_field(item, "note_ja").unwrap_or_default(),
        })
        .filter(|c| !(c.before.trim().is_empty() && c.after.trim().is_empty()))
        .take(MAX_CORRECTIONS)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Generation
// ────────────────────────────────────────────────────────────────────────────

/// Runs one generation attempt and reports exactly how it ended.
///
/// `sections` must be the non-empty output of `classify_sections`.
pub async fn generate_outcome(
    llm: &dyn ChatCompletion,
    sections: &[JournalSection],
) -> FeedbackOutcome {
    debug_assert!(
        !sections.is_empty(),
        "generate called without substantive sections"
    );
    if sections.is_empty() {
        return Err(FeedbackFailure::EmptyInput);
    }

    let body = compose_journal_body(sections);
    let system = feedback_system_prompt();

    let response = llm.complete(&system, &body).await?;
    let content = extract_content(&response)?;
    let payload = parse_feedback_payload(content)?;
    let feedback = extract_feedback(&payload);

    info!(
        "Feedback generated for {} section(s), {} correction(s)",
        sections.len(),
        feedback.corrections.len()
    );
    Ok(feedback)
}

/// Generates feedback, substituting `FeedbackResult::fallback()` for any failure.
///
/// `succeeded` is false only for the fallback. A model reply that simply
/// omits keys still counts as success.
pub async fn generate(llm: &dyn ChatCompletion, sections: &[JournalSection]) -> Generated {
    Generated::from(generate_outcome(llm, sections).await)
}

/// Records a failed attempt for operators. Never fails itself.
pub fn log_failure(failure: &FeedbackFailure) {
    match failure {
        FeedbackFailure::Transport(LlmError::Api { status, message }) => {
            warn!(status = *status, body = %excerpt(message), "Feedback model returned an error status");
        }
        FeedbackFailure::Transport(e) => {
            error!(error = %e, "Feedback model call failed");
        }
        FeedbackFailure::InvalidJson { source, content } => {
            warn!(error = %source, content = %excerpt(content), "Feedback content is not valid JSON");
        }
        FeedbackFailure::MissingContent | FeedbackFailure::NotAnObject => {
            warn!("Feedback generation failed: {failure}");
        }
        FeedbackFailure::EmptyInput => {
            error!("Feedback generation requested with no substantive sections");
        }
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(LOG_EXCERPT_CHARS).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
