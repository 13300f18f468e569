use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::journal::classifier::JournalSection;
use crate::journal::feedback::{Correction, FeedbackResult};

/// One row of `journals`: a user's entry for one calendar date.
#[derive(Debug, Clone, FromRow)]
pub struct JournalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sections_json: Json<Vec<JournalSection>>,
    pub english_text: Option<String>,
    pub feedback_overall: Option<String>,
    pub feedback_corrections_json: Json<Vec<Correction>>,
    pub key_phrase_en: Option<String>,
    pub key_phrase_ja: Option<String>,
    pub key_phrase_reason_ja: Option<String>,
    pub feedback_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalRow {
    pub fn feedback(&self) -> FeedbackResult {
        FeedbackResult {
            english_text: self.english_text.clone(),
            overall_comment: self.feedback_overall.clone(),
            corrections: self.feedback_corrections_json.0.clone(),
            key_phrase_english: self.key_phrase_en.clone(),
            key_phrase_japanese: self.key_phrase_ja.clone(),
            key_phrase_reason: self.key_phrase_reason_ja.clone(),
        }
    }
}

/// Display-time classification of an entry's feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    /// The model produced feedback.
    Ok,
    /// No section was long enough; the model was not called.
    SkippedShort,
    /// The model was called and failed or returned unusable output.
    Error,
}

impl FeedbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackStatus::Ok => "ok",
            FeedbackStatus::SkippedShort => "skipped_short",
            FeedbackStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ok" => Some(FeedbackStatus::Ok),
            "skipped_short" => Some(FeedbackStatus::SkippedShort),
            "error" => Some(FeedbackStatus::Error),
            _ => None,
        }
    }
}
