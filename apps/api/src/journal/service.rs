//! Journal submission — validate, decide whether to call the model, persist.
//!
//! Flow: validate → classify_sections → (skip | generate) → upsert → read back.
//!
//! `FeedbackStatus` is decided here, once, from the generator's outcome and
//! stored with the entry. Display code reads it back instead of guessing from
//! null feedback fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::journal::classifier::{
    classify_sections, has_substantive_content, JournalSection, SectionKind,
};
use crate::journal::feedback::{generate, FeedbackResult};
use crate::journal::repository::{get_journal, upsert_journal, UpsertParams};
use crate::llm_client::ChatCompletion;
use crate::models::journal::{FeedbackStatus, JournalRow};

/// Longest text accepted for a single section, in characters.
pub const SECTION_TEXT_MAX: usize = 500;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitJournalRequest {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sections: Vec<JournalSection>,
}

/// A stored entry as shown on the feedback page.
#[derive(Debug, Clone, Serialize)]
pub struct JournalDetail {
    pub id: Uuid,
    pub date: NaiveDate,
    pub sections: Vec<JournalSection>,
    pub feedback: FeedbackResult,
    pub feedback_status: FeedbackStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<JournalRow> for JournalDetail {
    type Error = AppError;

    fn try_from(row: JournalRow) -> Result<Self, Self::Error> {
        let feedback_status = FeedbackStatus::parse(&row.feedback_status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "journal {} has unknown feedback_status '{}'",
                row.id,
                row.feedback_status
            ))
        })?;
        let feedback = row.feedback();

        Ok(JournalDetail {
            id: row.id,
            date: row.date,
            sections: row.sections_json.0,
            feedback,
            feedback_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

/// Checks the submitted sections. Short-but-present answers are accepted here;
/// the classifier decides later whether they reach the model.
pub fn validate_sections(sections: &[JournalSection]) -> Result<(), AppError> {
    if sections.len() != SectionKind::ALL.len() {
        return Err(AppError::Validation(format!(
            "sections must contain exactly {} items, got {}",
            SectionKind::ALL.len(),
            sections.len()
        )));
    }

    for (index, (section, expected)) in sections.iter().zip(SectionKind::ALL).enumerate() {
        if SectionKind::from_name(&section.name) != Some(expected) {
            return Err(AppError::Validation(format!(
                "sections[{index}] must be '{}', got '{}'",
                expected.name(),
                section.name
            )));
        }
        if section.label_en.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "sections[{index}] requires labelEn"
            )));
        }
        if section.text.chars().count() > SECTION_TEXT_MAX {
            return Err(AppError::Validation(format!(
                "各セクションは{SECTION_TEXT_MAX}文字以内で入力してください。"
            )));
        }
    }

    if sections.iter().all(|s| s.text.trim().is_empty()) {
        return Err(AppError::Validation(
            "少なくとも1つのセクションに入力してください。".to_string(),
        ));
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback decision
// ────────────────────────────────────────────────────────────────────────────

/// Produces the feedback to store for `sections` and its status.
///
/// No model call is made when nothing survives classification.
pub async fn produce_feedback(
    llm: &dyn ChatCompletion,
    sections: &[JournalSection],
) -> (FeedbackResult, FeedbackStatus) {
    if !has_substantive_content(sections) {
        info!("Entry too short for feedback; skipping model call");
        return (FeedbackResult::skipped_short(), FeedbackStatus::SkippedShort);
    }
    let for_model = classify_sections(sections);

    let generated = generate(llm, &for_model).await;
    let status = if generated.succeeded {
        FeedbackStatus::Ok
    } else {
        FeedbackStatus::Error
    };
    (generated.feedback, status)
}

/// Validates, generates feedback, stores the entry and returns it as persisted.
pub async fn submit_journal(
    pool: &PgPool,
    llm: &dyn ChatCompletion,
    request: SubmitJournalRequest,
) -> Result<JournalDetail, AppError> {
    validate_sections(&request.sections)?;

    let (feedback, status) = produce_feedback(llm, &request.sections).await;

    let id = upsert_journal(
        pool,
        UpsertParams {
            user_id: request.user_id,
            date: request.date,
            sections: &request.sections,
            feedback: &feedback,
            status,
        },
    )
    .await?;

    let row = get_journal(pool, id)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("journal {id} vanished after upsert")))?;

    JournalDetail::try_from(row)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
