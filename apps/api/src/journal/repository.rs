use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::journal::classifier::JournalSection;
use crate::journal::feedback::FeedbackResult;
use crate::models::journal::{FeedbackStatus, JournalRow};

/// Parameters for writing one day's entry.
pub struct UpsertParams<'a> {
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub sections: &'a [JournalSection],
    pub feedback: &'a FeedbackResult,
    pub status: FeedbackStatus,
}

/// Inserts the entry for (user, date) or overwrites the existing one.
/// Sections are stored verbatim. Concurrent submissions for the same day are last-write-wins.
pub async fn upsert_journal(pool: &PgPool, params: UpsertParams<'_>) -> Result<Uuid, sqlx::Error> {
    let UpsertParams {
        user_id,
        date,
        sections,
        feedback,
        status,
    } = params;

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO journals
            (id, user_id, date, sections_json, english_text, feedback_overall,
             feedback_corrections_json, key_phrase_en, key_phrase_ja,
             key_phrase_reason_ja, feedback_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id, date) DO UPDATE SET
            sections_json             = EXCLUDED.sections_json,
            english_text              = EXCLUDED.english_text,
            feedback_overall          = EXCLUDED.feedback_overall,
            feedback_corrections_json = EXCLUDED.feedback_corrections_json,
            key_phrase_en             = EXCLUDED.key_phrase_en,
            key_phrase_ja             = EXCLUDED.key_phrase_ja,
            key_phrase_reason_ja      = EXCLUDED.key_phrase_reason_ja,
            feedback_status           = EXCLUDED.feedback_status,
            updated_at                = NOW()
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(Json(sections))
    .bind(&feedback.english_text)
    .bind(&feedback.overall_comment)
    .bind(Json(&feedback.corrections))
    .bind(&feedback.key_phrase_english)
    .bind(&feedback.key_phrase_japanese)
    .bind(&feedback.key_phrase_reason)
    .bind(status.as_str())
    .fetch_one(pool)
    .await?;

    info!(
        "Stored journal {} for user {} on {} (feedback: {})",
        id,
        user_id,
        date,
        status.as_str()
    );
    Ok(id)
}

pub async fn get_journal(pool: &PgPool, id: Uuid) -> Result<Option<JournalRow>, sqlx::Error> {
    sqlx::query_as::<_, JournalRow>("SELECT * FROM journals WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Entries of one user with `start <= date <= end`, oldest first.
pub async fn list_journals_between(
    pool: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<JournalRow>, sqlx::Error> {
    sqlx::query_as::<_, JournalRow>(
        r#"
        SELECT * FROM journals
        WHERE user_id = $1 AND date BETWEEN $2 AND $3
        ORDER BY date
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}
