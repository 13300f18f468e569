//! Axum route handlers for the Journal API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::journal::history::{build_month_history, month_bounds, resolve_month, MonthHistory};
use crate::journal::repository::{get_journal, list_journals_between};
use crate::journal::service::{submit_journal, JournalDetail, SubmitJournalRequest};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    /// Kept as text so that empty or malformed values fall back to the current month.
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub today: NaiveDate,
}

/// GET /api/v1/journals/today
///
/// The date the entry form should default to.
pub async fn handle_today() -> Json<TodayResponse> {
    Json(TodayResponse {
        today: Local::now().date_naive(),
    })
}

/// POST /api/v1/journals
///
/// Stores the day's entry (replacing any earlier one for the same date) and
/// returns it with its feedback. Model failures surface as `feedback_status`,
/// never as an error response.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitJournalRequest>,
) -> Result<Json<JournalDetail>, AppError> {
    let detail = submit_journal(&state.db, state.llm.as_ref(), request).await?;
    Ok(Json(detail))
}

/// GET /api/v1/journals/:id
pub async fn handle_get_journal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<JournalDetail>, AppError> {
    let row = get_journal(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Journal {id} not found")))?;

    if row.user_id != params.user_id {
        return Err(AppError::Forbidden);
    }

    Ok(Json(JournalDetail::try_from(row)?))
}

/// GET /api/v1/journals/history
///
/// Calendar data for one month plus the latest distinct key phrases in it.
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<MonthHistory>, AppError> {
    let (year, month) = resolve_month(
        params.year.as_deref(),
        params.month.as_deref(),
        Local::now().date_naive(),
    );
    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| AppError::Validation(format!("{year}-{month:02} is out of range")))?;

    let rows = list_journals_between(&state.db, params.user_id, start, end).await?;

    Ok(Json(build_month_history(year, month, &rows)))
}
