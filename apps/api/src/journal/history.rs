//! Monthly calendar view of past entries and the latest key phrases.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::models::journal::JournalRow;

/// Key phrases shown under the calendar.
pub const RECENT_KEY_PHRASES: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub has_entry: bool,
    pub key_phrase_en: Option<String>,
    pub key_phrase_ja: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyPhrase {
    pub id: Uuid,
    pub date: NaiveDate,
    pub key_phrase_en: String,
    pub key_phrase_ja: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthHistory {
    pub year: i32,
    pub month: u32,
    pub entries: Vec<CalendarEntry>,
    pub key_phrases: Vec<KeyPhrase>,
}

/// Resolves the requested month from raw query values, falling back to
/// `today`'s year or month for anything missing, non-numeric or out of range.
pub fn resolve_month(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> (i32, u32) {
    let year = year
        .and_then(|y| y.trim().parse::<i32>().ok())
        .filter(|y| *y >= 1)
        .unwrap_or(today.year());
    let month = month
        .and_then(|m| m.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or(today.month());
    // Years beyond chrono's range cannot be represented either.
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return (today.year(), month);
    }
    (year, month)
}

/// First and last day of a month. `year`/`month` must come from `resolve_month`.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some((first, next_first.pred_opt()?))
}

/// Builds the calendar from rows ordered by date ascending.
pub fn build_month_history(year: i32, month: u32, rows: &[JournalRow]) -> MonthHistory {
    let entries = rows
        .iter()
        .map(|row| CalendarEntry {
            id: row.id,
            date: row.date,
            has_entry: true,
            key_phrase_en: row.key_phrase_en.clone(),
            key_phrase_ja: row.key_phrase_ja.clone(),
        })
        .collect();

    MonthHistory {
        year,
        month,
        entries,
        key_phrases: recent_key_phrases(rows, RECENT_KEY_PHRASES),
    }
}

/// Newest-first key phrases, one per distinct English phrase.
pub fn recent_key_phrases(rows: &[JournalRow], limit: usize) -> Vec<KeyPhrase> {
    let mut newest_first: Vec<&JournalRow> = rows
        .iter()
        .filter(|row| row.key_phrase_en.is_some())
        .collect();
    newest_first.sort_by(|a, b| b.date.cmp(&a.date));

    let mut seen = HashSet::new();
    newest_first
        .into_iter()
        .filter_map(|row| {
            let phrase = row.key_phrase_en.clone()?;
            seen.insert(phrase.clone()).then(|| KeyPhrase {
                id: row.id,
                date: row.date,
                key_phrase_en: phrase,
                key_phrase_ja: row.key_phrase_ja.clone(),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sqlx::types::Json;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(day: u32, phrase: Option<&str>) -> JournalRow {
        JournalRow {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date: date(2025, 12, day),
            sections_json: Json(vec![]),
            english_text: phrase.map(|_| "text".to_string()),
            feedback_overall: None,
            feedback_corrections_json: Json(vec![]),
            key_phrase_en: phrase.map(str::to_string),
            key_phrase_ja: phrase.map(|p| format!("{p} (ja)")),
            key_phrase_reason_ja: None,
            feedback_status: "ok".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resolve_month_falls_back_on_invalid_values() {
        let today = date(2025, 12, 7);
        assert_eq!(resolve_month(None, None, today), (2025, 12));
        assert_eq!(resolve_month(Some("2024"), Some("2"), today), (2024, 2));
        assert_eq!(resolve_month(Some("2024"), Some("13"), today), (2024, 12));
        assert_eq!(resolve_month(Some("0"), Some("0"), today), (2025, 12));
        assert_eq!(resolve_month(Some("-5"), Some("6"), today), (2025, 6));
        assert_eq!(resolve_month(Some("2147483647"), Some("6"), today), (2025, 6));
    }

    #[test]
    fn test_resolve_month_ignores_unparseable_values() {
        let today = date(2025, 12, 7);
        assert_eq!(resolve_month(Some(""), Some(""), today), (2025, 12));
        assert_eq!(resolve_month(Some("abc"), Some("June"), today), (2025, 12));
        assert_eq!(resolve_month(Some(" 2024 "), Some(" 3 "), today), (2024, 3));
        assert_eq!(resolve_month(Some("99999999999"), Some("-1"), today), (2025, 12));
    }

    #[test]
    fn test_month_bounds_handles_leap_years_and_december() {
        assert_eq!(month_bounds(2024, 2), Some((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_bounds(2025, 2), Some((date(2025, 2, 1), date(2025, 2, 28))));
        assert_eq!(month_bounds(2025, 12), Some((date(2025, 12, 1), date(2025, 12, 31))));
        assert_eq!(month_bounds(2025, 4), Some((date(2025, 4, 1), date(2025, 4, 30))));
    }

    #[test]
    fn test_recent_key_phrases_newest_unique_limited() {
        let rows = vec![
            row(1, Some("Take it easy.")),
            row(2, None),
            row(3, Some("I made it.")),
            row(4, Some("Take it easy.")),
            row(5, Some("Step by step.")),
            row(6, Some("Better late than never.")),
        ];
        let phrases = recent_key_phrases(&rows, RECENT_KEY_PHRASES);

        let texts: Vec<&str> = phrases.iter().map(|p| p.key_phrase_en.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Better late than never.", "Step by step.", "Take it easy."]
        );
        assert_eq!(phrases[2].date, date(2025, 12, 4));
    }

    #[test]
    fn test_build_month_history_lists_every_entry() {
        let rows = vec![row(1, None), row(2, Some("Hello."))];
        let history = build_month_history(2025, 12, &rows);

        assert_eq!(history.entries.len(), 2);
        assert!(history.entries.iter().all(|e| e.has_entry));
        assert!(history.entries[0].key_phrase_en.is_none());
        assert_eq!(history.key_phrases.len(), 1);
        assert_eq!(history.key_phrases[0].key_phrase_ja.as_deref(), Some("Hello. (ja)"));
    }
}
