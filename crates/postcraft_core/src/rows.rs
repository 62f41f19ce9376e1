//! crates/postcraft_core/src/rows.rs
//!
//! Loosely-typed rows as they come back from the persistence layer, and the strict
//! parse that turns them into domain values at the core's boundary.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Post, PostStatus, Prompt};
use crate::schedule::ScheduleDate;

/// A row that could not be turned into a domain value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct RowError {
    pub field: &'static str,
    pub reason: String,
}

impl RowError {
    fn missing(field: &'static str) -> Self {
        Self {
            field,
            reason: "missing".to_string(),
        }
    }
}

//=========================================================================================
// Raw Row Shapes
//=========================================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptRow {
    pub id: Option<Uuid>,
    pub category: Option<String>,
    pub hook: Option<String>,
    pub prompt_text: Option<String>,
    pub is_used: Option<bool>,
    pub scheduled_date: Option<String>,
    pub pushed_to_calendar: Option<bool>,
    pub pillar_number: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostRow {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub content_type: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

//=========================================================================================
// Strict Parse
//=========================================================================================

impl TryFrom<PromptRow> for Prompt {
    type Error = RowError;

    fn try_from(row: PromptRow) -> Result<Self, Self::Error> {
        let id = row.id.ok_or_else(|| RowError::missing("id"))?;
        let prompt_text = row
            .prompt_text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| RowError::missing("prompt_text"))?;

        // An empty string is how the dashboard clears a schedule.
        let scheduled_date = match row.scheduled_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<ScheduleDate>().map_err(|e| RowError {
                field: "scheduled_date",
                reason: e.to_string(),
            })?),
        };

        Ok(Prompt {
            id,
            category: row.category.unwrap_or_default(),
            hook: row.hook.unwrap_or_default(),
            prompt_text,
            is_used: row.is_used.unwrap_or(false),
            scheduled_date,
            pushed_to_calendar: row.pushed_to_calendar.unwrap_or(false),
            pillar_number: row.pillar_number,
        })
    }
}

impl TryFrom<PostRow> for Post {
    type Error = RowError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let id = row.id.ok_or_else(|| RowError::missing("id"))?;
        let created_at = row.created_at.ok_or_else(|| RowError::missing("created_at"))?;
        let status = match row.status.as_deref() {
            None => PostStatus::Draft,
            Some(raw) => raw.parse::<PostStatus>().map_err(|reason| RowError {
                field: "status",
                reason,
            })?,
        };

        Ok(Post {
            id,
            title: row.title.unwrap_or_default(),
            content: row.content.unwrap_or_default(),
            status,
            content_type: row.content_type.unwrap_or_else(|| "text".to_string()),
            posted_at: row.posted_at,
            created_at,
        })
    }
}

/// Parses every row, keeping the good ones and logging and dropping the rest.
pub fn parse_rows<R, T>(kind: &str, rows: impl IntoIterator<Item = R>) -> Vec<T>
where
    T: TryFrom<R, Error = RowError>,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match T::try_from(row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(kind, index, error = %e, "Dropping malformed row");
                None
            }
        })
        .collect()
}
