//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the schedule, calendar and dashboard endpoints and
//! the master definition for the OpenAPI specification.

use crate::web::{prompts, state::AppState};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use postcraft_core::{
    calendar::{build_calendar_in, calendar_range},
    domain::{CalendarDay, Post, Profile, Prompt},
    format::{day_name, short_display},
    ports::PortError,
    schedule::{
        generate_schedule, next_schedule_date, parse_date_key, schedule_count_from_f64, validate,
        Validation,
    },
    stats::{dashboard_stats, DashboardStats},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

/// Largest schedule a single request may ask for (about three years of M/W/F dates).
pub const MAX_SCHEDULE_COUNT: i64 = 468;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        next_date_handler,
        schedule_handler,
        validate_date_handler,
        calendar_handler,
        dashboard_stats_handler,
        prompts::reschedule_prompt_handler,
        prompts::mark_prompt_used_handler,
        prompts::generate_prompts_handler,
    ),
    components(
        schemas(
            NextDateResponse,
            ScheduleResponse,
            ValidateDateRequest,
            ValidationResponse,
            prompts::RescheduleRequest,
            prompts::GeneratePromptsRequest,
        )
    ),
    tags(
        (name = "Postcraft API", description = "Content scheduling and calendar endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Helpers
//=========================================================================================

/// Maps a port failure to an HTTP status, logging the unexpected ones.
pub fn port_error_response(context: &str, e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Invalid(msg) => (StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        PortError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
        PortError::Unexpected(msg) => {
            error!("{}: {}", context, msg);
            (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
        }
    }
}

fn parse_optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, (StatusCode, String)> {
    value
        .map(|raw| {
            parse_date_key(raw).map_err(|e| (StatusCode::BAD_REQUEST, format!("{}: {}", field, e)))
        })
        .transpose()
}

/// The viewer's timezone: the given UTC offset in minutes, or the server's own.
fn resolve_offset(minutes: Option<i32>) -> Result<FixedOffset, (StatusCode, String)> {
    match minutes {
        None => Ok(Local::now().offset().fix()),
        Some(minutes) => minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("utcOffsetMinutes out of range: {}", minutes),
                )
            }),
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NextDateQuery {
    /// Reference date (`YYYY-MM-DD`); defaults to today.
    pub from: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct NextDateResponse {
    pub date: String,
    pub display: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScheduleQuery {
    /// Number of dates to generate; must be a non-negative integer.
    pub count: f64,
    /// First candidate date (`YYYY-MM-DD`); defaults to today.
    pub start: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub dates: Vec<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ValidateDateRequest {
    pub date: String,
}

#[derive(Serialize, ToSchema)]
pub struct ValidationResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Validation> for ValidationResponse {
    fn from(v: Validation) -> Self {
        Self {
            valid: v.valid,
            reason: v.reason,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CalendarQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Viewer's offset from UTC in minutes (east positive).
    pub utc_offset_minutes: Option<i32>,
}

/// A calendar day with its display labels.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDayView {
    #[serde(flatten)]
    pub day: CalendarDay,
    pub display: String,
    pub day_name: String,
}

impl CalendarDayView {
    fn new(day: CalendarDay) -> Self {
        Self {
            display: short_display(&day.date),
            day_name: day_name(&day.date),
            day,
        }
    }
}

//=========================================================================================
// Schedule Handlers
//=========================================================================================

/// The next Monday, Wednesday or Friday on or after a date.
#[utoipa::path(
    get,
    path = "/schedule/next",
    params(NextDateQuery),
    responses(
        (status = 200, description = "Next schedule date", body = NextDateResponse),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn next_date_handler(
    Query(query): Query<NextDateQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let from = parse_optional_date("from", query.from.as_deref())?;
    let date = next_schedule_date(from)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
        .key();
    Ok(Json(NextDateResponse {
        display: short_display(&date),
        date,
    }))
}

/// A run of consecutive schedule dates.
#[utoipa::path(
    get,
    path = "/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Schedule dates in order", body = ScheduleResponse),
        (status = 400, description = "Invalid count or malformed start date")
    )
)]
pub async fn schedule_handler(
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let start = parse_optional_date("start", query.start.as_deref())?;
    let count =
        schedule_count_from_f64(query.count).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    if count > MAX_SCHEDULE_COUNT {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("count may not exceed {}", MAX_SCHEDULE_COUNT),
        ));
    }
    let dates = generate_schedule(count, start)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
        .iter()
        .map(|d| d.key())
        .collect();
    Ok(Json(ScheduleResponse { dates }))
}

/// Checks a user-entered schedule date.
#[utoipa::path(
    post,
    path = "/schedule/validate",
    request_body = ValidateDateRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ValidationResponse)
    )
)]
pub async fn validate_date_handler(Json(req): Json<ValidateDateRequest>) -> impl IntoResponse {
    Json(ValidationResponse::from(validate(&req.date)))
}

//=========================================================================================
// Calendar and Dashboard Handlers
//=========================================================================================

/// Fetches a user's prompts and posts concurrently. A failed fetch is logged and
/// treated as an empty collection.
async fn fetch_content(state: &AppState, profile: &Profile) -> (Vec<Prompt>, Vec<Post>) {
    let (prompts, posts) = tokio::join!(
        state.db.get_prompts_for_user(profile.user_id),
        state.db.get_posts_for_user(profile.user_id),
    );
    let prompts = prompts.unwrap_or_else(|e| {
        warn!(user_id = %profile.user_id, "Failed to fetch prompts: {:?}", e);
        Vec::new()
    });
    let posts = posts.unwrap_or_else(|e| {
        warn!(user_id = %profile.user_id, "Failed to fetch posts: {:?}", e);
        Vec::new()
    });
    (prompts, posts)
}

/// The user's calendar: one entry per day with prompts or posts.
#[utoipa::path(
    get,
    path = "/calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar days in date order, each with `display` and `dayName` labels"),
        (status = 400, description = "Malformed range or offset"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn calendar_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let from = parse_optional_date("from", query.from.as_deref())?;
    let to = parse_optional_date("to", query.to.as_deref())?;
    let tz = resolve_offset(query.utc_offset_minutes)?;

    let (prompts, posts) = fetch_content(&state, &profile).await;
    let calendar = build_calendar_in(&prompts, &posts, &tz);

    let days: Vec<CalendarDayView> = calendar_range(&calendar, from, to)
        .into_iter()
        .cloned()
        .map(CalendarDayView::new)
        .collect();
    Ok(Json(days))
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct StatsQuery {
    pub utc_offset_minutes: Option<i32>,
}

/// Counters for the dashboard header.
#[utoipa::path(
    get,
    path = "/dashboard/stats",
    params(StatsQuery),
    responses(
        (status = 200, description = "Dashboard counters"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<DashboardStats>, (StatusCode, String)> {
    let tz = resolve_offset(query.utc_offset_minutes)?;
    let today = Utc::now().with_timezone(&tz).date_naive();
    let (prompts, posts) = fetch_content(&state, &profile).await;
    Ok(Json(dashboard_stats(&prompts, &posts, today, &tz)))
}
