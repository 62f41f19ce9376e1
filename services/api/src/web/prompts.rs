//! services/api/src/web/prompts.rs
//!
//! Handlers that change prompt rows: rescheduling, marking as used, and the admin
//! batch generation that stamps new prompts with schedule dates.

use crate::web::{rest::port_error_response, state::AppState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use postcraft_core::{
    domain::{Profile, Prompt},
    schedule::{assign_schedule, parse_date_key, schedule_count_from_f64, ScheduleDate},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    /// New date (`YYYY-MM-DD`); must be a Monday, Wednesday or Friday.
    pub scheduled_date: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePromptsRequest {
    /// The user the prompts are written for.
    pub user_id: Uuid,
    pub count: f64,
    pub start_date: Option<String>,
    pub pillar_number: Option<i32>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Moves a prompt to a different schedule date.
#[utoipa::path(
    patch,
    path = "/prompts/{id}/schedule",
    request_body = RescheduleRequest,
    params(("id" = Uuid, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Prompt rescheduled"),
        (status = 404, description = "No such prompt for this user"),
        (status = 422, description = "Date is malformed or not a Monday, Wednesday or Friday")
    )
)]
pub async fn reschedule_prompt_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(prompt_id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let date = req
        .scheduled_date
        .parse::<ScheduleDate>()
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let prompt = state
        .db
        .reschedule_prompt(profile.user_id, prompt_id, date)
        .await
        .map_err(|e| port_error_response("Failed to reschedule prompt", e))?;

    info!(user_id = %profile.user_id, %prompt_id, date = %date, "Prompt rescheduled");
    Ok(Json(prompt))
}

/// Marks a prompt as used.
#[utoipa::path(
    post,
    path = "/prompts/{id}/use",
    params(("id" = Uuid, Path, description = "Prompt id")),
    responses(
        (status = 200, description = "Prompt marked as used"),
        (status = 404, description = "No such prompt for this user")
    )
)]
pub async fn mark_prompt_used_handler(
    State(state): State<Arc<AppState>>,
    Extension(profile): Extension<Profile>,
    Path(prompt_id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let prompt = state
        .db
        .mark_prompt_used(profile.user_id, prompt_id)
        .await
        .map_err(|e| port_error_response("Failed to mark prompt as used", e))?;
    Ok(Json(prompt))
}

/// Generates a batch of prompts for a user and schedules them on consecutive
/// Monday/Wednesday/Friday dates. Admin only.
#[utoipa::path(
    post,
    path = "/admin/prompts/generate",
    request_body = GeneratePromptsRequest,
    responses(
        (status = 201, description = "Prompts generated and scheduled"),
        (status = 400, description = "Invalid count or start date"),
        (status = 403, description = "Caller is not an admin"),
        (status = 503, description = "No LLM is configured")
    )
)]
pub async fn generate_prompts_handler(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<Profile>,
    Json(req): Json<GeneratePromptsRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let count =
        schedule_count_from_f64(req.count).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let max = state.config.max_prompt_batch;
    let count = usize::try_from(count)
        .ok()
        .filter(|count| *count <= max)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("count may not exceed {}", max)))?;
    let start = req
        .start_date
        .as_deref()
        .map(parse_date_key)
        .transpose()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("startDate: {}", e)))?;

    let generator = state.prompt_adapter.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Prompt generation is not configured".to_string(),
        )
    })?;

    if count == 0 {
        return Ok((StatusCode::CREATED, Json(Vec::<Prompt>::new())));
    }

    let generated = generator
        .generate_prompts(count, req.pillar_number)
        .await
        .map_err(|e| {
            error!("Prompt generation failed: {:?}", e);
            (StatusCode::BAD_GATEWAY, "Prompt generation failed".to_string())
        })?;

    let stamped =
        assign_schedule(generated, start).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let inserted = state
        .db
        .insert_prompts(req.user_id, stamped)
        .await
        .map_err(|e| port_error_response("Failed to save generated prompts", e))?;

    info!(
        admin_id = %admin.user_id,
        user_id = %req.user_id,
        count = inserted.len(),
        "Generated and scheduled prompts"
    );
    Ok((StatusCode::CREATED, Json(inserted)))
}
