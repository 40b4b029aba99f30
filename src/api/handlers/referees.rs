use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use std::sync::Arc;

use super::{ApiResult, AppState};
use crate::api::models::{DaysRequest, LeaderboardParams, LeaveRequest, MessageResponse, RateRequest};
use crate::domain::{Day, HistoryEntry, LeaderboardRow, LeaderboardSort, RefereeProfile};
use crate::errors::OpsError;
use crate::services::LeaveOutcome;

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RefereeProfile>> {
    Ok(Json(state.roster.profile(&user_id)?))
}

pub async fn rate_referee(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<RateRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .roster
        .rate(&body.author, &body.author_name, &user_id, body.stars, &body.comment)
        .await?;
    Ok(Json(MessageResponse::new("Rating submitted")))
}

pub async fn request_leave(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<LeaveRequest>,
) -> ApiResult<Json<LeaveOutcome>> {
    let outcome = state.roster.request_leave(&user_id, body.days, &body.reason).await?;
    Ok(Json(outcome))
}

pub async fn update_availability(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<DaysRequest>,
) -> ApiResult<Json<Vec<Day>>> {
    Ok(Json(state.roster.update_availability(&user_id, body.days)?))
}

pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> ApiResult<Json<Vec<LeaderboardRow>>> {
    let sort_by = match params.sort_by.as_deref() {
        Some(raw) => raw.parse::<LeaderboardSort>().map_err(OpsError::InvalidInput)?,
        None => LeaderboardSort::default(),
    };
    Ok(Json(state.roster.leaderboard(sort_by)))
}

pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.roster.history())
}
