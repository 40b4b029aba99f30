use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiError, ApiResult, AppState};
use crate::api::models::{
    BroadcastRequest, InviteRequest, MessageResponse, ReasonRequest, RegistrationView, ResetRequest,
    SessionStarted, StrikeResponse,
};
use crate::errors::OpsError;
use crate::services::AssignmentRequest;

pub async fn invite_referee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<InviteRequest>,
) -> ApiResult<impl IntoResponse> {
    state.require_admin(&headers)?;

    let registration = state
        .registrations
        .invite(&body.user_id, &body.name, body.category)
        .await?;
    Ok((StatusCode::CREATED, Json(RegistrationView::from(registration))))
}

pub async fn suspend_referee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    body: Option<Json<ReasonRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    state.require_admin(&headers)?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    state.roster.suspend(&user_id, body.reason_or_default()).await?;
    Ok(Json(MessageResponse::new(format!("{} suspended", user_id))))
}

pub async fn unsuspend_referee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.require_admin(&headers)?;

    state.roster.unsuspend(&user_id).await?;
    Ok(Json(MessageResponse::new(format!("{} reactivated", user_id))))
}

pub async fn strike_referee(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    body: Option<Json<ReasonRequest>>,
) -> ApiResult<Json<StrikeResponse>> {
    state.require_admin(&headers)?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let strikes = state.roster.add_strike(&user_id, body.reason_or_default()).await?;
    Ok(Json(StrikeResponse {
        strikes,
        max: state.config.league.max_strikes,
    }))
}

pub async fn start_assignment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<AssignmentRequest>,
) -> ApiResult<impl IntoResponse> {
    state.require_admin(&headers)?;

    let session_id = state.assignments.start(request)?;
    log::info!("Admin started assignment session {}", session_id);
    Ok((StatusCode::ACCEPTED, Json(SessionStarted { session_id })))
}

pub async fn get_assignment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(session_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state.require_admin(&headers)?;

    state
        .sessions
        .get(session_id)
        .map(Json)
        .ok_or_else(|| ApiError::from(OpsError::InvalidTarget(format!("no session {}", session_id))))
}

pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<BroadcastRequest>,
) -> ApiResult<impl IntoResponse> {
    state.require_admin(&headers)?;

    let sent_by = body.sent_by.as_deref().unwrap_or("admin");
    let report = state.broadcasts.broadcast(&body.message, sent_by).await?;
    Ok(Json(report))
}

pub async fn reset_store(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<ResetRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    state.require_admin(&headers)?;

    let body = body.map(|Json(b)| b).unwrap_or_default();
    let requested_by = body.requested_by.as_deref().unwrap_or("admin");
    state.roster.reset(requested_by).await?;
    Ok(Json(MessageResponse::new("Database wiped")))
}
