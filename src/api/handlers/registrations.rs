use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;

use super::{ApiResult, AppState};
use crate::api::models::{ClubsRequest, DaysRequest, RegistrationComplete, RegistrationView};

pub async fn choose_clubs(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<ClubsRequest>,
) -> ApiResult<Json<RegistrationView>> {
    let registration = state.registrations.choose_clubs(&user_id, body.clubs)?;
    Ok(Json(registration.into()))
}

pub async fn choose_days(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<DaysRequest>,
) -> ApiResult<Json<RegistrationView>> {
    let registration = state.registrations.choose_days(&user_id, body.days)?;
    Ok(Json(registration.into()))
}

pub async fn finish_registration(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<RegistrationComplete>> {
    let referee_id = state.registrations.finish(&user_id).await?;
    Ok(Json(RegistrationComplete { user_id, referee_id }))
}
