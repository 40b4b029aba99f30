use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{ApiResult, AppState};
use crate::api::models::{OfferView, RespondRequest, RespondResponse};
use crate::errors::OpsError;

pub async fn get_offer(
    State(state): State<Arc<AppState>>,
    Path(offer_id): Path<Uuid>,
) -> ApiResult<Json<OfferView>> {
    let offer = state
        .offers
        .get(offer_id)
        .await
        .ok_or(OpsError::OfferNotFound(offer_id))?;
    Ok(Json(offer.into()))
}

pub async fn respond_to_offer(
    State(state): State<Arc<AppState>>,
    Path(offer_id): Path<Uuid>,
    Json(body): Json<RespondRequest>,
) -> ApiResult<Json<RespondResponse>> {
    state
        .offers
        .respond(offer_id, &body.user_id, body.decision)
        .await?;
    log::info!("{} answered offer {}: {:?}", body.user_id, offer_id, body.decision);
    Ok(Json(RespondResponse {
        offer_id,
        decision: body.decision,
    }))
}
