use std::sync::Arc;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};

use crate::api::models::ErrorBody;
use crate::config::settings::AppConfig;
use crate::config::ClubRoster;
use crate::delivery::{AuditLog, Notifier};
use crate::domain::RegistrationError;
use crate::errors::OpsError;
use crate::services::{
    AssignmentService, BroadcastService, OfferBook, RegistrationService, RosterService, SessionBoard,
};
use crate::store::DataStore;

pub mod admin;
pub mod offers;
pub mod referees;
pub mod registrations;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<DataStore>,
    pub offers: Arc<OfferBook>,
    pub sessions: Arc<SessionBoard>,
    pub assignments: Arc<AssignmentService>,
    pub registrations: RegistrationService,
    pub roster: RosterService,
    pub broadcasts: BroadcastService,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        let offers = Arc::new(OfferBook::new());
        let sessions = Arc::new(SessionBoard::new());
        let assignments = Arc::new(AssignmentService::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            Arc::clone(&audit),
            Arc::clone(&offers),
            Arc::clone(&sessions),
            config.offers.clone(),
        ));
        let registrations = RegistrationService::new(
            Arc::clone(&store),
            Arc::clone(&notifier),
            Arc::clone(&audit),
            ClubRoster::default(),
            config.league.clone(),
        );
        let roster = RosterService::new(Arc::clone(&store), Arc::clone(&audit), config.league.clone());
        let broadcasts = BroadcastService::new(
            Arc::clone(&store),
            notifier,
            audit,
            config.delivery.broadcast_delay_ms,
        );

        Self {
            config,
            store,
            offers,
            sessions,
            assignments,
            registrations,
            roster,
            broadcasts,
        }
    }

    /// Reject requests that don't carry the admin bearer token
    pub fn require_admin(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let expected = format!("Bearer {}", self.config.league.admin_token);
        let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok());
        if auth_header == Some(expected.as_str()) {
            Ok(())
        } else {
            warn!("Rejected admin request without a valid token");
            Err(ApiError::Unauthorized)
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Ops(OpsError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<OpsError> for ApiError {
    fn from(err: OpsError) -> Self {
        ApiError::Ops(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        let err = match self {
            ApiError::Unauthorized => return StatusCode::UNAUTHORIZED,
            ApiError::Ops(err) => err,
        };
        match err {
            OpsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            OpsError::InvalidTarget(_) | OpsError::OfferNotFound(_) => StatusCode::NOT_FOUND,
            OpsError::Offer(_) => StatusCode::CONFLICT,
            OpsError::Registration(RegistrationError::OutOfOrder { .. })
            | OpsError::Registration(RegistrationError::AlreadyRegistered(_)) => StatusCode::CONFLICT,
            OpsError::Registration(_) => StatusCode::BAD_REQUEST,
            OpsError::PoolExhausted => StatusCode::CONFLICT,
            OpsError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            OpsError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            OpsError::StoreWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Unauthorized => "missing or invalid admin token".to_string(),
            ApiError::Ops(err) => err.to_string(),
        };
        if status.is_server_error() {
            error!("Request failed: {}", message);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
