use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers::{
    admin::{
        broadcast, get_assignment, invite_referee, reset_store, start_assignment, strike_referee,
        suspend_referee, unsuspend_referee,
    },
    offers::{get_offer, respond_to_offer},
    referees::{get_history, get_leaderboard, get_profile, rate_referee, request_leave, update_availability},
    registrations::{choose_clubs, choose_days, finish_registration},
    AppState,
};

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/admin/referees/invite", post(invite_referee))
        .route("/api/admin/referees/:user_id/suspend", post(suspend_referee))
        .route("/api/admin/referees/:user_id/unsuspend", post(unsuspend_referee))
        .route("/api/admin/referees/:user_id/strike", post(strike_referee))
        .route("/api/admin/assignments", post(start_assignment))
        .route("/api/admin/assignments/:id", get(get_assignment))
        .route("/api/admin/broadcast", post(broadcast))
        .route("/api/admin/reset", post(reset_store))
        .route("/api/referees/:user_id", get(get_profile))
        .route("/api/referees/:user_id/ratings", post(rate_referee))
        .route("/api/referees/:user_id/leave", post(request_leave))
        .route("/api/referees/:user_id/availability", put(update_availability))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/history", get(get_history))
        .route("/api/registrations/:user_id/clubs", post(choose_clubs))
        .route("/api/registrations/:user_id/days", post(choose_days))
        .route("/api/registrations/:user_id/finish", post(finish_registration))
        .route("/api/offers/:id", get(get_offer))
        .route("/api/offers/:id/respond", post(respond_to_offer))
        .with_state(state)
}
