use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Category, Day, MatchDetails, Offer, OfferDecision, OfferState, Registration, RegistrationStep};

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub user_id: String,
    pub name: String,
    pub category: Category,
}

#[derive(Deserialize, Default)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

impl ReasonRequest {
    pub fn reason_or_default(&self) -> &str {
        self.reason.as_deref().unwrap_or("No reason given")
    }
}

#[derive(Serialize)]
pub struct StrikeResponse {
    pub strikes: u32,
    pub max: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStarted {
    pub session_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastRequest {
    pub message: String,
    #[serde(default)]
    pub sent_by: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub requested_by: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    pub author: String,
    pub author_name: String,
    pub stars: u8,
    #[serde(default)]
    pub comment: String,
}

#[derive(Deserialize)]
pub struct LeaveRequest {
    pub days: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Deserialize)]
pub struct DaysRequest {
    pub days: Vec<Day>,
}

#[derive(Deserialize)]
pub struct ClubsRequest {
    #[serde(default)]
    pub clubs: Vec<String>,
}

#[derive(Deserialize)]
pub struct LeaderboardParams {
    pub sort_by: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub user_id: String,
    pub name: String,
    pub category: Category,
    pub clubs: Vec<String>,
    pub days: Vec<Day>,
    pub step: RegistrationStep,
}

impl From<Registration> for RegistrationView {
    fn from(registration: Registration) -> Self {
        let step = registration.step();
        Self {
            user_id: registration.user_id,
            name: registration.name,
            category: registration.category,
            clubs: registration.clubs,
            days: registration.days,
            step,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationComplete {
    pub user_id: String,
    pub referee_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferView {
    pub offer_id: Uuid,
    pub candidate: String,
    pub details: MatchDetails,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    pub state: OfferState,
}

impl From<Offer> for OfferView {
    fn from(offer: Offer) -> Self {
        let state = offer.state();
        Self {
            offer_id: offer.id,
            candidate: offer.candidate,
            details: offer.details,
            issued_at: offer.issued_at,
            expires_at: offer.expires_at,
            state,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRequest {
    pub user_id: String,
    pub decision: OfferDecision,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondResponse {
    pub offer_id: Uuid,
    pub decision: OfferDecision,
}
