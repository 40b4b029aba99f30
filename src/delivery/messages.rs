use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{MatchType, Offer};

/// What a candidate sees when a match is offered
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferNotice {
    pub offer_id: Uuid,
    pub fixture: String,
    pub kickoff: String,
    pub stadium: String,
    pub competition: MatchType,
    pub expires_at: NaiveDateTime,
}

impl From<&Offer> for OfferNotice {
    fn from(offer: &Offer) -> Self {
        Self {
            offer_id: offer.id,
            fixture: offer.details.fixture(),
            kickoff: offer.details.time.clone(),
            stadium: offer.details.stadium.clone(),
            competition: offer.details.match_type,
            expires_at: offer.expires_at,
        }
    }
}

/// Body posted to the delivery webhook
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage<'a> {
    Offer {
        title: &'static str,
        offer: &'a OfferNotice,
    },
    Text {
        content: &'a str,
    },
}

impl<'a> OutboundMessage<'a> {
    pub fn offer(offer: &'a OfferNotice) -> Self {
        OutboundMessage::Offer {
            title: "URGENT: Match Assignment",
            offer,
        }
    }

    pub fn text(content: &'a str) -> Self {
        OutboundMessage::Text { content }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Alert,
}

/// One line in the board's audit channel
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub timestamp: NaiveDateTime,
}

impl AuditEntry {
    pub fn new(title: &str, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: format!("BFL LOG: {}", title),
            description: description.into(),
            severity,
            timestamp: Local::now().naive_local(),
        }
    }
}
