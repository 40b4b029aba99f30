use std::collections::HashMap;

use log::{debug, warn};
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

use crate::domain::{Offer, OfferDecision};
use crate::errors::OpsError;

struct PendingOffer {
    offer: Offer,
    responder: oneshot::Sender<OfferDecision>,
}

/// Offers waiting on an answer, keyed by offer id
#[derive(Default)]
pub struct OfferBook {
    pending: Mutex<HashMap<Uuid, PendingOffer>>,
}

impl OfferBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an offer; the receiver resolves once the candidate answers
    pub async fn open(&self, offer: Offer) -> oneshot::Receiver<OfferDecision> {
        let (responder, response) = oneshot::channel();
        debug!("Offer {} opened for {}", offer.id, offer.candidate);
        self.pending
            .lock()
            .await
            .insert(offer.id, PendingOffer { offer, responder });
        response
    }

    /// Route a candidate's answer to the waiting session.
    ///
    /// Only the bound candidate may answer. A wrong responder leaves the offer pending.
    pub async fn respond(
        &self,
        offer_id: Uuid,
        responder: &str,
        decision: OfferDecision,
    ) -> Result<Offer, OpsError> {
        let mut pending = self.pending.lock().await;

        let candidate = pending
            .get(&offer_id)
            .map(|p| p.offer.candidate.clone())
            .ok_or(OpsError::OfferNotFound(offer_id))?;
        if candidate != responder {
            warn!("User {} tried to answer offer {} bound to {}", responder, offer_id, candidate);
            return Err(OpsError::InvalidTarget(format!(
                "offer {} was not sent to {}",
                offer_id, responder
            )));
        }

        let entry = pending
            .remove(&offer_id)
            .ok_or(OpsError::OfferNotFound(offer_id))?;
        entry
            .responder
            .send(decision)
            .map_err(|_| OpsError::OfferNotFound(offer_id))?;
        Ok(entry.offer)
    }

    /// Drop a pending offer; later answers are rejected as not found
    pub async fn withdraw(&self, offer_id: Uuid) -> Option<Offer> {
        self.pending.lock().await.remove(&offer_id).map(|p| p.offer)
    }

    pub async fn get(&self, offer_id: Uuid) -> Option<Offer> {
        self.pending
            .lock()
            .await
            .get(&offer_id)
            .map(|p| p.offer.clone())
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchDetails, MatchType};
    use chrono::{Duration, NaiveDate};

    fn offer_for(candidate: &str) -> Offer {
        let issued = NaiveDate::from_ymd_opt(2026, 10, 19)
            .and_then(|d| d.and_hms_opt(18, 0, 0))
            .unwrap();
        Offer::new(
            candidate.to_string(),
            MatchDetails {
                home: "Ajax FC".to_string(),
                away: "Inter FC".to_string(),
                match_type: MatchType::CategoryC,
                time: "20:00".to_string(),
                stadium: "Main".to_string(),
            },
            issued,
            Duration::hours(1),
        )
    }

    #[tokio::test]
    async fn test_candidate_answer_reaches_session() {
        let book = OfferBook::new();
        let offer = offer_for("7");
        let id = offer.id;
        let response = book.open(offer).await;

        let answered = book.respond(id, "7", OfferDecision::Accept).await.unwrap();
        assert_eq!(answered.id, id);
        assert_eq!(response.await.unwrap(), OfferDecision::Accept);
        assert_eq!(book.len().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_responder_keeps_offer_pending() {
        let book = OfferBook::new();
        let offer = offer_for("7");
        let id = offer.id;
        let _response = book.open(offer).await;

        let err = book.respond(id, "8", OfferDecision::Accept).await.unwrap_err();
        assert!(matches!(err, OpsError::InvalidTarget(_)));
        assert!(book.get(id).await.is_some());
    }

    #[tokio::test]
    async fn test_withdrawn_offer_rejects_late_answer() {
        let book = OfferBook::new();
        let offer = offer_for("7");
        let id = offer.id;
        let _response = book.open(offer).await;

        assert!(book.withdraw(id).await.is_some());
        let err = book.respond(id, "7", OfferDecision::Decline).await.unwrap_err();
        assert!(matches!(err, OpsError::OfferNotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_dropped_session_rejects_answer() {
        let book = OfferBook::new();
        let offer = offer_for("7");
        let id = offer.id;
        drop(book.open(offer).await);

        let err = book.respond(id, "7", OfferDecision::Accept).await.unwrap_err();
        assert!(matches!(err, OpsError::OfferNotFound(_)));
    }
}
