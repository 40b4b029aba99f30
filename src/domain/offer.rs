use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::models::{Document, HistoryEntry, MatchRecord, MatchType, UserId};

/// The fixture being offered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetails {
    pub home: String,
    pub away: String,
    pub match_type: MatchType,
    /// Kickoff as typed by the admin
    pub time: String,
    pub stadium: String,
}

impl MatchDetails {
    pub fn fixture(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }

    pub fn record(&self, date: NaiveDate) -> MatchRecord {
        MatchRecord {
            fixture: self.fixture(),
            time: self.time.clone(),
            stadium: self.stadium.clone(),
            match_type: self.match_type,
            date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferState {
    Offered,
    Accepted,
    Declined,
    Expired,
}

impl fmt::Display for OfferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OfferState::Offered => "offered",
            OfferState::Accepted => "accepted",
            OfferState::Declined => "declined",
            OfferState::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// A candidate's answer to an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferDecision {
    Accept,
    Decline,
}

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("offer was already {0}")]
    AlreadyResolved(OfferState),

    #[error("referee {0} is no longer registered")]
    CandidateNotRegistered(UserId),
}

/// One match proposed to exactly one candidate
#[derive(Debug, Clone, Serialize)]
pub struct Offer {
    pub id: Uuid,
    pub candidate: UserId,
    pub details: MatchDetails,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    state: OfferState,
}

impl Offer {
    pub fn new(candidate: UserId, details: MatchDetails, issued_at: NaiveDateTime, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            candidate,
            details,
            issued_at,
            expires_at: issued_at
                .checked_add_signed(ttl)
                .unwrap_or(NaiveDateTime::MAX),
            state: OfferState::Offered,
        }
    }

    pub fn state(&self) -> OfferState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == OfferState::Offered
    }

    /// Commit the match to the candidate's record and the history.
    ///
    /// The document is left untouched when the offer is no longer pending or
    /// the candidate has left the roster.
    pub fn accept(&mut self, document: &mut Document, today: NaiveDate) -> Result<HistoryEntry, OfferError> {
        self.ensure_pending()?;

        let referee = document
            .referees
            .get_mut(&self.candidate)
            .ok_or_else(|| OfferError::CandidateNotRegistered(self.candidate.clone()))?;

        let record = self.details.record(today);
        referee.matches_completed += 1;
        referee.current_match = Some(record.clone());

        let entry = HistoryEntry {
            ref_id: self.candidate.clone(),
            ref_name: referee.name.clone(),
            record,
        };
        document.history.push(entry.clone());

        self.state = OfferState::Accepted;
        Ok(entry)
    }

    pub fn decline(&mut self) -> Result<(), OfferError> {
        self.ensure_pending()?;
        self.state = OfferState::Declined;
        Ok(())
    }

    pub fn expire(&mut self) -> Result<(), OfferError> {
        self.ensure_pending()?;
        self.state = OfferState::Expired;
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), OfferError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(OfferError::AlreadyResolved(self.state))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, Day, Referee};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn details() -> MatchDetails {
        MatchDetails {
            home: "Celtic FC".to_string(),
            away: "Rangers FC".to_string(),
            match_type: MatchType::CategoryB,
            time: "19:45".to_string(),
            stadium: "Parkhead".to_string(),
        }
    }

    fn document_with(user_id: &str) -> Document {
        let mut doc = Document::new();
        doc.referees.insert(
            user_id.to_string(),
            Referee {
                referee_id: "BFL-001".to_string(),
                name: "Jo".to_string(),
                strikes: 0,
                matches_completed: 2,
                category: Category::B,
                joined_at: today(),
                clubs: vec![],
                availability: vec![Day::Monday],
                suspended: false,
                ratings: vec![],
                loa_until: None,
                current_match: None,
            },
        );
        doc
    }

    fn offer_for(user_id: &str) -> Offer {
        let issued = today().and_hms_opt(9, 0, 0).unwrap();
        Offer::new(user_id.to_string(), details(), issued, Duration::hours(1))
    }

    #[test]
    fn test_accept_commits_match_and_history() {
        let mut doc = document_with("7");
        let mut offer = offer_for("7");

        let entry = offer.accept(&mut doc, today()).unwrap();

        assert_eq!(offer.state(), OfferState::Accepted);
        assert_eq!(entry.record.fixture, "Celtic FC vs Rangers FC");
        assert_eq!(entry.ref_name, "Jo");

        let referee = doc.referee("7").unwrap();
        assert_eq!(referee.matches_completed, 3);
        assert_eq!(referee.current_match.as_ref(), Some(&entry.record));
        assert_eq!(doc.history, vec![entry]);
    }

    #[test]
    fn test_decline_leaves_document_alone() {
        let mut doc = document_with("7");
        let before = doc.clone();
        let mut offer = offer_for("7");

        offer.decline().unwrap();

        assert_eq!(offer.state(), OfferState::Declined);
        assert_eq!(doc, before);
        assert!(matches!(
            offer.accept(&mut doc, today()),
            Err(OfferError::AlreadyResolved(OfferState::Declined))
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_terminal_states_reject_transitions() {
        let mut doc = document_with("7");
        let mut offer = offer_for("7");
        offer.accept(&mut doc, today()).unwrap();

        assert!(offer.decline().is_err());
        assert!(offer.expire().is_err());
        assert!(offer.accept(&mut doc, today()).is_err());
        assert_eq!(doc.history.len(), 1);

        let mut expired = offer_for("7");
        expired.expire().unwrap();
        assert!(matches!(
            expired.decline(),
            Err(OfferError::AlreadyResolved(OfferState::Expired))
        ));
    }

    #[test]
    fn test_accept_for_vanished_candidate_writes_nothing() {
        let mut doc = Document::new();
        let mut offer = offer_for("7");

        assert!(matches!(
            offer.accept(&mut doc, today()),
            Err(OfferError::CandidateNotRegistered(_))
        ));
        assert!(offer.is_pending());
        assert!(doc.history.is_empty());
    }

    #[test]
    fn test_expiry_time_from_ttl() {
        let offer = offer_for("7");
        assert_eq!(offer.expires_at - offer.issued_at, Duration::hours(1));
    }

    #[test]
    fn test_unbounded_ttl_saturates_expiry() {
        let issued = today().and_hms_opt(9, 0, 0).unwrap();
        let offer = Offer::new("7".to_string(), details(), issued, Duration::MAX);
        assert_eq!(offer.expires_at, NaiveDateTime::MAX);
        assert!(offer.is_pending());
    }
}
