use std::sync::{Arc, Mutex};

use chrono::Local;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use tokio::time::timeout;
use uuid::Uuid;

use super::offers::OfferBook;
use super::sessions::{SessionBoard, SessionStatus};
use crate::config::settings::OfferSettings;
use crate::config::ExpiryPolicy;
use crate::delivery::{AuditEntry, AuditLog, Notifier, OfferNotice, Severity};
use crate::domain::{
    eligible_pool, MatchCriteria, MatchDetails, Offer, OfferDecision, OfferError, UserId,
};
use crate::errors::OpsError;
use crate::store::DataStore;

/// An admin's request to staff one fixture
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub requested_by: UserId,
    #[serde(flatten)]
    pub details: MatchDetails,
    /// Referees the admin already ruled out
    #[serde(default)]
    pub excluded: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Confirmed { referee: UserId },
    NoRefereesAvailable,
    Expired { candidate: UserId },
}

/// How a single offer ended
enum Attempt {
    Accepted,
    Declined,
    Undeliverable,
    Expired,
}

pub struct AssignmentService {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditLog>,
    offers: Arc<OfferBook>,
    sessions: Arc<SessionBoard>,
    settings: OfferSettings,
    rng: Mutex<StdRng>,
}

impl AssignmentService {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
        offers: Arc<OfferBook>,
        sessions: Arc<SessionBoard>,
        settings: OfferSettings,
    ) -> Self {
        let rng = match settings.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            notifier,
            audit,
            offers,
            sessions,
            settings,
            rng: Mutex::new(rng),
        }
    }

    /// Open a session and run it in the background; returns the session id
    pub fn start(self: &Arc<Self>, request: AssignmentRequest) -> Result<Uuid, OpsError> {
        validate(&request)?;

        let session_id = Uuid::new_v4();
        self.sessions
            .open(session_id, &request.requested_by, &request.details, &request.excluded);

        let service = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = service.run(session_id, request).await;
            info!("Assignment session {} finished: {:?}", session_id, outcome);
        });

        Ok(session_id)
    }

    /// Offer the fixture to one eligible referee at a time until someone accepts
    /// or nobody is left.
    pub async fn run(&self, session_id: Uuid, request: AssignmentRequest) -> SessionOutcome {
        let AssignmentRequest {
            requested_by,
            details,
            mut excluded,
        } = request;
        let mut attempts = 0usize;

        info!("Searching a referee for {} ({})", details.fixture(), details.match_type);

        loop {
            self.sessions.update(session_id, |s| {
                s.status = SessionStatus::Searching;
                s.candidate = None;
                s.offer_id = None;
                s.attempted = excluded.clone();
            });

            let now = Local::now().naive_local();
            let document = self.store.load();
            let criteria = MatchCriteria::at(now, details.match_type, &details.home, &details.away);
            let pool = eligible_pool(&document, &criteria, &excluded);

            // every failed attempt excludes someone, so this only trips if the roster keeps growing
            let candidate = if attempts > document.referees.len() {
                warn!("Session {} gave up after {} attempts", session_id, attempts);
                None
            } else {
                self.pick(&pool)
            };

            let Some(candidate) = candidate else {
                self.tell(
                    &requested_by,
                    &format!(
                        "❌ {}: {} on {}.",
                        OpsError::PoolExhausted,
                        details.fixture(),
                        criteria.day
                    ),
                )
                .await;
                return self.finish(session_id, SessionOutcome::NoRefereesAvailable);
            };
            attempts += 1;

            match self.offer_to(session_id, &requested_by, &candidate, &details).await {
                Attempt::Accepted => {
                    return self.finish(session_id, SessionOutcome::Confirmed { referee: candidate });
                }
                Attempt::Declined | Attempt::Undeliverable => excluded.push(candidate),
                Attempt::Expired => match self.settings.on_expiry {
                    ExpiryPolicy::NextCandidate => excluded.push(candidate),
                    ExpiryPolicy::Abandon => {
                        self.tell(
                            &requested_by,
                            &format!(
                                "⌛ <@{}> did not answer in time. Run the assignment again to find someone else.",
                                candidate
                            ),
                        )
                        .await;
                        return self.finish(session_id, SessionOutcome::Expired { candidate });
                    }
                },
            }
        }
    }

    async fn offer_to(
        &self,
        session_id: Uuid,
        requested_by: &str,
        candidate: &str,
        details: &MatchDetails,
    ) -> Attempt {
        let mut offer = Offer::new(
            candidate.to_string(),
            details.clone(),
            Local::now().naive_local(),
            self.settings.ttl(),
        );
        let notice = OfferNotice::from(&offer);
        let response = self.offers.open(offer.clone()).await;

        if let Err(e) = self.notifier.deliver_offer(candidate, &notice).await {
            warn!("Offer {} could not reach {}: {}", offer.id, candidate, e);
            self.offers.withdraw(offer.id).await;
            return Attempt::Undeliverable;
        }

        self.sessions.update(session_id, |s| {
            s.status = SessionStatus::AwaitingCandidate;
            s.candidate = Some(candidate.to_string());
            s.offer_id = Some(offer.id);
        });
        self.tell(
            requested_by,
            &format!("📨 Offer sent to <@{}> for {}. Waiting for a reply.", candidate, details.fixture()),
        )
        .await;

        match timeout(self.settings.timeout(), response).await {
            Ok(Ok(OfferDecision::Accept)) => self.commit(&mut offer, requested_by).await,
            Ok(Ok(OfferDecision::Decline)) => {
                if let Err(e) = offer.decline() {
                    warn!("Offer {} could not be marked declined: {}", offer.id, e);
                }
                info!("{} declined offer {}", candidate, offer.id);
                self.tell(
                    requested_by,
                    &format!("⚠️ <@{}> declined. Searching for the next referee.", candidate),
                )
                .await;
                Attempt::Declined
            }
            // responder dropped without an answer
            Ok(Err(_)) | Err(_) => {
                self.offers.withdraw(offer.id).await;
                if let Err(e) = offer.expire() {
                    warn!("Offer {} could not be marked expired: {}", offer.id, e);
                }
                info!("Offer {} to {} expired", offer.id, candidate);
                if self.settings.on_expiry == ExpiryPolicy::NextCandidate {
                    self.tell(
                        requested_by,
                        &format!("⌛ <@{}> did not answer in time. Trying the next referee.", candidate),
                    )
                    .await;
                }
                Attempt::Expired
            }
        }
    }

    async fn commit(&self, offer: &mut Offer, requested_by: &str) -> Attempt {
        let today = Local::now().date_naive();
        let committed = self
            .store
            .update(|document| offer.accept(document, today).map_err(OpsError::from));

        let entry = match committed {
            Ok(entry) => entry,
            Err(OpsError::Offer(OfferError::CandidateNotRegistered(uid))) => {
                warn!("{} left the roster before accepting offer {}", uid, offer.id);
                return Attempt::Declined;
            }
            Err(e) => {
                // the candidate did accept; only the write is missing
                error!("Acceptance of offer {} could not be recorded: {}", offer.id, e);
                self.tell(
                    requested_by,
                    &format!(
                        "⚠️ <@{}> accepted {} ({}) at {}, but the assignment could not be recorded: {}",
                        offer.candidate,
                        offer.details.fixture(),
                        offer.details.time,
                        offer.details.stadium,
                        e
                    ),
                )
                .await;
                self.audit
                    .record(AuditEntry::new(
                        "MATCH NOT RECORDED",
                        format!("Ref: {}\nMatch: {}\nError: {}", offer.candidate, offer.details.fixture(), e),
                        Severity::Alert,
                    ))
                    .await;
                return Attempt::Accepted;
            }
        };

        info!("{} accepted {}", entry.ref_id, entry.record.fixture);
        self.tell(
            requested_by,
            &format!(
                "✅ Confirmed: <@{}> accepted {} ({}) at {}.",
                entry.ref_id, entry.record.fixture, entry.record.time, entry.record.stadium
            ),
        )
        .await;
        self.tell(
            &entry.ref_id,
            &format!("Assignment confirmed: {} at {}.", entry.record.fixture, entry.record.time),
        )
        .await;
        self.audit
            .record(AuditEntry::new(
                "MATCH ASSIGNED",
                format!(
                    "Ref: {} ({})\nMatch: {}\nType: {}",
                    entry.ref_name, entry.ref_id, entry.record.fixture, entry.record.match_type
                ),
                Severity::Success,
            ))
            .await;

        Attempt::Accepted
    }

    fn pick(&self, pool: &[UserId]) -> Option<UserId> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pool.choose(&mut *rng).cloned()
    }

    /// Requester and candidate messages are best effort
    async fn tell(&self, recipient: &str, message: &str) {
        if let Err(e) = self.notifier.send_message(recipient, message).await {
            warn!("Could not notify {}: {}", recipient, e);
        }
    }

    fn finish(&self, session_id: Uuid, outcome: SessionOutcome) -> SessionOutcome {
        self.sessions.update(session_id, |s| {
            s.status = match &outcome {
                SessionOutcome::Confirmed { .. } => SessionStatus::Confirmed,
                SessionOutcome::NoRefereesAvailable => SessionStatus::NoRefereesAvailable,
                SessionOutcome::Expired { .. } => SessionStatus::Expired,
            };
            s.assigned = match &outcome {
                SessionOutcome::Confirmed { referee } => Some(referee.clone()),
                _ => None,
            };
            if !matches!(outcome, SessionOutcome::Expired { .. }) {
                s.candidate = None;
                s.offer_id = None;
            }
        });
        outcome
    }
}

fn validate(request: &AssignmentRequest) -> Result<(), OpsError> {
    let details = &request.details;
    if details.home.trim().is_empty() || details.away.trim().is_empty() {
        return Err(OpsError::InvalidInput("both clubs are required".to_string()));
    }
    if details.home == details.away {
        return Err(OpsError::InvalidInput("a club cannot play itself".to_string()));
    }
    Ok(())
}
