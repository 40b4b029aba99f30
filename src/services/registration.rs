use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Local, NaiveDateTime};
use log::{debug, info, warn};

use crate::config::settings::LeagueSettings;
use crate::config::ClubRoster;
use crate::delivery::{AuditEntry, AuditLog, Notifier, Severity};
use crate::domain::{Category, Day, Registration, RegistrationError, UserId};
use crate::errors::OpsError;
use crate::store::DataStore;

/// Unfinished registrations are dropped this long after the invite
pub const INVITE_TTL_DAYS: i64 = 7;

struct PendingRegistration {
    registration: Registration,
    invited_at: NaiveDateTime,
}

/// Drives invited users through club and day selection into the roster
pub struct RegistrationService {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditLog>,
    clubs: ClubRoster,
    league: LeagueSettings,
    pending: Mutex<HashMap<UserId, PendingRegistration>>,
}

impl RegistrationService {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
        clubs: ClubRoster,
        league: LeagueSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            audit,
            clubs,
            league,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub async fn invite(
        &self,
        user_id: &str,
        name: &str,
        category: Category,
    ) -> Result<Registration, OpsError> {
        if name.trim().is_empty() {
            return Err(OpsError::InvalidInput("referee name is required".to_string()));
        }
        if self.store.load().is_registered(user_id) {
            return Err(OpsError::InvalidTarget(format!("user {} is already registered", user_id)));
        }

        let now = Local::now().naive_local();
        self.prune_stale_invites(now - Duration::days(INVITE_TTL_DAYS));

        let registration = Registration::invite(user_id.to_string(), name.trim().to_string(), category);
        self.lock().insert(
            user_id.to_string(),
            PendingRegistration {
                registration: registration.clone(),
                invited_at: now,
            },
        );

        let invitation = format!(
            "👋 **Welcome to the Referee Panel!**\n\
             You have been invited as a **{}** referee.\n\
             Step 1: pick the clubs you support (conflicts of interest).",
            category
        );
        if let Err(e) = self.notifier.send_message(user_id, &invitation).await {
            warn!("Invitation to {} was not delivered: {}", user_id, e);
            self.lock().remove(user_id);
            return Err(e);
        }

        info!("Invited {} ({}) as {}", name, user_id, category);
        Ok(registration)
    }

    pub fn choose_clubs(&self, user_id: &str, clubs: Vec<String>) -> Result<Registration, OpsError> {
        self.advance(user_id, |registration| registration.choose_clubs(clubs, &self.clubs))
    }

    pub fn choose_days(&self, user_id: &str, days: Vec<Day>) -> Result<Registration, OpsError> {
        self.advance(user_id, |registration| registration.choose_days(days))
    }

    /// Write the referee record; returns the new referee id
    pub async fn finish(&self, user_id: &str) -> Result<String, OpsError> {
        let registration = self.pending(user_id)?;

        let today = Local::now().date_naive();
        let result = self.store.update(|document| {
            registration
                .finalize(document, &self.league.id_prefix, today)
                .map_err(OpsError::from)
        });

        let referee_id = match result {
            Ok(referee_id) => referee_id,
            Err(OpsError::Registration(RegistrationError::AlreadyRegistered(uid))) => {
                self.lock().remove(&uid);
                return Err(RegistrationError::AlreadyRegistered(uid).into());
            }
            Err(e) => return Err(e),
        };
        self.lock().remove(user_id);

        info!("Registered {} as {}", registration.name, referee_id);
        let welcome = format!(
            "✅ **Registration Complete!**\nID: `{}`\nWorking days: {}",
            referee_id,
            registration
                .days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        if let Err(e) = self.notifier.send_message(user_id, &welcome).await {
            warn!("Could not confirm registration to {}: {}", user_id, e);
        }
        self.audit
            .record(AuditEntry::new(
                "NEW REFEREE",
                format!(
                    "User: {} ({})\nID: {}\nCategory: {}",
                    registration.name, user_id, referee_id, registration.category
                ),
                Severity::Success,
            ))
            .await;

        Ok(referee_id)
    }

    pub fn pending(&self, user_id: &str) -> Result<Registration, OpsError> {
        self.lock()
            .get(user_id)
            .map(|pending| pending.registration.clone())
            .ok_or_else(|| no_pending(user_id))
    }

    /// Forget registrations invited before `cutoff`
    pub fn prune_stale_invites(&self, cutoff: NaiveDateTime) -> usize {
        let mut pending = self.lock();
        let before = pending.len();
        pending.retain(|_, p| p.invited_at >= cutoff);
        let pruned = before - pending.len();
        if pruned > 0 {
            debug!("Dropped {} stale registrations", pruned);
        }
        pruned
    }

    fn advance<F>(&self, user_id: &str, step: F) -> Result<Registration, OpsError>
    where
        F: FnOnce(&mut Registration) -> Result<(), RegistrationError>,
    {
        let mut pending = self.lock();
        let registration = &mut pending
            .get_mut(user_id)
            .ok_or_else(|| no_pending(user_id))?
            .registration;
        step(registration)?;
        Ok(registration.clone())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, PendingRegistration>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn no_pending(user_id: &str) -> OpsError {
    OpsError::InvalidTarget(format!("no registration in progress for {}", user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegistrationStep;
    use crate::services::offers::OfferBook;
    use crate::services::testing::{referee, store_with, RecordingAudit, Script, ScriptedNotifier};

    fn service(
        store: Arc<DataStore>,
        scripts: &[(&str, Script)],
    ) -> (RegistrationService, Arc<ScriptedNotifier>, Arc<RecordingAudit>) {
        let mut notifier = ScriptedNotifier::new(Arc::new(OfferBook::new()));
        for (user, script) in scripts {
            notifier = notifier.script(user, *script);
        }
        let notifier = Arc::new(notifier);
        let audit = Arc::new(RecordingAudit::default());
        let service = RegistrationService::new(
            store,
            notifier.clone(),
            audit.clone(),
            ClubRoster::default(),
            LeagueSettings::default(),
        );
        (service, notifier, audit)
    }

    #[tokio::test]
    async fn test_full_registration_allocates_next_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, vec![("1", referee("BFL-001", "Ana", Category::A))]);
        let (service, notifier, audit) = service(Arc::clone(&store), &[]);

        service.invite("9", "Zed", Category::B).await.unwrap();
        service
            .choose_clubs("9", vec!["Celtic FC".to_string(), "Celtic FC".to_string()])
            .unwrap();
        let registration = service
            .choose_days("9", vec![Day::Sunday, Day::Friday, Day::Sunday])
            .unwrap();
        assert_eq!(registration.step(), RegistrationStep::DaysChosen);

        let referee_id = service.finish("9").await.unwrap();

        assert_eq!(referee_id, "BFL-002");
        let doc = store.load();
        let zed = doc.referee("9").unwrap();
        assert_eq!(zed.clubs, vec!["Celtic FC".to_string()]);
        assert_eq!(zed.availability, vec![Day::Friday, Day::Sunday]);
        assert_eq!(zed.strikes, 0);
        assert!(!zed.suspended);
        assert_eq!(doc.config.id_counter, 3);

        assert!(service.pending("9").is_err());
        assert_eq!(notifier.messages_to("9").len(), 2);
        assert_eq!(audit.titles(), vec!["BFL LOG: NEW REFEREE".to_string()]);
    }

    #[tokio::test]
    async fn test_steps_must_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _, _) = service(store_with(&dir, vec![]), &[]);

        service.invite("9", "Zed", Category::C).await.unwrap();
        let err = service.choose_days("9", vec![Day::Monday]).unwrap_err();
        assert!(matches!(
            err,
            OpsError::Registration(RegistrationError::OutOfOrder {
                expected: RegistrationStep::ClubsChosen,
                actual: RegistrationStep::Invited,
            })
        ));

        let err = service.finish("9").await.unwrap_err();
        assert!(matches!(err, OpsError::Registration(RegistrationError::OutOfOrder { .. })));
    }

    #[tokio::test]
    async fn test_registered_user_cannot_be_invited() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, vec![("1", referee("BFL-001", "Ana", Category::A))]);
        let (service, notifier, _) = service(store, &[]);

        let err = service.invite("1", "Ana", Category::A).await.unwrap_err();
        assert!(matches!(err, OpsError::InvalidTarget(_)));
        assert!(notifier.messages_to("1").is_empty());
    }

    #[tokio::test]
    async fn test_undeliverable_invite_leaves_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _, _) = service(store_with(&dir, vec![]), &[("9", Script::Unreachable)]);

        let err = service.invite("9", "Zed", Category::C).await.unwrap_err();
        assert!(matches!(err, OpsError::DeliveryFailed { .. }));
        assert!(service.pending("9").is_err());
    }

    #[tokio::test]
    async fn test_unknown_club_keeps_step() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _, _) = service(store_with(&dir, vec![]), &[]);

        service.invite("9", "Zed", Category::C).await.unwrap();
        let err = service
            .choose_clubs("9", vec!["Sunday League XI".to_string()])
            .unwrap_err();
        assert!(matches!(err, OpsError::Registration(RegistrationError::UnknownClub(_))));
        assert_eq!(service.pending("9").unwrap().step(), RegistrationStep::Invited);
    }

    #[tokio::test]
    async fn test_finishing_after_concurrent_registration_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, vec![]);
        let (service, _, _) = service(Arc::clone(&store), &[]);

        service.invite("9", "Zed", Category::C).await.unwrap();
        service.choose_clubs("9", vec![]).unwrap();
        service.choose_days("9", vec![Day::Monday]).unwrap();

        store
            .update(|doc| {
                doc.referees
                    .insert("9".to_string(), referee("BFL-001", "Zed", Category::C));
                Ok(())
            })
            .unwrap();

        let err = service.finish("9").await.unwrap_err();
        assert!(matches!(err, OpsError::Registration(RegistrationError::AlreadyRegistered(_))));
        assert_eq!(store.load().config.id_counter, 1);
        assert!(service.pending("9").is_err());
    }

    #[tokio::test]
    async fn test_stale_invites_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _, _) = service(store_with(&dir, vec![]), &[]);

        service.invite("8", "Old", Category::C).await.unwrap();
        service.lock().get_mut("8").unwrap().invited_at =
            Local::now().naive_local() - Duration::days(INVITE_TTL_DAYS + 1);

        service.invite("9", "Zed", Category::C).await.unwrap();

        assert!(matches!(service.pending("8"), Err(OpsError::InvalidTarget(_))));
        assert_eq!(service.pending("9").unwrap().step(), RegistrationStep::Invited);
        assert_eq!(service.prune_stale_invites(Local::now().naive_local() - Duration::days(1)), 0);
    }
}
