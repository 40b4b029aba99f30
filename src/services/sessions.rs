use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Local, NaiveDateTime};
use log::debug;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{MatchDetails, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Searching,
    AwaitingCandidate,
    Confirmed,
    NoRefereesAvailable,
    Expired,
}

impl SessionStatus {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            SessionStatus::Confirmed | SessionStatus::NoRefereesAvailable | SessionStatus::Expired
        )
    }
}

/// Admin-facing snapshot of one assignment session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub requested_by: UserId,
    pub details: MatchDetails,
    pub status: SessionStatus,
    pub candidate: Option<UserId>,
    pub offer_id: Option<Uuid>,
    pub attempted: Vec<UserId>,
    pub assigned: Option<UserId>,
    pub updated_at: NaiveDateTime,
}

/// Finished sessions stay visible this long after their last update
pub const FINISHED_SESSION_RETENTION_HOURS: i64 = 24;

/// In-memory progress of every session started by this process
#[derive(Default)]
pub struct SessionBoard {
    sessions: Mutex<HashMap<Uuid, SessionView>>,
}

impl SessionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, id: Uuid, requested_by: &str, details: &MatchDetails, attempted: &[UserId]) {
        let now = Local::now().naive_local();
        self.prune_finished_before(now - Duration::hours(FINISHED_SESSION_RETENTION_HOURS));

        let view = SessionView {
            id,
            requested_by: requested_by.to_string(),
            details: details.clone(),
            status: SessionStatus::Searching,
            candidate: None,
            offer_id: None,
            attempted: attempted.to_vec(),
            assigned: None,
            updated_at: now,
        };
        self.lock().insert(id, view);
    }

    /// Drop finished sessions last updated before `cutoff`; running ones are kept
    pub fn prune_finished_before(&self, cutoff: NaiveDateTime) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, view| !view.status.is_finished() || view.updated_at >= cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} finished sessions", pruned);
        }
        pruned
    }

    /// Apply `change` to a known session; unknown ids are ignored
    pub fn update<F: FnOnce(&mut SessionView)>(&self, id: Uuid, change: F) {
        if let Some(view) = self.lock().get_mut(&id) {
            change(view);
            view.updated_at = Local::now().naive_local();
        }
    }

    pub fn get(&self, id: Uuid) -> Option<SessionView> {
        self.lock().get(&id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionView>> {
        // views are plain data, a poisoned map is still readable
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
