use std::sync::Arc;

use chrono::{Duration, Local, NaiveDateTime};
use log::info;
use serde::Serialize;

use crate::config::settings::LeagueSettings;
use crate::delivery::{AuditEntry, AuditLog, Severity};
use crate::domain::registration::normalize_days;
use crate::domain::standings::{leaderboard, recent_history};
use crate::domain::{
    Day, Document, HistoryEntry, LeaderboardRow, LeaderboardSort, PeerRating, Referee,
    RefereeProfile,
};
use crate::errors::OpsError;
use crate::store::DataStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LeaveOutcome {
    Granted { until: NaiveDateTime },
    /// Too long to self-grant; the board decides
    NeedsApproval,
}

/// Day-to-day roster management on top of the data store
pub struct RosterService {
    store: Arc<DataStore>,
    audit: Arc<dyn AuditLog>,
    league: LeagueSettings,
}

impl RosterService {
    pub fn new(store: Arc<DataStore>, audit: Arc<dyn AuditLog>, league: LeagueSettings) -> Self {
        Self { store, audit, league }
    }

    pub async fn suspend(&self, user_id: &str, reason: &str) -> Result<(), OpsError> {
        let name = self.with_referee(user_id, |referee| {
            referee.suspended = true;
            Ok(referee.name.clone())
        })?;

        info!("Suspended {} ({})", name, user_id);
        self.log(
            "SUSPENSION",
            format!("Ref: {} ({})\nReason: {}", name, user_id, reason),
            Severity::Alert,
        )
        .await;
        Ok(())
    }

    pub async fn unsuspend(&self, user_id: &str) -> Result<(), OpsError> {
        let name = self.with_referee(user_id, |referee| {
            referee.suspended = false;
            Ok(referee.name.clone())
        })?;

        info!("Reactivated {} ({})", name, user_id);
        self.log("REACTIVATION", format!("Ref: {} ({})", name, user_id), Severity::Success)
            .await;
        Ok(())
    }

    /// Returns the strike count after the update
    pub async fn add_strike(&self, user_id: &str, reason: &str) -> Result<u32, OpsError> {
        let max_strikes = self.league.max_strikes;
        let (name, strikes) = self.with_referee(user_id, |referee| {
            referee.strikes = (referee.strikes + 1).min(max_strikes);
            Ok((referee.name.clone(), referee.strikes))
        })?;

        self.log(
            "STRIKE ISSUED",
            format!("Ref: {} ({})\nStrikes: {}/{}\nReason: {}", name, user_id, strikes, max_strikes, reason),
            Severity::Warning,
        )
        .await;
        Ok(strikes)
    }

    pub async fn rate(
        &self,
        author: &str,
        author_name: &str,
        target: &str,
        stars: u8,
        comment: &str,
    ) -> Result<(), OpsError> {
        if author == target {
            return Err(OpsError::InvalidTarget("you cannot rate yourself".to_string()));
        }
        if !(1..=5).contains(&stars) {
            return Err(OpsError::InvalidInput(format!("stars must be between 1 and 5, got {}", stars)));
        }

        let rating = PeerRating {
            from: author.to_string(),
            from_name: author_name.to_string(),
            stars,
            comment: comment.to_string(),
            date: Local::now().date_naive(),
        };
        let name = self.with_referee(target, |referee| {
            referee.ratings.push(rating);
            Ok(referee.name.clone())
        })?;

        self.log(
            "NEW RATING",
            format!("From: {}\nTo: {}\nStars: {}/5\nComment: {}", author_name, name, stars, comment),
            Severity::Info,
        )
        .await;
        Ok(())
    }

    pub async fn request_leave(&self, user_id: &str, days: i64, reason: &str) -> Result<LeaveOutcome, OpsError> {
        if days < 1 {
            return Err(OpsError::InvalidInput("leave must last at least one day".to_string()));
        }

        if days > self.league.max_leave_days {
            let referee = self.referee(user_id)?;
            self.log(
                "LEAVE REQUEST",
                format!(
                    "Ref: {} ({})\nDays: {}\nReason: {}\nNeeds board approval.",
                    referee.name, user_id, days, reason
                ),
                Severity::Warning,
            )
            .await;
            return Ok(LeaveOutcome::NeedsApproval);
        }

        let until = Local::now().naive_local() + Duration::days(days);
        self.with_referee(user_id, |referee| {
            referee.loa_until = Some(until);
            Ok(())
        })?;
        info!("{} on leave until {}", user_id, until);
        Ok(LeaveOutcome::Granted { until })
    }

    pub fn update_availability(&self, user_id: &str, days: Vec<Day>) -> Result<Vec<Day>, OpsError> {
        let days = normalize_days(days)?;
        self.with_referee(user_id, |referee| {
            referee.availability = days.clone();
            Ok(())
        })?;
        Ok(days)
    }

    pub fn profile(&self, user_id: &str) -> Result<RefereeProfile, OpsError> {
        let referee = self.referee(user_id)?;
        Ok(RefereeProfile::build(
            user_id,
            &referee,
            self.league.max_strikes,
            Local::now().naive_local(),
        ))
    }

    pub fn leaderboard(&self, sort_by: LeaderboardSort) -> Vec<LeaderboardRow> {
        leaderboard(&self.store.load(), sort_by, self.league.leaderboard_size)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        recent_history(&self.store.load(), self.league.history_size)
    }

    pub async fn reset(&self, requested_by: &str) -> Result<(), OpsError> {
        self.store.reset()?;
        self.log(
            "DATABASE RESET",
            format!("Requested by: {}", requested_by),
            Severity::Alert,
        )
        .await;
        Ok(())
    }

    // --- Helper Methods ---

    fn referee(&self, user_id: &str) -> Result<Referee, OpsError> {
        self.store
            .load()
            .referee(user_id)
            .cloned()
            .ok_or_else(|| OpsError::not_registered(user_id))
    }

    /// Mutate one referee inside a store update; unknown ids change nothing
    fn with_referee<T, F>(&self, user_id: &str, change: F) -> Result<T, OpsError>
    where
        F: FnOnce(&mut Referee) -> Result<T, OpsError>,
    {
        self.store.update(|document: &mut Document| {
            let referee = document
                .referees
                .get_mut(user_id)
                .ok_or_else(|| OpsError::not_registered(user_id))?;
            change(referee)
        })
    }

    async fn log(&self, title: &str, description: String, severity: Severity) {
        self.audit.record(AuditEntry::new(title, description, severity)).await;
    }
}
