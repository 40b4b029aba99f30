use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::models::{Category, Day, Document, Referee, UserId};
use crate::config::clubs::{ClubRoster, MAX_PICKS_PER_GROUP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStep {
    Invited,
    ClubsChosen,
    DaysChosen,
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    #[error("registration step out of order: expected {expected:?}, currently {actual:?}")]
    OutOfOrder {
        expected: RegistrationStep,
        actual: RegistrationStep,
    },

    #[error("{0} is not a league club")]
    UnknownClub(String),

    #[error("at most 5 clubs may be picked from each group")]
    TooManyClubs,

    #[error("at least one working day must be selected")]
    NoDays,

    #[error("user {0} is already registered")]
    AlreadyRegistered(UserId),
}

/// An invited referee working through club and day selection
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user_id: UserId,
    pub name: String,
    pub category: Category,
    pub clubs: Vec<String>,
    pub days: Vec<Day>,
    step: RegistrationStep,
}

impl Registration {
    pub fn invite(user_id: UserId, name: String, category: Category) -> Self {
        Self {
            user_id,
            name,
            category,
            clubs: Vec::new(),
            days: Vec::new(),
            step: RegistrationStep::Invited,
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn choose_clubs(&mut self, clubs: Vec<String>, roster: &ClubRoster) -> Result<(), RegistrationError> {
        self.expect_step(RegistrationStep::Invited)?;
        self.clubs = validate_clubs(clubs, roster)?;
        self.step = RegistrationStep::ClubsChosen;
        Ok(())
    }

    pub fn choose_days(&mut self, days: Vec<Day>) -> Result<(), RegistrationError> {
        self.expect_step(RegistrationStep::ClubsChosen)?;
        self.days = normalize_days(days)?;
        self.step = RegistrationStep::DaysChosen;
        Ok(())
    }

    /// Create the referee record and consume one sequence number
    pub fn finalize(
        &self,
        document: &mut Document,
        id_prefix: &str,
        today: NaiveDate,
    ) -> Result<String, RegistrationError> {
        self.expect_step(RegistrationStep::DaysChosen)?;
        if document.is_registered(&self.user_id) {
            return Err(RegistrationError::AlreadyRegistered(self.user_id.clone()));
        }

        let referee_id = format_referee_id(id_prefix, document.config.id_counter);
        document.referees.insert(
            self.user_id.clone(),
            Referee {
                referee_id: referee_id.clone(),
                name: self.name.clone(),
                strikes: 0,
                matches_completed: 0,
                category: self.category,
                joined_at: today,
                clubs: self.clubs.clone(),
                availability: self.days.clone(),
                suspended: false,
                ratings: Vec::new(),
                loa_until: None,
                current_match: None,
            },
        );
        document.config.id_counter += 1;

        Ok(referee_id)
    }

    fn expect_step(&self, expected: RegistrationStep) -> Result<(), RegistrationError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(RegistrationError::OutOfOrder {
                expected,
                actual: self.step,
            })
        }
    }
}

pub fn format_referee_id(prefix: &str, counter: u32) -> String {
    format!("{}-{:03}", prefix, counter)
}

/// Deduplicated weekday list, in calendar order
pub fn normalize_days(mut days: Vec<Day>) -> Result<Vec<Day>, RegistrationError> {
    days.sort();
    days.dedup();
    if days.is_empty() {
        return Err(RegistrationError::NoDays);
    }
    Ok(days)
}

fn validate_clubs(clubs: Vec<String>, roster: &ClubRoster) -> Result<Vec<String>, RegistrationError> {
    let mut unique: Vec<String> = Vec::new();
    let mut per_group = [0usize; 2];

    for club in clubs {
        if unique.contains(&club) {
            continue;
        }
        let group = roster
            .group_of(&club)
            .ok_or_else(|| RegistrationError::UnknownClub(club.clone()))?;
        per_group[group] += 1;
        unique.push(club);
    }

    if per_group.iter().any(|&n| n > MAX_PICKS_PER_GROUP) {
        return Err(RegistrationError::TooManyClubs);
    }
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn completed(user_id: &str) -> Registration {
        let mut reg = Registration::invite(user_id.to_string(), format!("Ref {}", user_id), Category::C);
        reg.choose_clubs(vec!["Juventus".to_string()], &ClubRoster::default()).unwrap();
        reg.choose_days(vec![Day::Friday, Day::Monday, Day::Friday]).unwrap();
        reg
    }

    #[test]
    fn test_counter_advances_once_per_registration() {
        let mut doc = Document::new();
        let start = doc.config.id_counter;
        let mut ids = HashSet::new();

        for n in 0..12 {
            let id = completed(&n.to_string()).finalize(&mut doc, "BFL", today()).unwrap();
            assert!(ids.insert(id));
        }

        assert_eq!(doc.config.id_counter, start + 12);
        assert_eq!(doc.referee("0").unwrap().referee_id, "BFL-001");
        assert_eq!(doc.referee("11").unwrap().referee_id, "BFL-012");
    }

    #[test]
    fn test_finalized_record_defaults() {
        let mut doc = Document::new();
        completed("5").finalize(&mut doc, "BFL", today()).unwrap();

        let r = doc.referee("5").unwrap();
        assert_eq!(r.availability, vec![Day::Monday, Day::Friday]);
        assert_eq!(r.clubs, vec!["Juventus".to_string()]);
        assert_eq!(r.joined_at, today());
        assert_eq!((r.strikes, r.matches_completed, r.suspended), (0, 0, false));
    }

    #[test]
    fn test_steps_must_run_in_order() {
        let mut reg = Registration::invite("1".to_string(), "A".to_string(), Category::A);
        assert!(matches!(
            reg.choose_days(vec![Day::Monday]),
            Err(RegistrationError::OutOfOrder { .. })
        ));

        let mut doc = Document::new();
        assert!(reg.finalize(&mut doc, "BFL", today()).is_err());
        assert_eq!(doc.config.id_counter, 1);
    }

    #[test]
    fn test_club_rules() {
        let roster = ClubRoster::default();
        let mut reg = Registration::invite("1".to_string(), "A".to_string(), Category::A);
        assert_eq!(
            reg.choose_clubs(vec!["Nowhere Athletic".to_string()], &roster),
            Err(RegistrationError::UnknownClub("Nowhere Athletic".to_string()))
        );

        let six_from_first_group: Vec<String> =
            roster.all()[..6].iter().map(|c| c.to_string()).collect();
        assert_eq!(
            reg.choose_clubs(six_from_first_group, &roster),
            Err(RegistrationError::TooManyClubs)
        );

        let mut picks: Vec<String> = roster.all()[..5].iter().map(|c| c.to_string()).collect();
        picks.extend(roster.all()[20..25].iter().map(|c| c.to_string()));
        picks.push(roster.all()[0].to_string());
        reg.choose_clubs(picks, &roster).unwrap();
        assert_eq!(reg.clubs.len(), 10);
        assert_eq!(reg.step(), RegistrationStep::ClubsChosen);
    }

    #[test]
    fn test_empty_club_list_is_fine_but_days_are_required() {
        let mut reg = Registration::invite("1".to_string(), "A".to_string(), Category::B);
        reg.choose_clubs(vec![], &ClubRoster::default()).unwrap();
        assert_eq!(reg.choose_days(vec![]), Err(RegistrationError::NoDays));
    }

    #[test]
    fn test_already_registered_is_rejected() {
        let mut doc = Document::new();
        completed("1").finalize(&mut doc, "BFL", today()).unwrap();

        assert_eq!(
            completed("1").finalize(&mut doc, "BFL", today()),
            Err(RegistrationError::AlreadyRegistered("1".to_string()))
        );
        assert_eq!(doc.config.id_counter, 2);
    }
}
