use chrono::{Datelike, NaiveDateTime};

use super::models::{Day, Document, MatchType, Referee, UserId};

/// What a fixture needs from a referee at a given instant
#[derive(Debug, Clone)]
pub struct MatchCriteria<'a> {
    pub day: Day,
    pub now: NaiveDateTime,
    pub match_type: MatchType,
    pub home: &'a str,
    pub away: &'a str,
}

impl<'a> MatchCriteria<'a> {
    /// Criteria for a fixture assigned at `now`; the weekday is taken from `now`
    pub fn at(now: NaiveDateTime, match_type: MatchType, home: &'a str, away: &'a str) -> Self {
        Self {
            day: Day::from(now.weekday()),
            now,
            match_type,
            home,
            away,
        }
    }
}

pub fn is_eligible(
    user_id: &str,
    referee: &Referee,
    criteria: &MatchCriteria<'_>,
    excluded: &[UserId],
) -> bool {
    !is_excluded(user_id, excluded)
        && referee.is_available_on(criteria.day)
        && !referee.suspended
        && !referee.is_on_leave(criteria.now)
        && meets_category(referee, criteria.match_type)
        && !has_club_conflict(referee, criteria)
}

/// User ids of every referee passing the filter, in document order
pub fn eligible_pool(
    document: &Document,
    criteria: &MatchCriteria<'_>,
    excluded: &[UserId],
) -> Vec<UserId> {
    document
        .referees
        .iter()
        .filter(|(uid, referee)| is_eligible(uid, referee, criteria, excluded))
        .map(|(uid, _)| uid.clone())
        .collect()
}

fn is_excluded(user_id: &str, excluded: &[UserId]) -> bool {
    excluded.iter().any(|e| e == user_id)
}

fn meets_category(referee: &Referee, match_type: MatchType) -> bool {
    !match_type.requires_top_category() || referee.category.is_top()
}

fn has_club_conflict(referee: &Referee, criteria: &MatchCriteria<'_>) -> bool {
    referee.has_conflict_with(criteria.home) || referee.has_conflict_with(criteria.away)
}
