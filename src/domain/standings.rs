use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::models::{Category, Day, Document, HistoryEntry, PeerRating, Referee, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardSort {
    #[default]
    Rating,
    Matches,
}

impl FromStr for LeaderboardSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rating" => Ok(LeaderboardSort::Rating),
            "matches" => Ok(LeaderboardSort::Matches),
            other => Err(format!("unknown leaderboard sort: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: usize,
    pub user_id: UserId,
    pub name: String,
    pub rating: f64,
    pub matches: u32,
}

/// Everything shown on a referee's profile card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefereeProfile {
    pub user_id: UserId,
    pub referee_id: String,
    pub name: String,
    pub category: Category,
    pub rating: f64,
    pub matches_completed: u32,
    pub strikes: String,
    pub status: String,
    pub clubs: Vec<String>,
    pub availability: Vec<Day>,
    pub latest_feedback: Option<PeerRating>,
}

impl RefereeProfile {
    pub fn build(user_id: &str, referee: &Referee, max_strikes: u32, now: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.to_string(),
            referee_id: referee.referee_id.clone(),
            name: referee.name.clone(),
            category: referee.category,
            rating: referee.average_rating(),
            matches_completed: referee.matches_completed,
            strikes: format!("{}/{}", referee.strikes, max_strikes),
            status: referee.status(now).as_str().to_string(),
            clubs: referee.clubs.clone(),
            availability: referee.availability.clone(),
            latest_feedback: referee.latest_rating().cloned(),
        }
    }
}

/// Top `limit` referees, best first
pub fn leaderboard(document: &Document, sort_by: LeaderboardSort, limit: usize) -> Vec<LeaderboardRow> {
    let mut rows: Vec<LeaderboardRow> = document
        .referees
        .iter()
        .map(|(uid, referee)| LeaderboardRow {
            rank: 0,
            user_id: uid.clone(),
            name: referee.name.clone(),
            rating: referee.average_rating(),
            matches: referee.matches_completed,
        })
        .collect();

    // Stable sort keeps document order among ties
    rows.sort_by(|a, b| compare_rows(b, a, sort_by));
    rows.truncate(limit);

    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    rows
}

fn compare_rows(a: &LeaderboardRow, b: &LeaderboardRow, sort_by: LeaderboardSort) -> Ordering {
    match sort_by {
        LeaderboardSort::Rating => a.rating.partial_cmp(&b.rating).unwrap_or(Ordering::Equal),
        LeaderboardSort::Matches => a.matches.cmp(&b.matches),
    }
}

/// Latest `limit` history entries, newest first
pub fn recent_history(document: &Document, limit: usize) -> Vec<HistoryEntry> {
    document.history.iter().rev().take(limit).cloned().collect()
}
