use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Stable chat-platform user identifier, the key of the referee map
pub type UserId = String;

/// The whole persisted document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub referees: BTreeMap<UserId, Referee>,
    #[serde(default)]
    pub config: StoreConfig,
    // Older documents predate match history
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            referees: BTreeMap::new(),
            config: StoreConfig::default(),
            history: Vec::new(),
        }
    }

    pub fn referee(&self, user_id: &str) -> Option<&Referee> {
        self.referees.get(user_id)
    }

    pub fn is_registered(&self, user_id: &str) -> bool {
        self.referees.contains_key(user_id)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Next sequence number handed out at registration; never reused
    pub id_counter: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { id_counter: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referee {
    pub referee_id: String,
    pub name: String,
    #[serde(default)]
    pub strikes: u32,
    #[serde(default)]
    pub matches_completed: u32,
    pub category: Category,
    pub joined_at: NaiveDate,
    /// Clubs this referee must not officiate
    #[serde(default)]
    pub clubs: Vec<String>,
    #[serde(default)]
    pub availability: Vec<Day>,
    #[serde(default)]
    pub suspended: bool,
    #[serde(default)]
    pub ratings: Vec<PeerRating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loa_until: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_match: Option<MatchRecord>,
}

impl Referee {
    pub fn is_on_leave(&self, now: NaiveDateTime) -> bool {
        self.loa_until.is_some_and(|until| now < until)
    }

    pub fn is_available_on(&self, day: Day) -> bool {
        self.availability.contains(&day)
    }

    pub fn has_conflict_with(&self, club: &str) -> bool {
        self.clubs.iter().any(|c| c == club)
    }

    /// Mean of all peer ratings, 0.0 when nobody has rated yet
    pub fn average_rating(&self) -> f64 {
        if self.ratings.is_empty() {
            return 0.0;
        }
        let total: u32 = self.ratings.iter().map(|r| u32::from(r.stars)).sum();
        f64::from(total) / self.ratings.len() as f64
    }

    pub fn latest_rating(&self) -> Option<&PeerRating> {
        self.ratings.last()
    }

    /// Leave wins over suspension when both apply
    pub fn status(&self, now: NaiveDateTime) -> RefereeStatus {
        if self.is_on_leave(now) {
            RefereeStatus::OnLeave
        } else if self.suspended {
            RefereeStatus::Suspended
        } else {
            RefereeStatus::Active
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefereeStatus {
    Active,
    Suspended,
    OnLeave,
}

impl RefereeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RefereeStatus::Active => "ACTIVE",
            RefereeStatus::Suspended => "SUSPENDED",
            RefereeStatus::OnLeave => "ON LEAVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerRating {
    pub from: UserId,
    pub from_name: String,
    pub stars: u8,
    pub comment: String,
    pub date: NaiveDate,
}

/// Snapshot of an accepted match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub fixture: String,
    pub time: String,
    pub stadium: String,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub ref_id: UserId,
    pub ref_name: String,
    #[serde(flatten)]
    pub record: MatchRecord,
}

/// Referee skill tier; `A` is the top tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Category A")]
    A,
    #[serde(rename = "Category B")]
    B,
    #[serde(rename = "Category C")]
    C,
}

impl Category {
    pub fn is_top(&self) -> bool {
        matches!(self, Category::A)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::A => "Category A",
            Category::B => "Category B",
            Category::C => "Category C",
        };
        f.write_str(label)
    }
}

/// Competition type of a fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    #[serde(rename = "Cup (Category A)")]
    Cup,
    #[serde(rename = "Category A")]
    CategoryA,
    #[serde(rename = "Category B")]
    CategoryB,
    #[serde(rename = "Category C")]
    CategoryC,
}

impl MatchType {
    /// Only the cup restricts who may officiate
    pub fn requires_top_category(&self) -> bool {
        matches!(self, MatchType::Cup)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MatchType::Cup => "Cup (Category A)",
            MatchType::CategoryA => "Category A",
            MatchType::CategoryB => "Category B",
            MatchType::CategoryC => "Category C",
        };
        f.write_str(label)
    }
}

/// Weekday as stored in availability lists ("Monday" … "Sunday")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Day::Monday,
            Weekday::Tue => Day::Tuesday,
            Weekday::Wed => Day::Wednesday,
            Weekday::Thu => Day::Thursday,
            Weekday::Fri => Day::Friday,
            Weekday::Sat => Day::Saturday,
            Weekday::Sun => Day::Sunday,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
