pub mod eligibility;
pub mod models;
pub mod offer;
pub mod registration;
pub mod standings;

pub use eligibility::{eligible_pool, is_eligible, MatchCriteria};
pub use models::*;
pub use offer::{MatchDetails, Offer, OfferDecision, OfferError, OfferState};
pub use registration::{Registration, RegistrationError, RegistrationStep};
pub use standings::{LeaderboardRow, LeaderboardSort, RefereeProfile};
