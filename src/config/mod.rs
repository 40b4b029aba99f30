pub mod clubs;
pub mod settings;

pub use clubs::{get_clubs, ClubRoster};
pub use settings::{AppConfig, ExpiryPolicy};
