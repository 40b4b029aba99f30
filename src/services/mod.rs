pub mod assignment;
pub mod broadcast;
pub mod offers;
pub mod registration;
pub mod roster;
pub mod server;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;

pub use assignment::{AssignmentRequest, AssignmentService, SessionOutcome};
pub use broadcast::{BroadcastReport, BroadcastService};
pub use offers::OfferBook;
pub use registration::RegistrationService;
pub use roster::{LeaveOutcome, RosterService};
pub use server::ServerService;
pub use sessions::{SessionBoard, SessionStatus, SessionView};
