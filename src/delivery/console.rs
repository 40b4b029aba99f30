use async_trait::async_trait;
use colored::Colorize;
use log::info;

use super::{AuditEntry, AuditLog, Notifier, OfferNotice, Severity};
use crate::errors::OpsError;

/// Prints outbound messages instead of sending them. Used when no webhook is set.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn deliver_offer(&self, recipient: &str, offer: &OfferNotice) -> Result<(), OpsError> {
        println!(
            "{} {} -> {} at {} ({}), offer {} expires {}",
            "[OFFER]".yellow().bold(),
            recipient,
            offer.fixture,
            offer.kickoff,
            offer.stadium,
            offer.offer_id,
            offer.expires_at.format("%Y-%m-%d %H:%M")
        );
        Ok(())
    }

    async fn send_message(&self, recipient: &str, message: &str) -> Result<(), OpsError> {
        println!("{} {} -> {}", "[DM]".cyan().bold(), recipient, message);
        Ok(())
    }
}

pub struct ConsoleAuditLog;

#[async_trait]
impl AuditLog for ConsoleAuditLog {
    async fn record(&self, entry: AuditEntry) {
        let title = match entry.severity {
            Severity::Info => entry.title.blue(),
            Severity::Success => entry.title.green(),
            Severity::Warning => entry.title.yellow(),
            Severity::Alert => entry.title.red(),
        };
        info!("{}: {}", title, entry.description);
    }
}
