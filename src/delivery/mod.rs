mod console;
mod messages;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;

use crate::config::settings::DeliverySettings;
use crate::errors::OpsError;

pub use console::{ConsoleAuditLog, ConsoleNotifier};
pub use messages::{AuditEntry, OfferNotice, OutboundMessage, Severity};
pub use webhook::{WebhookAuditLog, WebhookNotifier};

/// Outbound channel to referees and requesters
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver_offer(&self, recipient: &str, offer: &OfferNotice) -> Result<(), OpsError>;

    async fn send_message(&self, recipient: &str, message: &str) -> Result<(), OpsError>;
}

/// Fire-and-forget record of admin-visible events
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry);
}

/// Pick webhook or console implementations based on what is configured
pub fn from_settings(
    settings: &DeliverySettings,
) -> anyhow::Result<(Arc<dyn Notifier>, Arc<dyn AuditLog>)> {
    let notifier: Arc<dyn Notifier> = match &settings.webhook_url {
        Some(url) => {
            info!("Delivering offers through webhook at {}", url);
            Arc::new(WebhookNotifier::new(url, settings)?)
        }
        None => {
            info!("No delivery webhook configured, printing messages to the console");
            Arc::new(ConsoleNotifier)
        }
    };

    let audit: Arc<dyn AuditLog> = match &settings.audit_webhook_url {
        Some(url) => Arc::new(WebhookAuditLog::new(url, settings)?),
        None => Arc::new(ConsoleAuditLog),
    };

    Ok((notifier, audit))
}
