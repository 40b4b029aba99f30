use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;

use crate::delivery::{AuditEntry, AuditLog, Notifier, Severity};
use crate::errors::OpsError;
use crate::rate_limiter::RateLimiter;
use crate::store::DataStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BroadcastReport {
    pub sent: usize,
    pub failed: usize,
}

/// Announcements to every registered referee
pub struct BroadcastService {
    store: Arc<DataStore>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditLog>,
    delay_ms: u64,
}

impl BroadcastService {
    pub fn new(
        store: Arc<DataStore>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
        delay_ms: u64,
    ) -> Self {
        Self {
            store,
            notifier,
            audit,
            delay_ms,
        }
    }

    pub async fn broadcast(&self, message: &str, sent_by: &str) -> Result<BroadcastReport, OpsError> {
        if message.trim().is_empty() {
            return Err(OpsError::InvalidInput("announcement cannot be empty".to_string()));
        }

        let recipients: Vec<String> = self.store.load().referees.into_keys().collect();
        let announcement = format!("📢 **ANNOUNCEMENT**\n\n{}", message);
        let mut limiter = RateLimiter::new(self.delay_ms);
        let mut report = BroadcastReport::default();

        info!("Broadcasting to {} referees", recipients.len());
        for recipient in &recipients {
            limiter.wait().await;
            match self.notifier.send_message(recipient, &announcement).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    warn!("Broadcast to {} failed: {}", recipient, e);
                    report.failed += 1;
                }
            }
        }

        self.audit
            .record(AuditEntry::new(
                "BROADCAST SENT",
                format!(
                    "By: {}\nSent: {}\nFailed: {}\nMessage: {}",
                    sent_by, report.sent, report.failed, message
                ),
                Severity::Info,
            ))
            .await;
        Ok(report)
    }
}
