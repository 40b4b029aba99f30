use async_trait::async_trait;
use log::{debug, error, info};

use super::{AuditEntry, AuditLog, Notifier, OfferNotice, OutboundMessage};
use crate::config::settings::DeliverySettings;
use crate::errors::{delivery_context, OpsError};
use crate::http::RateLimitedClient;

/// Posts offers and direct messages to the chat gateway's webhook
pub struct WebhookNotifier {
    base_url: String,
    client: RateLimitedClient,
}

impl WebhookNotifier {
    pub fn new(base_url: &str, settings: &DeliverySettings) -> anyhow::Result<Self> {
        let client = RateLimitedClient::new(
            settings.user_agent,
            settings.timeout_secs,
            settings.rate_limit_ms,
        )?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn recipient_url(&self, recipient: &str) -> String {
        format!(
            "{}/recipients/{}/messages",
            self.base_url,
            urlencoding::encode(recipient)
        )
    }

    async fn post(&self, kind: &str, recipient: &str, body: &OutboundMessage<'_>) -> Result<(), OpsError> {
        let url = self.recipient_url(recipient);
        debug!("POST {} ({})", url, kind);
        self.client
            .post_json(&url, body)
            .await
            .map(|_| ())
            .map_err(|e| {
                error!("{}: {:#}", delivery_context(kind, recipient), e);
                OpsError::delivery(recipient, format!("{:#}", e))
            })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn deliver_offer(&self, recipient: &str, offer: &OfferNotice) -> Result<(), OpsError> {
        self.post("offer", recipient, &OutboundMessage::offer(offer)).await
    }

    async fn send_message(&self, recipient: &str, message: &str) -> Result<(), OpsError> {
        self.post("message", recipient, &OutboundMessage::text(message)).await
    }
}

/// Mirrors audit entries to a webhook; the local log always gets a copy
pub struct WebhookAuditLog {
    url: String,
    client: RateLimitedClient,
}

impl WebhookAuditLog {
    pub fn new(url: &str, settings: &DeliverySettings) -> anyhow::Result<Self> {
        let client = RateLimitedClient::new(
            settings.user_agent,
            settings.timeout_secs,
            settings.rate_limit_ms,
        )?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

#[async_trait]
impl AuditLog for WebhookAuditLog {
    async fn record(&self, entry: AuditEntry) {
        info!("{}: {}", entry.title, entry.description);
        // audit failures never block the caller
        if let Err(e) = self.client.post_json(&self.url, &entry).await {
            error!("Failed to post audit entry '{}': {:#}", entry.title, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_url_is_encoded() {
        let notifier =
            WebhookNotifier::new("http://gateway.local/", &DeliverySettings::default()).unwrap();
        assert_eq!(
            notifier.recipient_url("user 55"),
            "http://gateway.local/recipients/user%2055/messages"
        );
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_delivery_failure() {
        let settings = DeliverySettings {
            timeout_secs: 1,
            rate_limit_ms: 0,
            ..DeliverySettings::default()
        };
        let notifier = WebhookNotifier::new("http://127.0.0.1:9", &settings).unwrap();
        let err = notifier.send_message("55", "hello").await.unwrap_err();
        assert!(matches!(err, OpsError::DeliveryFailed { ref recipient, .. } if recipient == "55"));
    }
}
