use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::notify::NotificationSender;

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Posts messages to a Slack incoming webhook
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSender for SlackNotifier {
    async fn send(&self, message: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookMessage { text: message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Unexpected(format!(
                "Slack webhook returned {}: {}",
                status, body
            )));
        }

        debug!("Slack notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_payload_shape() {
        let payload = serde_json::to_value(WebhookMessage { text: "hello" }).unwrap();
        assert_eq!(payload, serde_json::json!({"text": "hello"}));
    }
}
