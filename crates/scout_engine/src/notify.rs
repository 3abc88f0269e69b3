use std::time::Duration;

use scout_core::Bounty;
use scout_logging::{scout_info, scout_warn};
use serde_json::json;

use crate::NotifyError;

/// Delivers one winning bounty to a downstream channel.
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, bounty: &Bounty) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Posts the winner to a Slack incoming webhook.
#[derive(Debug, Clone)]
pub struct SlackWebhookSink {
    webhook_url: Option<String>,
    settings: NotifySettings,
}

impl SlackWebhookSink {
    /// A sink without a webhook reports [`NotifyError::NotConfigured`] on every delivery.
    pub fn new(webhook_url: Option<String>, settings: NotifySettings) -> Self {
        let webhook_url = webhook_url.filter(|url| !url.trim().is_empty());
        Self {
            webhook_url,
            settings,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    fn build_client(&self) -> Result<reqwest::Client, NotifyError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| NotifyError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl NotificationSink for SlackWebhookSink {
    async fn deliver(&self, bounty: &Bounty) -> Result<(), NotifyError> {
        let Some(webhook_url) = self.webhook_url.as_deref() else {
            scout_warn!("Slack webhook not configured");
            return Err(NotifyError::NotConfigured);
        };
        let url = reqwest::Url::parse(webhook_url)
            .map_err(|err| NotifyError::InvalidUrl(err.to_string()))?;
        let client = self.build_client()?;

        let response = client
            .post(url)
            .json(&json!({ "text": format_message(bounty) }))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        scout_info!("Slack notification sent for {}", bounty.link);
        Ok(())
    }
}

/// Slack mrkdwn text announcing a bounty.
pub fn format_message(bounty: &Bounty) -> String {
    format!(
        "🔥 New Top Bounty!\n*{}*\n💰 ${}\n🔗 {}",
        bounty.title, bounty.value, bounty.link
    )
}

fn map_reqwest_error(err: reqwest::Error) -> NotifyError {
    if err.is_timeout() {
        return NotifyError::Timeout(err.to_string());
    }
    NotifyError::Network(err.to_string())
}
