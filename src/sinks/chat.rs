use super::{AlertSink, SinkError};
use crate::config::ChatConfig;
use crate::types::Alert;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::info;

/// Posts a severity-colored, block-formatted message to a chat webhook.
pub struct ChatSink {
    client: Client,
    config: ChatConfig,
}

impl ChatSink {
    pub fn new(config: ChatConfig, timeout: Duration) -> Result<Self, SinkError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            config,
        })
    }

    pub fn payload(&self, alert: &Alert) -> JsonValue {
        let event = &alert.event;
        let severity = alert.severity();
        let headline = format!(
            "*[{}] @{}* ({} followers) mentioned *{}*\n>{}",
            severity.to_string().to_uppercase(),
            event.author_handle,
            event.follower_count,
            alert.keyword.text,
            event.match_text().replace('\n', "\n>"),
        );

        serde_json::json!({
            "channel": self.config.channel,
            "username": self.config.username,
            "icon_emoji": self.config.icon_emoji,
            "attachments": [{
                "color": severity.color(),
                "blocks": [
                    {
                        "type": "section",
                        "text": { "type": "mrkdwn", "text": headline }
                    },
                    {
                        "type": "context",
                        "elements": [{
                            "type": "mrkdwn",
                            "text": format!("Posted {}", event.created_at.to_rfc3339())
                        }]
                    },
                    {
                        "type": "actions",
                        "elements": [{
                            "type": "button",
                            "text": { "type": "plain_text", "text": "Open post" },
                            "url": alert.permalink
                        }]
                    }
                ]
            }]
        })
    }
}

#[async_trait]
impl AlertSink for ChatSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let payload = self.payload(alert);

        if self.config.test_only {
            info!("[Chat] Test mode, not sending: {}", payload);
            return Ok(());
        }

        let response = self
            .client
            .post(&self.config.webhook_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Status(response.status()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "chat-webhook"
    }
}
