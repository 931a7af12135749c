//! Notification delivery.
//!
//! Channel lookup is modeled as a capability interface with named error
//! variants, not runtime inspection of a channel object: a destination either
//! accepts the message, does not exist, or cannot receive messages.

use async_trait::async_trait;
use serde_json::json;

use crate::error::SendError;

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
    pub url: Option<String>,
}

/// Delivers a formatted message to a destination channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, channel_id: u64, message: &AlertMessage) -> Result<(), SendError>;
}

/// Discord REST delivery using a bot token.
pub struct DiscordNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl DiscordNotifier {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self::with_api_base("https://discord.com/api/v10", bot_token)
    }

    /// Point at a different API base (tests).
    pub fn with_api_base(api_base: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into(),
            bot_token: bot_token.into(),
        }
    }

    fn render(message: &AlertMessage) -> String {
        let mut content = format!("**{}**\n{}", message.title, message.body);
        if let Some(url) = &message.url {
            content.push('\n');
            content.push_str(url);
        }
        content
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, channel_id: u64, message: &AlertMessage) -> Result<(), SendError> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let body = json!({ "content": Self::render(message) });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&body)
            .send()
            .await?;

        match resp.status().as_u16() {
            200..=299 => Ok(()),
            404 => Err(SendError::ChannelNotFound(channel_id)),
            403 => Err(SendError::NotMessagingCapable(channel_id)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(SendError::Rejected { status, body })
            }
        }
    }
}
