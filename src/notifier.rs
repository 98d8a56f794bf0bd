use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{error, warn};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Channel {
    Telegram {
        endpoint: String,
        chat_id: String,
        client: reqwest::Client,
    },
    Unconfigured,
}

#[derive(Debug)]
pub struct Notifier {
    channel: Channel,
}

impl Notifier {
    pub fn new(credentials: Option<(String, String)>) -> Result<Self> {
        Self::with_api_base(credentials, TELEGRAM_API_BASE)
    }

    pub fn with_api_base(credentials: Option<(String, String)>, api_base: &str) -> Result<Self> {
        let channel = match credentials {
            Some((token, chat_id)) => {
                let client = reqwest::Client::builder()
                    .timeout(SEND_TIMEOUT)
                    .build()
                    .context("Failed to create notification HTTP client")?;
                Channel::Telegram {
                    endpoint: format!("{}/bot{}/sendMessage", api_base.trim_end_matches('/'), token),
                    chat_id,
                    client,
                }
            }
            None => {
                warn!("Telegram notifier is not fully configured. Notifications will be skipped.");
                Channel::Unconfigured
            }
        };
        Ok(Self { channel })
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.channel, Channel::Telegram { .. })
    }

    pub async fn send(&self, message: &str) {
        let Channel::Telegram { endpoint, chat_id, client } = &self.channel else {
            warn!("Attempted to send a notification, but the Telegram notifier is not configured.");
            return;
        };

        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "Markdown",
        });

        let outcome = client
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        if let Err(e) = outcome {
            // The request URL embeds the bot token.
            error!("Failed to send Telegram notification: {}", e.without_url());
        }
    }
}
