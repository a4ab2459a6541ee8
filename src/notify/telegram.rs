//! Telegram Bot API transport.
//!
//! Sends plain-text messages through the
//! [`sendMessage`](https://core.telegram.org/bots/api#sendmessage) method.
//! The bot token is supplied per call because it lives in the hot-reloaded
//! settings rather than in the transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::Notifier;
use crate::error::SurgeError;

/// Body of a `sendMessage` request.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Envelope every Bot API response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

/// Telegram client holding a pooled HTTP connection.
pub struct TelegramBot {
    api_url: String,
    client: RwLock<Option<reqwest::Client>>,
}

impl TelegramBot {
    /// Creates a client for the Bot API rooted at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SurgeError::Http`] if the HTTP client cannot be built.
    pub fn new(api_url: &str) -> crate::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            client: RwLock::new(Some(client)),
        })
    }

    fn method_url(&self, bot_token: &str, method: &str) -> String {
        format!("{}/bot{bot_token}/{method}", self.api_url)
    }
}

#[async_trait]
impl Notifier for TelegramBot {
    async fn send_message(&self, bot_token: &str, chat_id: i64, text: &str) -> crate::Result<()> {
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or_else(|| SurgeError::Telegram("client is closed".to_string()))?;

        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        // Errors must not carry the URL: it embeds the bot token
        let response = client
            .post(self.method_url(bot_token, "sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| SurgeError::Http(e.without_url()))?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| SurgeError::Http(e.without_url()))?;

        let body: ApiResponse = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(SurgeError::Telegram(format!(
                    "sendMessage failed ({}): {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("unexpected response")
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() || !body.ok {
            return Err(SurgeError::Telegram(format!(
                "sendMessage failed ({}): {}",
                body.error_code.unwrap_or(status.as_u16()),
                body.description.as_deref().unwrap_or("no description")
            )));
        }

        debug!(chat_id, "Telegram message delivered");
        Ok(())
    }

    async fn close(&self) {
        if self.client.write().await.take().is_some() {
            info!("Telegram client closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_method_url() {
        let bot = TelegramBot::new("https://api.telegram.org/").unwrap();
        assert_eq!(
            bot.method_url("123:abc", "sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn request_serializes() {
        let request = SendMessageRequest {
            chat_id: -100_123,
            text: "hello",
            disable_web_page_preview: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["chat_id"], -100_123);
        assert_eq!(value["text"], "hello");
        assert_eq!(value["disable_web_page_preview"], true);
    }

    #[test]
    fn error_response_deserializes() {
        let body: ApiResponse = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap();
        assert!(!body.ok);
        assert_eq!(body.error_code, Some(400));
        assert_eq!(
            body.description.as_deref(),
            Some("Bad Request: chat not found")
        );
    }

    #[tokio::test]
    async fn send_after_close_fails() {
        let bot = TelegramBot::new("http://127.0.0.1:9").unwrap();
        bot.close().await;

        let err = bot.send_message("t", 1, "hi").await.unwrap_err();
        assert!(matches!(err, SurgeError::Telegram(_)));
    }
}
