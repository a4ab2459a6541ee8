//! Alert rendering and delivery.
//!
//! - [`text`] - Alert message formatting
//! - [`link`] - Exchange deep links for an instrument
//! - [`humanize`] - Locale-aware rendering of large figures
//! - [`telegram`] - Telegram Bot API transport

pub mod humanize;
pub mod link;
pub mod telegram;
pub mod text;

use async_trait::async_trait;

pub use humanize::{Locale, human_readable};
pub use link::exchange_link;
pub use telegram::TelegramBot;
pub use text::{Alert, AlertFormat, create_text};

/// Outbound notification transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers `text` to `chat_id` using the bot identified by `bot_token`.
    ///
    /// The core never retries; a failed send is reported to the caller.
    async fn send_message(&self, bot_token: &str, chat_id: i64, text: &str) -> crate::Result<()>;

    /// Releases transport resources. Later sends may fail.
    async fn close(&self) {}
}
