//! Channel subscription.

use futures_util::SinkExt;
use tracing::{debug, info};
use tungstenite::Message;

use super::WsWriter;
use crate::Result;
use crate::models::{Channel, SubscribeRequest};

/// Subscribes to a symbol-based channel (ticker or ohlc).
///
/// `interval` is the candle width in minutes and is only sent for `ohlc`.
///
/// # Errors
///
/// Returns a [`SurgeError`](crate::SurgeError) if sending the subscription message fails.
pub async fn subscribe(
    write: &mut WsWriter,
    channel: &Channel,
    symbols: &[String],
    interval: Option<u32>,
) -> Result<()> {
    let request = SubscribeRequest::new(channel, symbols, interval);
    let json = serde_json::to_string(&request)?;
    debug!("Sending subscribe request: {}", json);
    write.send(Message::Text(json.into())).await?;
    info!(
        channel = channel.as_str(),
        ?symbols,
        "Subscribed to channel"
    );

    Ok(())
}
