//! Kraken-backed candle producer.
//!
//! [`FeedConnection`] keeps a WebSocket open to Kraken, subscribes to the
//! `ohlc` and `ticker` channels for the configured symbols, and writes every
//! update into buffers shared with [`KrakenProducer`]. It reconnects with
//! exponential backoff and treats a silent connection as lost.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use tungstenite::Message as WsMessage;

use super::{WsReader, connect, ping, subscribe};
use crate::config::KrakenConfig;
use crate::error::SurgeError;
use crate::models::candle::CandleUpdateResponse;
use crate::models::ticker::TickerUpdateResponse;
use crate::models::{Candle, Channel, DailyStats, StatusUpdateResponse};
use crate::screener::{Producer, Snapshot};

/// Initial backoff duration between reconnection attempts.
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Maximum backoff duration between reconnection attempts.
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Kraken heartbeats every second; this much silence means the link is dead.
const STALE_AFTER: Duration = Duration::from_secs(30);

/// Candles and daily figures collected so far.
#[derive(Debug, Default)]
struct FeedBuffers {
    candles: HashMap<String, Vec<Candle>>,
    daily: HashMap<String, DailyStats>,
    connected: bool,
}

/// A message from the feed that changes the buffers.
#[derive(Debug)]
enum FeedEvent {
    Candles(CandleUpdateResponse),
    Ticker(TickerUpdateResponse),
    Status(StatusUpdateResponse),
    Heartbeat,
}

/// [`Producer`] serving snapshots of the candles a [`FeedConnection`] collects.
#[derive(Clone)]
pub struct KrakenProducer {
    buffers: Arc<RwLock<FeedBuffers>>,
}

impl KrakenProducer {
    /// Creates the producer and the connection task that fills it.
    ///
    /// Spawn [`FeedConnection::run`] to start collecting.
    #[must_use]
    pub fn new(config: &KrakenConfig) -> (Self, FeedConnection) {
        let buffers = Arc::new(RwLock::new(FeedBuffers::default()));
        let connection = FeedConnection {
            url: config.websocket_url.clone(),
            symbols: config.symbols.clone(),
            candle_interval: config.candle_interval,
            history: config.candle_history.max(1),
            buffers: Arc::clone(&buffers),
        };
        (Self { buffers }, connection)
    }
}

#[async_trait]
impl Producer for KrakenProducer {
    async fn fetch_collected_data(&self) -> crate::Result<Snapshot> {
        let buffers = self.buffers.read().await;
        if !buffers.connected {
            return Err(SurgeError::FeedUnavailable(
                "not connected to Kraken".to_string(),
            ));
        }
        Ok(buffers.candles.clone())
    }

    async fn daily_stats(&self, symbol: &str) -> Option<DailyStats> {
        self.buffers.read().await.daily.get(symbol).copied()
    }
}

/// Manages the WebSocket connection lifecycle including reconnection
/// with exponential backoff.
pub struct FeedConnection {
    url: String,
    symbols: Vec<String>,
    candle_interval: u32,
    history: usize,
    buffers: Arc<RwLock<FeedBuffers>>,
}

impl FeedConnection {
    /// Runs the connection loop indefinitely.
    ///
    /// Connects, subscribes, and reads updates into the shared buffers,
    /// reconnecting with exponential backoff whenever the link drops.
    pub async fn run(self) {
        let mut backoff = INITIAL_BACKOFF;

        loop {
            info!(url = %self.url, "Connecting to WebSocket");
            let (mut write, read) = match connect(&self.url).await {
                Ok(pair) => pair,
                Err(e) => {
                    error!("Connection failed: {e}");
                    info!(backoff_secs = backoff.as_secs(), "Backing off before retry");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                    continue;
                }
            };

            if let Err(e) = self.subscribe_all(&mut write).await {
                warn!("Subscription failed: {e}");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }

            self.buffers.write().await.connected = true;
            info!(symbols = self.symbols.len(), "WebSocket connected and subscribed");

            // Reset backoff on successful connection
            backoff = INITIAL_BACKOFF;

            self.read_loop(read).await;

            self.buffers.write().await.connected = false;
            info!(backoff_secs = backoff.as_secs(), "Connection lost, backing off");
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    async fn subscribe_all(&self, write: &mut super::WsWriter) -> crate::Result<()> {
        ping(write).await?;
        subscribe(
            write,
            &Channel::Candles,
            &self.symbols,
            Some(self.candle_interval),
        )
        .await?;
        subscribe(write, &Channel::Ticker, &self.symbols, None).await?;
        Ok(())
    }

    /// Reads messages until the connection errors, closes, or goes quiet.
    async fn read_loop(&self, mut read: WsReader) {
        loop {
            let msg = match tokio::time::timeout(STALE_AFTER, read.next()).await {
                Ok(msg) => msg,
                Err(_) => {
                    warn!(silent_secs = STALE_AFTER.as_secs(), "WebSocket went quiet");
                    return;
                }
            };

            match msg {
                Some(Ok(WsMessage::Text(text))) => {
                    let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) else {
                        debug!("Ignoring non-JSON frame");
                        continue;
                    };
                    if let Some(event) = parse_ws_message(value) {
                        self.apply(event).await;
                    }
                }
                Some(Ok(WsMessage::Close(_))) => {
                    warn!("WebSocket closed by server");
                    return;
                }
                Some(Ok(_)) => {} // Binary/Ping/Pong frames
                Some(Err(e)) => {
                    warn!("WebSocket error: {e}");
                    return;
                }
                None => {
                    warn!("WebSocket stream ended");
                    return;
                }
            }
        }
    }

    async fn apply(&self, event: FeedEvent) {
        match event {
            FeedEvent::Candles(response) => {
                let mut buffers = self.buffers.write().await;
                for data in &response.data {
                    match Candle::try_from(data) {
                        Ok(candle) => {
                            let buffer = buffers.candles.entry(data.symbol.clone()).or_default();
                            upsert_candle(buffer, candle, self.history);
                        }
                        Err(e) => warn!("Dropping candle: {e}"),
                    }
                }
            }
            FeedEvent::Ticker(response) => {
                let mut buffers = self.buffers.write().await;
                for data in &response.data {
                    buffers
                        .daily
                        .insert(data.symbol.clone(), DailyStats::from(data));
                }
            }
            FeedEvent::Status(response) => {
                for data in &response.data {
                    info!(system = %data.system, version = %data.version, "Kraken status");
                }
            }
            FeedEvent::Heartbeat => {}
        }
    }
}

/// Parses a WebSocket JSON message into a [`FeedEvent`].
fn parse_ws_message(value: serde_json::Value) -> Option<FeedEvent> {
    let method = value.get("method").and_then(|m| m.as_str());
    let channel = value.get("channel").and_then(|c| c.as_str());

    // RPC acknowledgements (pong, subscribe) carry no data
    if let Some(method) = method {
        if value.get("success").and_then(|s| s.as_bool()) == Some(false) {
            warn!(
                method,
                error = value.get("error").and_then(|e| e.as_str()).unwrap_or("unknown"),
                "Kraken rejected request"
            );
        }
        return None;
    }

    let channel = channel?.to_string();
    let parsed = match channel.as_str() {
        "heartbeat" => return Some(FeedEvent::Heartbeat),
        "status" => serde_json::from_value(value).map(FeedEvent::Status),
        "ohlc" => serde_json::from_value(value).map(FeedEvent::Candles),
        "ticker" => serde_json::from_value(value).map(FeedEvent::Ticker),
        _ => return None,
    };

    match parsed {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(%channel, "Malformed channel message: {e}");
            None
        }
    }
}

/// Inserts `candle` keeping the buffer time-ascending and at most `cap` long.
///
/// A candle with an open time already present replaces it; Kraken resends
/// the in-progress candle on every trade.
fn upsert_candle(buffer: &mut Vec<Candle>, candle: Candle, cap: usize) {
    match buffer.last_mut() {
        Some(last) if last.open_time == candle.open_time => *last = candle,
        Some(last) if last.open_time > candle.open_time => {
            match buffer.binary_search_by_key(&candle.open_time, |c| c.open_time) {
                Ok(i) => buffer[i] = candle,
                Err(i) => buffer.insert(i, candle),
            }
        }
        _ => buffer.push(candle),
    }

    if buffer.len() > cap {
        let excess = buffer.len() - cap;
        buffer.drain(..excess);
    }
}
