//! Data models: Kraken WebSocket V2 wire messages and the screener's
//! own candle and daily-statistics records.
//!
//! Contains channel definitions, the subscribe and ping requests, and
//! the status broadcast.

pub mod candle;
pub mod ticker;

use serde::{Deserialize, Serialize};

pub use candle::Candle;
pub use ticker::DailyStats;

/// Kraken WebSocket V2 channels the screener consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ticker,
    /// OHLC candlestick data (wire name: `"ohlc"`).
    Candles,
}

impl Channel {
    /// Returns the wire-format channel name expected by the Kraken API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Ticker => "ticker",
            Channel::Candles => "ohlc",
        }
    }
}

/// A `subscribe` request sent to the Kraken WebSocket API.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub method: String,
    pub params: Params,
}

impl SubscribeRequest {
    /// Builds a subscription for `channel` over `symbols`.
    ///
    /// `interval` is the candle width in minutes and only applies to the
    /// `ohlc` channel.
    pub fn new(channel: &Channel, symbols: &[String], interval: Option<u32>) -> Self {
        Self {
            method: "subscribe".to_string(),
            params: Params::new(channel, symbols, interval),
        }
    }
}

/// Channel and symbol parameters of a subscribe request.
#[derive(Debug, Serialize)]
pub struct Params {
    pub channel: String,
    pub symbol: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl Params {
    fn new(channel: &Channel, symbols: &[String], interval: Option<u32>) -> Self {
        Self {
            channel: channel.as_str().to_string(),
            symbol: symbols.to_vec(),
            interval,
        }
    }
}

/// A `ping` request used to test connection liveness.
#[derive(Debug, Serialize)]
pub struct PingRequest {
    pub method: String,
}

impl PingRequest {
    pub fn new() -> Self {
        Self {
            method: "ping".to_string(),
        }
    }
}

impl Default for PingRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// System status update broadcast on the `status` channel.
#[derive(Debug, Deserialize)]
pub struct StatusUpdateResponse {
    pub channel: String,
    #[serde(rename = "type")]
    pub tpe: String,
    pub data: Vec<StatusData>,
}

/// Detailed system status information.
#[derive(Debug, Deserialize)]
pub struct StatusData {
    pub api_version: String,
    pub connection_id: u64,
    pub system: String,
    pub version: String,
}
