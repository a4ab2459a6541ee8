//! Ticker channel models and the 24h statistics derived from them.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

/// A snapshot or update message from the `ticker` channel.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerUpdateResponse {
    pub channel: String,
    #[serde(rename = "type")]
    pub tpe: String,
    pub data: Vec<TickerData>,
}

/// Level-1 market data for one symbol. Volume and change cover the last 24h.
#[derive(Debug, Clone, Deserialize)]
pub struct TickerData {
    pub symbol: String,
    pub bid: Decimal,
    pub bid_qty: Decimal,
    pub ask: Decimal,
    pub ask_qty: Decimal,
    pub last: Decimal,
    /// 24h traded volume in the base currency.
    pub volume: Decimal,
    pub vwap: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub change: Decimal,
    pub change_pct: Decimal,
}

/// Daily figures shown alongside an alert.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyStats {
    /// Price change over the last 24h, in percent.
    pub change_pct: f64,
    /// Traded volume over the last 24h, in the quote currency.
    pub volume: f64,
}

impl From<&TickerData> for DailyStats {
    fn from(ticker: &TickerData) -> Self {
        Self {
            change_pct: ticker.change_pct.to_f64().unwrap_or_default(),
            volume: (ticker.volume * ticker.last).to_f64().unwrap_or_default(),
        }
    }
}
