//! OHLC candlestick channel models and the screener's candle record.

use chrono::DateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;

use crate::error::SurgeError;

/// A snapshot or update message from the `ohlc` (candles) channel.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleUpdateResponse {
    pub channel: String,
    #[serde(rename = "type")]
    pub tpe: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub data: Vec<CandleData>,
}

/// A single OHLC candlestick bar as sent by Kraken.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleData {
    pub symbol: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// Volume-weighted average price for this candle.
    pub vwap: Decimal,
    pub trades: u64,
    pub volume: Decimal,
    /// Start timestamp of this candle's time window.
    pub interval_begin: String,
    /// Candle duration in minutes.
    pub interval: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One price sample for a symbol, reduced to the fields the screener reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    /// Open time in Unix milliseconds.
    pub open_time: i64,
    pub high: f64,
    pub low: f64,
}

impl Candle {
    pub fn new(open_time: i64, high: f64, low: f64) -> Self {
        Self {
            open_time,
            high,
            low,
        }
    }
}

impl TryFrom<&CandleData> for Candle {
    type Error = SurgeError;

    fn try_from(data: &CandleData) -> Result<Self, Self::Error> {
        let open_time = DateTime::parse_from_rfc3339(&data.interval_begin)
            .map_err(|e| {
                SurgeError::MalformedMessage(format!(
                    "bad interval_begin {:?} for {}: {e}",
                    data.interval_begin, data.symbol
                ))
            })?
            .timestamp_millis();

        let high = data.high.to_f64().ok_or_else(|| {
            SurgeError::MalformedMessage(format!("high out of range for {}", data.symbol))
        })?;
        let low = data.low.to_f64().ok_or_else(|| {
            SurgeError::MalformedMessage(format!("low out of range for {}", data.symbol))
        })?;

        Ok(Candle::new(open_time, high, low))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(interval_begin: &str) -> CandleData {
        CandleData {
            symbol: "BTC/USD".to_string(),
            open: dec!(42000.0),
            high: dec!(42500.5),
            low: dec!(41900.25),
            close: dec!(42300.0),
            vwap: dec!(42210.0),
            trades: 120,
            volume: dec!(3.5),
            interval_begin: interval_begin.to_string(),
            interval: 1,
            timestamp: None,
        }
    }

    #[test]
    fn converts_wire_candle() {
        let candle = Candle::try_from(&sample("2024-01-15T10:30:00.000000000Z")).unwrap();
        assert_eq!(candle.open_time, 1_705_314_600_000);
        assert_eq!(candle.high, 42500.5);
        assert_eq!(candle.low, 41900.25);
    }

    #[test]
    fn rejects_unparseable_open_time() {
        let err = Candle::try_from(&sample("yesterday")).unwrap_err();
        assert!(matches!(err, SurgeError::MalformedMessage(_)));
        assert!(err.to_string().contains("BTC/USD"));
    }
}
