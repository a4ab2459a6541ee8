//! The data source the consumer polls.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{Candle, DailyStats};

/// Buffered candles per symbol, time-ascending, as of one fetch.
pub type Snapshot = HashMap<String, Vec<Candle>>;

/// Continuously collects candles and hands out point-in-time snapshots.
#[async_trait]
pub trait Producer: Send + Sync {
    /// Returns the candles collected so far for every tracked symbol.
    ///
    /// # Errors
    ///
    /// Returns an error when no trustworthy snapshot can be produced,
    /// e.g. while the upstream feed is disconnected.
    async fn fetch_collected_data(&self) -> crate::Result<Snapshot>;

    /// Returns the 24h figures for `symbol`, if the producer tracks them.
    async fn daily_stats(&self, _symbol: &str) -> Option<DailyStats> {
        None
    }
}
