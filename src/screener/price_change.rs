//! Windowed price-change calculation.
//!
//! The change is measured from the lowest low inside the window to the
//! high of the most recent candle.

use crate::models::Candle;

/// Result of measuring one symbol over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    /// Signed change in percent, relative to `start_price`.
    pub percent: f64,
    /// Lowest low inside the window.
    pub start_price: f64,
    /// High of the last candle inside the window.
    pub last_price: f64,
}

impl PriceChange {
    /// No usable data: empty or entirely stale candle list.
    pub const NONE: PriceChange = PriceChange {
        percent: 0.0,
        start_price: 0.0,
        last_price: 0.0,
    };
}

/// Measures the price change over the `interval_secs` preceding `now_ms`.
///
/// Only candles opened strictly after `now_ms - interval_secs * 1000` are
/// considered. Candles are taken in the order given; the last kept one
/// supplies the latest price even if an earlier one has the same or a
/// later open time.
pub fn calculate(candles: &[Candle], interval_secs: u64, now_ms: i64) -> PriceChange {
    let window_ms = i64::try_from(interval_secs.saturating_mul(1_000)).unwrap_or(i64::MAX);
    let threshold = now_ms.saturating_sub(window_ms);

    let mut kept = candles.iter().filter(|c| c.open_time > threshold);

    let Some(first) = kept.next() else {
        return PriceChange::NONE;
    };

    let (start_price, last) = kept.fold((first.low, first), |(low, _), c| (low.min(c.low), c));
    let last_price = last.high;

    PriceChange {
        percent: percent_greater(start_price, last_price),
        start_price,
        last_price,
    }
}

/// Percent by which `higher` exceeds `lower`; zero when `lower` is zero.
pub fn percent_greater(lower: f64, higher: f64) -> f64 {
    if lower == 0.0 {
        return 0.0;
    }
    (higher - lower) / lower * 100.0
}
