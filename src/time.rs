//! Wall-clock helpers.

/// Current Unix time in milliseconds, the unit candle open times use.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
