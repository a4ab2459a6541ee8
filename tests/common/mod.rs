//! Shared test utilities and constants.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use surge::models::{Candle, DailyStats};
use surge::notify::Notifier;
use surge::screener::{Producer, Snapshot};
use surge::settings::Settings;
use surge::{Result, SurgeError};

/// Kraken WebSocket V2 public endpoint URL.
pub const KRAKEN_WS_URL: &str = "wss://ws.kraken.com/v2";

/// Candles that rise from a low of 99 to a high of 130 within the last five seconds.
pub fn surging_candles() -> Vec<Candle> {
    let now = surge::time::now_ms();
    vec![
        Candle::new(now - 5_000, 101.0, 100.0),
        Candle::new(now - 1_000, 130.0, 99.0),
    ]
}

/// Candles that barely move.
pub fn flat_candles() -> Vec<Candle> {
    let now = surge::time::now_ms();
    vec![
        Candle::new(now - 5_000, 100.1, 100.0),
        Candle::new(now - 1_000, 100.2, 100.0),
    ]
}

/// Settings with a chat and token, a ten second window, and a one minute cooldown.
pub fn ready_settings(min_growth: f64) -> Settings {
    Settings {
        interval: 10,
        min_growth,
        timeout: 60,
        chat_id: Some(1001),
        bot_token: Some("123:test".to_string()),
    }
}

/// Producer serving freshly timestamped candles per symbol.
pub struct MockProducer {
    series: HashMap<String, fn() -> Vec<Candle>>,
    pub fetches: AtomicUsize,
}

impl MockProducer {
    pub fn new(series: &[(&str, fn() -> Vec<Candle>)]) -> Self {
        Self {
            series: series
                .iter()
                .map(|(symbol, candles)| (symbol.to_string(), *candles))
                .collect(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Producer for MockProducer {
    async fn fetch_collected_data(&self) -> Result<Snapshot> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .series
            .iter()
            .map(|(symbol, candles)| (symbol.clone(), candles()))
            .collect())
    }

    async fn daily_stats(&self, _symbol: &str) -> Option<DailyStats> {
        Some(DailyStats {
            change_pct: 4.2,
            volume: 15_300_000.0,
        })
    }
}

/// Notifier that records messages and can fail for texts naming one symbol.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<(String, i64, String)>>,
    pub fail_for: Option<&'static str>,
    pub closed: AtomicUsize,
}

impl MockNotifier {
    pub fn failing_for(symbol: &'static str) -> Self {
        Self {
            fail_for: Some(symbol),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(String, i64, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_message(&self, bot_token: &str, chat_id: i64, text: &str) -> Result<()> {
        if let Some(symbol) = self.fail_for
            && text.contains(symbol)
        {
            return Err(SurgeError::Telegram("Forbidden: bot was blocked".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((bot_token.to_string(), chat_id, text.to_string()));
        Ok(())
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}
