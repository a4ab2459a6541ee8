//! Application configuration loaded from environment variables.
//!
//! Every variable is optional; empty values are treated as absent.
//!
//! - `KRAKEN_WEBSOCKET_URL` - market-data endpoint
//! - `SURGE_SYMBOLS` - comma-separated symbols to screen
//! - `SURGE_CANDLE_INTERVAL` - candle width in minutes
//! - `SURGE_CANDLE_HISTORY` - candles kept per symbol
//! - `SURGE_SETTINGS_PATH` - JSON file holding the screener settings
//! - `SURGE_SETTINGS_RELOAD_SECS` - how often that file is polled
//! - `SURGE_TICK_INTERVAL_MS` - pause between two screener ticks
//! - `SURGE_DISPATCH_TIMEOUT_SECS` - upper bound for one alert send
//! - `SURGE_EXCHANGE`, `SURGE_MARKET_TYPE` - used for instrument links
//! - `SURGE_LOCALE` - `en` or `ru` number rendering
//! - `TELEGRAM_API_URL` - Telegram Bot API base URL

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::market::{Exchange, MarketType};
use crate::notify::Locale;

/// Default public WebSocket endpoint.
const DEFAULT_WEBSOCKET_URL: &str = "wss://ws.kraken.com/v2";

const DEFAULT_SYMBOLS: &str = "BTC/USD,ETH/USD,SOL/USD";
const DEFAULT_CANDLE_INTERVAL: u32 = 1;
const DEFAULT_CANDLE_HISTORY: usize = 720;
const DEFAULT_SETTINGS_PATH: &str = "settings.json";
const DEFAULT_SETTINGS_RELOAD_SECS: u64 = 5;
const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub kraken: KrakenConfig,
    pub screener: ScreenerConfig,
    pub telegram: TelegramConfig,
}

/// Market-data feed configuration.
#[derive(Debug, Clone)]
pub struct KrakenConfig {
    pub websocket_url: String,
    pub symbols: Vec<String>,
    /// Candle width in minutes.
    pub candle_interval: u32,
    /// Maximum candles retained per symbol.
    pub candle_history: usize,
}

/// Consumer loop and alert rendering configuration.
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    pub settings_path: PathBuf,
    pub settings_reload: Duration,
    pub tick_interval: Duration,
    pub dispatch_timeout: Duration,
    pub exchange: Exchange,
    pub market_type: MarketType,
    pub locale: Locale,
}

/// Notification transport configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_url: String,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`SurgeError::Config`](crate::SurgeError::Config) if a variable
/// is set but cannot be parsed, or if the symbol list ends up empty.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let websocket_url = non_empty_var("KRAKEN_WEBSOCKET_URL")
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let symbols: Vec<String> = non_empty_var("SURGE_SYMBOLS")
        .unwrap_or_else(|| DEFAULT_SYMBOLS.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if symbols.is_empty() {
        return Err(crate::SurgeError::Config(
            "SURGE_SYMBOLS does not name any symbol".to_string(),
        ));
    }

    let kraken = KrakenConfig {
        websocket_url,
        symbols,
        candle_interval: parse_var("SURGE_CANDLE_INTERVAL", DEFAULT_CANDLE_INTERVAL)?,
        candle_history: parse_var("SURGE_CANDLE_HISTORY", DEFAULT_CANDLE_HISTORY)?,
    };

    let screener = ScreenerConfig {
        settings_path: non_empty_var("SURGE_SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH)),
        settings_reload: Duration::from_secs(positive_var(
            "SURGE_SETTINGS_RELOAD_SECS",
            DEFAULT_SETTINGS_RELOAD_SECS,
        )?),
        tick_interval: Duration::from_millis(parse_var(
            "SURGE_TICK_INTERVAL_MS",
            DEFAULT_TICK_INTERVAL_MS,
        )?),
        dispatch_timeout: Duration::from_secs(parse_var(
            "SURGE_DISPATCH_TIMEOUT_SECS",
            DEFAULT_DISPATCH_TIMEOUT_SECS,
        )?),
        exchange: parse_var("SURGE_EXCHANGE", Exchange::Kraken)?,
        market_type: parse_var("SURGE_MARKET_TYPE", MarketType::Spot)?,
        locale: parse_var("SURGE_LOCALE", Locale::En)?,
    };

    let telegram = TelegramConfig {
        api_url: non_empty_var("TELEGRAM_API_URL")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
    };

    Ok(AppConfig {
        kraken,
        screener,
        telegram,
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

/// Parses an environment variable, falling back to `default` when absent.
fn parse_var<T>(name: &str, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| crate::SurgeError::Config(format!("invalid {name}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

/// Like [`parse_var`], but rejects zero.
fn positive_var(name: &str, default: u64) -> crate::Result<u64> {
    match parse_var(name, default)? {
        0 => Err(crate::SurgeError::Config(format!(
            "{name} must be greater than zero"
        ))),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ALL_VARS: [&str; 12] = [
        "KRAKEN_WEBSOCKET_URL",
        "SURGE_SYMBOLS",
        "SURGE_CANDLE_INTERVAL",
        "SURGE_CANDLE_HISTORY",
        "SURGE_SETTINGS_PATH",
        "SURGE_SETTINGS_RELOAD_SECS",
        "SURGE_TICK_INTERVAL_MS",
        "SURGE_DISPATCH_TIMEOUT_SECS",
        "SURGE_EXCHANGE",
        "SURGE_MARKET_TYPE",
        "SURGE_LOCALE",
        "TELEGRAM_API_URL",
    ];

    /// Helper that clears every config var, applies `vars`, runs `f`, then
    /// restores the originals.
    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        let originals: Vec<(&str, Option<String>)> = ALL_VARS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: ENV_LOCK keeps other config tests from touching the environment.
        unsafe {
            for k in ALL_VARS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        for (k, original) in originals {
            // SAFETY: restoring original values under the same lock.
            unsafe {
                match original {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn defaults_without_env_vars() {
        with_env(&[], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.kraken.websocket_url, DEFAULT_WEBSOCKET_URL);
            assert_eq!(config.kraken.symbols, vec!["BTC/USD", "ETH/USD", "SOL/USD"]);
            assert_eq!(config.kraken.candle_interval, 1);
            assert_eq!(config.screener.tick_interval, Duration::from_secs(1));
            assert_eq!(config.screener.dispatch_timeout, Duration::from_secs(10));
            assert_eq!(config.screener.exchange, Exchange::Kraken);
            assert_eq!(config.screener.market_type, MarketType::Spot);
            assert_eq!(config.screener.locale, Locale::En);
            assert_eq!(config.telegram.api_url, DEFAULT_TELEGRAM_API_URL);
        });
    }

    #[test]
    fn symbols_are_trimmed_and_filtered() {
        with_env(&[("SURGE_SYMBOLS", " XBT/EUR , ,DOGE/USD,")], || {
            let config = fetch_config().unwrap();
            assert_eq!(config.kraken.symbols, vec!["XBT/EUR", "DOGE/USD"]);
        });
    }

    #[test]
    fn rejects_symbol_list_without_symbols() {
        with_env(&[("SURGE_SYMBOLS", " , ")], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("SURGE_SYMBOLS"));
        });
    }

    #[test]
    fn parses_overrides() {
        with_env(
            &[
                ("SURGE_TICK_INTERVAL_MS", "250"),
                ("SURGE_EXCHANGE", "bybit"),
                ("SURGE_MARKET_TYPE", "futures"),
                ("SURGE_LOCALE", "ru"),
                ("SURGE_SETTINGS_PATH", "/etc/surge/settings.json"),
            ],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.screener.tick_interval, Duration::from_millis(250));
                assert_eq!(config.screener.exchange, Exchange::Bybit);
                assert_eq!(config.screener.market_type, MarketType::Futures);
                assert_eq!(config.screener.locale, Locale::Ru);
                assert_eq!(
                    config.screener.settings_path,
                    PathBuf::from("/etc/surge/settings.json")
                );
            },
        );
    }

    #[test]
    fn rejects_unparseable_number() {
        with_env(&[("SURGE_DISPATCH_TIMEOUT_SECS", "soon")], || {
            let err = fetch_config().unwrap_err();
            assert!(err.to_string().contains("SURGE_DISPATCH_TIMEOUT_SECS"));
        });
    }

    #[test]
    fn rejects_zero_reload_period() {
        with_env(&[("SURGE_SETTINGS_RELOAD_SECS", "0")], || {
            let err = fetch_config().unwrap_err();
            assert!(matches!(err, crate::SurgeError::Config(_)));
            assert!(err.to_string().contains("SURGE_SETTINGS_RELOAD_SECS"));
        });
    }

    #[test]
    fn empty_values_treated_as_absent() {
        with_env(
            &[("KRAKEN_WEBSOCKET_URL", ""), ("SURGE_CANDLE_HISTORY", "")],
            || {
                let config = fetch_config().unwrap();
                assert_eq!(config.kraken.websocket_url, DEFAULT_WEBSOCKET_URL);
                assert_eq!(config.kraken.candle_history, DEFAULT_CANDLE_HISTORY);
            },
        );
    }
}
