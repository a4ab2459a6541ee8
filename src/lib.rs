//! Market-price surge screener.
//!
//! Collects recent candles from Kraken over WebSocket, measures each
//! symbol's growth over a configurable window, and sends Telegram alerts
//! for symbols that moved more than the configured threshold. Each alerted
//! symbol is held back for a cooldown before it can alert again.

pub mod config;
pub mod error;
pub mod logging;
pub mod market;
pub mod models;
pub mod notify;
pub mod screener;
pub mod settings;
pub mod time;
pub mod websocket;

pub use error::{Result, SurgeError};
