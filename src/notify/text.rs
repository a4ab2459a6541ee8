//! Alert message formatting.

use std::fmt::Write;

use tracing::debug;

use super::humanize::{Locale, human_readable};
use super::link::exchange_link;
use crate::market::{Exchange, MarketType};
use crate::models::DailyStats;
use crate::screener::PriceChange;

/// A detection worth telling the user about.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub symbol: String,
    pub change: PriceChange,
    pub daily: DailyStats,
}

/// Where the screened symbols trade and how numbers are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertFormat {
    pub exchange: Exchange,
    pub market_type: MarketType,
    pub locale: Locale,
}

impl Default for AlertFormat {
    fn default() -> Self {
        Self {
            exchange: Exchange::Kraken,
            market_type: MarketType::Spot,
            locale: Locale::En,
        }
    }
}

impl AlertFormat {
    pub fn render(&self, alert: &Alert) -> String {
        create_text(alert, self.exchange, self.market_type, self.locale)
    }
}

/// Builds the text sent for a price surge.
///
/// The instrument link is left out when none can be built for the
/// exchange and market; formatting itself never fails.
pub fn create_text(
    alert: &Alert,
    exchange: Exchange,
    market_type: MarketType,
    locale: Locale,
) -> String {
    let change = &alert.change;
    let (direction, sign) = if change.percent >= 0.0 {
        ("🚀", "+")
    } else {
        ("🔻", "")
    };

    let mut text = format!("{direction} Sharp price change: {}\n\n", alert.symbol);

    let _ = writeln!(text, "Change: {sign}{:.2}%", change.percent);
    let _ = writeln!(text, "Start price: {} $", change.start_price);
    let _ = writeln!(text, "Current price: {} $", change.last_price);
    let _ = writeln!(text, "Daily change: {} %", alert.daily.change_pct);
    let _ = write!(
        text,
        "Daily volume: {} $.",
        human_readable(alert.daily.volume, locale)
    );

    match exchange_link(exchange, market_type, &alert.symbol) {
        Ok(link) => {
            let _ = write!(text, "\n\n{link}");
        }
        Err(e) => debug!(symbol = %alert.symbol, "Alert sent without link: {e}"),
    }

    text
}
