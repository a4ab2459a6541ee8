//! Deep links to an instrument's trading page.

use crate::error::SurgeError;
use crate::market::{Exchange, MarketType};

/// Quote currencies recognised at the end of a concatenated symbol.
/// Longer codes come first so `USDT` wins over `USD`.
const QUOTE_SUFFIXES: [&str; 6] = ["USDT", "USDC", "USD", "EUR", "BTC", "ETH"];

/// Builds the trading-page URL for `symbol` on `exchange`/`market_type`.
///
/// # Errors
///
/// Returns [`SurgeError::UnsupportedMarket`] if the exchange has no such
/// market or the symbol cannot be split into base and quote.
pub fn exchange_link(
    exchange: Exchange,
    market_type: MarketType,
    symbol: &str,
) -> crate::Result<String> {
    let (base, quote) = split_symbol(symbol)?;

    let link = match (exchange, market_type) {
        (Exchange::Binance, MarketType::Spot) => {
            format!("https://www.binance.com/en/trade/{base}_{quote}?type=spot")
        }
        (Exchange::Binance, MarketType::Futures) => {
            format!("https://www.binance.com/en/futures/{base}{quote}")
        }
        (Exchange::Bybit, MarketType::Spot) => {
            format!("https://www.bybit.com/en/trade/spot/{base}/{quote}")
        }
        (Exchange::Bybit, MarketType::Futures) => {
            format!("https://www.bybit.com/trade/usdt/{base}{quote}")
        }
        (Exchange::Okx, MarketType::Spot) => format!(
            "https://www.okx.com/trade-spot/{}-{}",
            base.to_lowercase(),
            quote.to_lowercase()
        ),
        (Exchange::Okx, MarketType::Futures) => format!(
            "https://www.okx.com/trade-swap/{}-{}-swap",
            base.to_lowercase(),
            quote.to_lowercase()
        ),
        (Exchange::Kraken, MarketType::Spot) => format!(
            "https://pro.kraken.com/app/trade/{}-{}",
            base.to_lowercase(),
            quote.to_lowercase()
        ),
        (Exchange::Kraken, MarketType::Futures) => {
            return Err(SurgeError::UnsupportedMarket(format!(
                "{exchange} {market_type} links are not supported"
            )));
        }
    };

    Ok(link)
}

/// Splits `BTC/USD`, `BTC-USD`, `BTC_USD` or `BTCUSDT` into upper-case parts.
fn split_symbol(symbol: &str) -> crate::Result<(String, String)> {
    let upper = symbol.trim().to_ascii_uppercase();

    if let Some((base, quote)) = upper.split_once(['/', '-', '_']) {
        if !base.is_empty() && !quote.is_empty() {
            return Ok((base.to_string(), quote.to_string()));
        }
    } else if let Some((base, quote)) = QUOTE_SUFFIXES
        .iter()
        .find_map(|q| upper.strip_suffix(q).map(|base| (base, *q)))
        && !base.is_empty()
    {
        return Ok((base.to_string(), quote.to_string()));
    }

    Err(SurgeError::UnsupportedMarket(format!(
        "cannot split symbol {symbol:?} into base and quote"
    )))
}
