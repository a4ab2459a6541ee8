//! Exchange and market identifiers used to build instrument deep links.

use std::fmt;
use std::str::FromStr;

use crate::error::SurgeError;

/// Exchange the screened symbols trade on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    Binance,
    Bybit,
    Okx,
    Kraken,
}

impl Exchange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Bybit => "bybit",
            Exchange::Okx => "okx",
            Exchange::Kraken => "kraken",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = SurgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binance" => Ok(Exchange::Binance),
            "bybit" => Ok(Exchange::Bybit),
            "okx" => Ok(Exchange::Okx),
            "kraken" => Ok(Exchange::Kraken),
            other => Err(SurgeError::Config(format!("unknown exchange: {other}"))),
        }
    }
}

/// Spot or perpetual futures market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketType {
    Spot,
    Futures,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = SurgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spot" => Ok(MarketType::Spot),
            "futures" | "perp" | "swap" => Ok(MarketType::Futures),
            other => Err(SurgeError::Config(format!("unknown market type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Kraken".parse::<Exchange>().unwrap(), Exchange::Kraken);
        assert_eq!(" BYBIT ".parse::<Exchange>().unwrap(), Exchange::Bybit);
        assert_eq!("perp".parse::<MarketType>().unwrap(), MarketType::Futures);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("mtgox".parse::<Exchange>().is_err());
        assert!("options".parse::<MarketType>().is_err());
    }

    #[test]
    fn display_round_trips_wire_name() {
        assert_eq!(Exchange::Okx.to_string(), "okx");
        assert_eq!(MarketType::Spot.to_string(), "spot");
    }
}
