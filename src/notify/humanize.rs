//! Locale-aware rendering of large figures such as traded volume.

use std::fmt;
use std::str::FromStr;

use crate::error::SurgeError;

/// Language used for magnitude suffixes and the decimal separator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    /// Suffixes for thousand, million, billion, trillion.
    fn suffixes(self) -> [&'static str; 4] {
        match self {
            Locale::En => ["K", "M", "B", "T"],
            Locale::Ru => [" тыс.", " млн", " млрд", " трлн"],
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Locale::En => '.',
            Locale::Ru => ',',
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::En => f.write_str("en"),
            Locale::Ru => f.write_str("ru"),
        }
    }
}

impl FromStr for Locale {
    type Err = SurgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "ru" => Ok(Locale::Ru),
            other => Err(SurgeError::Config(format!("unsupported locale: {other}"))),
        }
    }
}

/// Renders `value` with two decimals and a magnitude suffix, e.g. `1.23M`.
///
/// Values below one thousand get no suffix. Non-finite input is printed as is.
pub fn human_readable(value: f64, locale: Locale) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let magnitude = value.abs();
    let scales = [1e3, 1e6, 1e9, 1e12];

    let (scaled, suffix) = match scales.iter().rposition(|scale| magnitude >= *scale) {
        Some(i) => (value / scales[i], locale.suffixes()[i]),
        None => (value, ""),
    };

    let number = format!("{scaled:.2}");
    let number = match locale.decimal_separator() {
        '.' => number,
        sep => number.replace('.', &sep.to_string()),
    };

    format!("{number}{suffix}")
}
