//! Output record shaping.

use crate::domain::quote::QuoteInfo;
use chrono::{DateTime, SecondsFormat, Utc};

pub const DAYS_PER_YEAR: f64 = 365.25;

/// One row of the output store: a symbol's fundamentals at collection time.
#[derive(Debug, Clone, PartialEq)]
pub struct StockRecord {
    pub symbol: String,
    pub name: String,
    pub market_cap: f64,
    /// Percent, not fraction (8.0 = 8%).
    pub dividend_yield: f64,
    pub age_years: f64,
    pub exchange: String,
    /// RFC 3339 UTC collection timestamp.
    pub timestamp: String,
}

impl StockRecord {
    /// Shape a quote-service info bag into a record.
    ///
    /// Defaults per field when the service omitted it: empty string for text,
    /// 0.0 for numbers. The reported dividend yield is a fraction and is
    /// converted to percent here. Age is derived from the first-trade epoch;
    /// a missing epoch yields age 0.0, and a first-trade date in the future
    /// (clock skew, bad data) is clamped to 0.0.
    pub fn from_quote(symbol: &str, info: &QuoteInfo, now: DateTime<Utc>) -> Self {
        let age_years = info
            .first_trade_epoch
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|first_trade| {
                let days = (now - first_trade).num_days() as f64;
                (days / DAYS_PER_YEAR).max(0.0)
            })
            .unwrap_or(0.0);

        Self {
            symbol: symbol.to_string(),
            name: info.long_name.clone().unwrap_or_default(),
            market_cap: info.market_cap.unwrap_or(0.0),
            dividend_yield: info.dividend_yield.map(|y| y * 100.0).unwrap_or(0.0),
            age_years,
            exchange: info.exchange.clone().unwrap_or_default(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
