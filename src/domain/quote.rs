//! Quote-service response model.

use serde::Deserialize;

/// The info bag a quote lookup returns. Every field is optional; the quote
/// service omits keys it has no data for, and [`StockRecord::from_quote`]
/// supplies the defaults.
///
/// [`StockRecord::from_quote`]: crate::domain::record::StockRecord::from_quote
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuoteInfo {
    #[serde(rename = "longName")]
    pub long_name: Option<String>,
    #[serde(rename = "marketCap")]
    pub market_cap: Option<f64>,
    /// Yield as a fraction (0.08 = 8%), the way the service reports it.
    #[serde(rename = "dividendYield")]
    pub dividend_yield: Option<f64>,
    /// First trade date as Unix seconds.
    #[serde(rename = "firstTradeDateEpochUtc")]
    pub first_trade_epoch: Option<i64>,
    pub exchange: Option<String>,
}

/// Why a per-symbol quote lookup produced no record. These are handled inside
/// the collection loop (log, skip, leave the symbol eligible for the next run)
/// and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("quote service returned status {0}")]
    Status(u16),

    #[error("malformed quote body: {0}")]
    Malformed(String),
}
