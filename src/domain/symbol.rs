//! Ticker symbol representation.

/// A tradable ticker, optionally tagged with the exchange it was listed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub ticker: String,
    pub exchange: Option<String>,
}

impl Symbol {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: None,
        }
    }

    pub fn with_exchange(ticker: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: Some(exchange.into()),
        }
    }
}

/// Deduplicate a fetched universe by ticker, keeping the first occurrence
/// (listing services repeat symbols across exchange segments).
pub fn dedup_symbols(symbols: Vec<Symbol>) -> Vec<Symbol> {
    let mut seen = std::collections::HashSet::new();
    symbols
        .into_iter()
        .filter(|s| seen.insert(s.ticker.clone()))
        .collect()
}
