//! Listing-service HTTP adapter for the symbol universe.

use crate::domain::symbol::{dedup_symbols, Symbol};
use crate::ports::symbol_source::SymbolSource;
use log::warn;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use std::time::Duration;

/// Screener-download endpoint client. The service rejects requests without a
/// browser-like User-Agent, so one is always sent.
pub struct NasdaqListingAdapter {
    client: Client,
    url: String,
    user_agent: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ListingResponse {
    data: Option<ListingData>,
}

#[derive(Deserialize)]
struct ListingData {
    rows: Option<Vec<ListingRow>>,
}

#[derive(Deserialize)]
struct ListingRow {
    symbol: Option<String>,
    exchange: Option<String>,
}

impl NasdaqListingAdapter {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    fn request(&self) -> Result<Vec<Symbol>, reqwest::Error> {
        let response: ListingResponse = self
            .client
            .get(&self.url)
            .query(&[("download", "true")])
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()?
            .error_for_status()?
            .json()?;

        let rows = response.data.and_then(|d| d.rows).unwrap_or_default();
        let symbols = rows
            .into_iter()
            .filter_map(|row| {
                let ticker = row.symbol.filter(|s| !s.is_empty())?;
                Some(Symbol {
                    ticker,
                    exchange: row.exchange.filter(|e| !e.is_empty()),
                })
            })
            .collect();
        Ok(dedup_symbols(symbols))
    }
}

impl SymbolSource for NasdaqListingAdapter {
    /// Single attempt; any network, status, or parse error yields an empty
    /// universe so the caller ends the run cleanly.
    fn fetch_symbols(&self) -> Vec<Symbol> {
        match self.request() {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!("symbol fetch failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(url: String) -> NasdaqListingAdapter {
        NasdaqListingAdapter::new(url, "Mozilla/5.0", Duration::from_secs(5))
    }

    #[test]
    fn parses_rows_into_symbols() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/screener/stocks")
            .match_query(mockito::Matcher::UrlEncoded("download".into(), "true".into()))
            .match_header("user-agent", "Mozilla/5.0")
            .with_body(
                r#"{"data":{"rows":[
                    {"symbol":"AAPL","exchange":"NASDAQ"},
                    {"symbol":"HTGC","exchange":"NYSE"},
                    {"symbol":"AAPL","exchange":"NYSE"}
                ]}}"#,
            )
            .create();

        let symbols = adapter(format!("{}/api/screener/stocks", server.url())).fetch_symbols();
        mock.assert();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].ticker, "AAPL");
        assert_eq!(symbols[0].exchange.as_deref(), Some("NASDAQ"));
        assert_eq!(symbols[1].ticker, "HTGC");
    }

    #[test]
    fn rows_without_symbol_are_dropped() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/stocks")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"data":{"rows":[{"exchange":"NYSE"},{"symbol":"","exchange":"NYSE"},{"symbol":"MSFT"}]}}"#)
            .create();

        let symbols = adapter(format!("{}/stocks", server.url())).fetch_symbols();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].ticker, "MSFT");
        assert_eq!(symbols[0].exchange, None);
    }

    #[test]
    fn server_error_yields_empty_universe() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/stocks")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create();

        assert!(adapter(format!("{}/stocks", server.url())).fetch_symbols().is_empty());
    }

    #[test]
    fn malformed_body_yields_empty_universe() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/stocks")
            .match_query(mockito::Matcher::Any)
            .with_body("<html>rate limited</html>")
            .create();

        assert!(adapter(format!("{}/stocks", server.url())).fetch_symbols().is_empty());
    }

    #[test]
    fn unreachable_host_yields_empty_universe() {
        let adapter = adapter("http://127.0.0.1:1/stocks".to_string());
        assert!(adapter.fetch_symbols().is_empty());
    }

    #[test]
    fn missing_data_key_yields_empty_universe() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/stocks")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"status":"ok"}"#)
            .create();

        assert!(adapter(format!("{}/stocks", server.url())).fetch_symbols().is_empty());
    }
}
