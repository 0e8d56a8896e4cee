//! Quote-service HTTP adapter for per-symbol fundamentals.

use crate::domain::quote::{FetchError, QuoteInfo};
use crate::ports::quote_source::QuoteSource;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::time::Duration;

/// Fetches the per-symbol info bag from `{base_url}/{symbol}`.
pub struct HttpQuoteAdapter {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl HttpQuoteAdapter {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout,
        }
    }
}

impl QuoteSource for HttpQuoteAdapter {
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteInfo, FetchError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<QuoteInfo>()
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
