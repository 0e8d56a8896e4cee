//! Per-symbol quote lookup port trait.

use crate::domain::quote::{FetchError, QuoteInfo};

pub trait QuoteSource {
    /// Fetch the fundamentals info bag for one symbol. A single attempt, no
    /// retry; failures are returned as values for the caller to inspect.
    fn fetch_quote(&self, symbol: &str) -> Result<QuoteInfo, FetchError>;
}
