//! Screening filters over collected records.

use crate::domain::record::StockRecord;

const BILLION: f64 = 1_000_000_000.0;

/// Minimum thresholds a record must meet to pass the screen.
#[derive(Debug, Clone, Copy)]
pub struct ScreenCriteria {
    pub min_age_years: f64,
    /// Percent.
    pub min_dividend_yield: f64,
    /// Billions of currency units.
    pub min_market_cap_billions: f64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            min_age_years: 25.0,
            min_dividend_yield: 5.0,
            min_market_cap_billions: 1.0,
        }
    }
}

impl ScreenCriteria {
    pub fn matches(&self, record: &StockRecord) -> bool {
        record.age_years >= self.min_age_years
            && record.dividend_yield >= self.min_dividend_yield
            && record.market_cap >= self.min_market_cap_billions * BILLION
    }
}

/// Filter records, keeping input order.
pub fn apply(records: &[StockRecord], criteria: &ScreenCriteria) -> Vec<StockRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}
