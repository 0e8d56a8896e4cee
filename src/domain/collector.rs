//! Incremental collection loop.
//!
//! The collector owns the processed-set and the write cursor on the record
//! store for the duration of a run. Lifecycle: construction rebuilds the
//! processed-set from the store, [`Collector::run`] drains the work list one
//! symbol at a time, and the returned [`RunSummary`] is terminal for that run.
//!
//! Resumability rests on one ordering rule: a record is durably appended
//! before its symbol is marked processed. A crash between the two leaves at
//! worst a duplicate row on the next run, never a lost symbol.

use crate::domain::error::CollectorError;
use crate::domain::record::StockRecord;
use crate::domain::symbol::Symbol;
use crate::ports::quote_source::QuoteSource;
use crate::ports::record_store::RecordStore;
use crate::ports::symbol_source::SymbolSource;
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Cooperative cancellation flag, set by the host's signal handler and
/// checked between symbol iterations. A fetch already in flight completes
/// (or fails) before the stop takes effect.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The symbol source returned nothing.
    NothingToDo,
    /// The work list was drained.
    Completed,
    /// Cancellation was requested mid-run; committed progress is kept.
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub appended: usize,
    pub skipped: usize,
}

pub struct Collector<S: RecordStore> {
    store: S,
    processed: HashSet<String>,
    delay: Duration,
    limit: Option<usize>,
}

impl<S: RecordStore> Collector<S> {
    /// Build a collector over an opened store, rebuilding the processed-set
    /// by a full scan.
    pub fn new(store: S, delay: Duration, limit: Option<usize>) -> Result<Self, CollectorError> {
        let processed = store.load_processed()?;
        info!("loaded {} processed symbols", processed.len());
        Ok(Self {
            store,
            processed,
            delay,
            limit,
        })
    }

    /// Symbols recorded as processed, either loaded at startup or appended
    /// during this run. Grows monotonically.
    pub fn processed(&self) -> &HashSet<String> {
        &self.processed
    }

    /// One collection pass: fetch the universe, subtract the processed-set,
    /// then fetch/shape/append each remaining symbol with a courtesy delay
    /// between requests.
    ///
    /// Per-symbol fetch failures are logged and skipped; the symbol stays
    /// eligible for the next run. Storage failures abort the run.
    pub fn run(
        &mut self,
        symbols: &dyn SymbolSource,
        quotes: &dyn QuoteSource,
        cancel: &CancelToken,
    ) -> Result<RunSummary, CollectorError> {
        let universe = symbols.fetch_symbols();
        if universe.is_empty() {
            info!("symbol source returned nothing, ending run");
            return Ok(RunSummary {
                outcome: RunOutcome::NothingToDo,
                appended: 0,
                skipped: 0,
            });
        }

        let mut work: Vec<Symbol> = universe
            .into_iter()
            .filter(|s| !self.processed.contains(&s.ticker))
            .collect();
        if let Some(limit) = self.limit {
            work.truncate(limit);
        }
        info!("processing {} remaining symbols", work.len());

        let total = work.len();
        let mut appended = 0;
        let mut skipped = 0;
        let mut outcome = RunOutcome::Completed;

        for (i, symbol) in work.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("interrupted, progress saved");
                outcome = RunOutcome::Interrupted;
                break;
            }

            info!("processing {}/{}: {}", i + 1, total, symbol.ticker);
            match quotes.fetch_quote(&symbol.ticker) {
                Ok(info) => {
                    let mut record = StockRecord::from_quote(&symbol.ticker, &info, Utc::now());
                    if record.exchange.is_empty() {
                        if let Some(exchange) = &symbol.exchange {
                            record.exchange = exchange.clone();
                        }
                    }
                    // Durable before marked processed.
                    self.store.append(&record)?;
                    self.processed.insert(symbol.ticker.clone());
                    appended += 1;
                    info!("saved {}", symbol.ticker);
                }
                Err(e) => {
                    warn!("skipping {}: {}", symbol.ticker, e);
                    skipped += 1;
                }
            }

            if i + 1 < total && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }

        Ok(RunSummary {
            outcome,
            appended,
            skipped,
        })
    }
}
