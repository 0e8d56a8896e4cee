//! Output store port trait.

use crate::domain::error::CollectorError;
use crate::domain::record::StockRecord;
use std::collections::HashSet;

/// Append-only record store.
///
/// The store is never rewritten or compacted. Uniqueness of symbols is
/// advisory: the collector's processed-set check is the only dedup, so a
/// crash between append and mark-processed can leave a harmless duplicate row.
pub trait RecordStore {
    /// Scan the store and return the set of symbols already present.
    /// Malformed rows are skipped, not fatal.
    fn load_processed(&self) -> Result<HashSet<String>, CollectorError>;

    /// Append one record durably: the write is flushed and synced to disk
    /// before this returns.
    fn append(&mut self, record: &StockRecord) -> Result<(), CollectorError>;
}
