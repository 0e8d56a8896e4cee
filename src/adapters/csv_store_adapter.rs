//! Append-only CSV record store adapter.

use crate::domain::error::CollectorError;
use crate::domain::record::StockRecord;
use crate::ports::record_store::RecordStore;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

pub const HEADER: [&str; 7] = [
    "symbol",
    "name",
    "market_cap",
    "dividend_yield",
    "age_years",
    "exchange",
    "timestamp",
];

/// CSV-backed [`RecordStore`]. The file is created with a header row when
/// absent and only ever appended to afterwards. A corrupt trailing row from a
/// torn write is skipped by the scans here, never truncated or repaired; the
/// symbol it held simply gets re-fetched and re-appended on the next run.
pub struct CsvStoreAdapter {
    path: PathBuf,
    file: File,
}

impl CsvStoreAdapter {
    /// Open the store, creating it with a header row if it does not exist.
    pub fn open(path: PathBuf) -> Result<Self, CollectorError> {
        if !path.exists() {
            let mut file = File::create(&path).map_err(|e| CollectorError::Storage {
                reason: format!("failed to create {}: {}", path.display(), e),
            })?;
            let header = HEADER.join(",") + "\n";
            file.write_all(header.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| CollectorError::Storage {
                    reason: format!("failed to write header to {}: {}", path.display(), e),
                })?;
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| CollectorError::Storage {
                reason: format!("failed to open {} for append: {}", path.display(), e),
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn reader(&self) -> Result<csv::Reader<File>, CollectorError> {
        // flexible: short rows from torn writes surface as records, not errors
        ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| CollectorError::Storage {
                reason: format!("failed to read {}: {}", self.path.display(), e),
            })
    }

    fn parse_row(row: &StringRecord) -> Option<StockRecord> {
        if row.len() != HEADER.len() {
            return None;
        }
        Some(StockRecord {
            symbol: row.get(0)?.to_string(),
            name: row.get(1)?.to_string(),
            market_cap: row.get(2)?.parse().ok()?,
            dividend_yield: row.get(3)?.parse().ok()?,
            age_years: row.get(4)?.parse().ok()?,
            exchange: row.get(5)?.to_string(),
            timestamp: row.get(6)?.to_string(),
        })
    }

    /// Full parse of the store for screening. Rows that fail to parse are
    /// skipped, mirroring the processed-set scan.
    pub fn load_records(&self) -> Result<Vec<StockRecord>, CollectorError> {
        let mut rdr = self.reader()?;
        let mut records = Vec::new();
        for result in rdr.records() {
            let Ok(row) = result else { continue };
            if let Some(record) = Self::parse_row(&row) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

impl RecordStore for CsvStoreAdapter {
    fn load_processed(&self) -> Result<HashSet<String>, CollectorError> {
        let mut rdr = self.reader()?;
        let mut processed = HashSet::new();
        for result in rdr.records() {
            // Malformed rows (bad quoting, wrong field count) are not fatal
            // to the load; the scan skips them.
            let Ok(row) = result else { continue };
            if row.len() != HEADER.len() {
                continue;
            }
            match row.get(0) {
                Some(symbol) if !symbol.is_empty() => {
                    processed.insert(symbol.to_string());
                }
                _ => {}
            }
        }
        Ok(processed)
    }

    fn append(&mut self, record: &StockRecord) -> Result<(), CollectorError> {
        let mut buf = Vec::new();
        {
            let mut wtr = WriterBuilder::new().has_headers(false).from_writer(&mut buf);
            wtr.write_record([
                record.symbol.as_str(),
                record.name.as_str(),
                &record.market_cap.to_string(),
                &record.dividend_yield.to_string(),
                &record.age_years.to_string(),
                record.exchange.as_str(),
                record.timestamp.as_str(),
            ])
            .map_err(|e| CollectorError::Storage {
                reason: format!("CSV encode error: {}", e),
            })?;
            wtr.flush().map_err(|e| CollectorError::Storage {
                reason: format!("CSV encode error: {}", e),
            })?;
        }

        self.file
            .write_all(&buf)
            .and_then(|_| self.file.flush())
            .and_then(|_| self.file.sync_all())
            .map_err(|e| CollectorError::Storage {
                reason: format!("failed to append to {}: {}", self.path.display(), e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_record(symbol: &str) -> StockRecord {
        StockRecord {
            symbol: symbol.into(),
            name: format!("{symbol} Corp"),
            market_cap: 2_500_000_000.0,
            dividend_yield: 8.0,
            age_years: 30.5,
            exchange: "NASDAQ".into(),
            timestamp: "2025-06-15T12:00:00Z".into(),
        }
    }

    #[test]
    fn open_creates_file_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_stocks.csv");
        CsvStoreAdapter::open(path.clone()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "symbol,name,market_cap,dividend_yield,age_years,exchange,timestamp\n"
        );
    }

    #[test]
    fn open_leaves_existing_file_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("all_stocks.csv");
        let mut store = CsvStoreAdapter::open(path.clone()).unwrap();
        store.append(&sample_record("AAPL")).unwrap();
        drop(store);

        let store = CsvStoreAdapter::open(path).unwrap();
        assert_eq!(store.load_processed().unwrap().len(), 1);
    }

    #[test]
    fn open_fails_for_unwritable_location() {
        let result = CsvStoreAdapter::open(PathBuf::from("/nonexistent/dir/out.csv"));
        assert!(matches!(result, Err(CollectorError::Storage { .. })));
    }

    #[test]
    fn append_then_reload_round_trips_symbols() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvStoreAdapter::open(dir.path().join("out.csv")).unwrap();
        store.append(&sample_record("AAPL")).unwrap();
        store.append(&sample_record("HTGC")).unwrap();

        let processed = store.load_processed().unwrap();
        assert_eq!(processed.len(), 2);
        assert!(processed.contains("AAPL"));
        assert!(processed.contains("HTGC"));
    }

    #[test]
    fn load_processed_skips_truncated_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut store = CsvStoreAdapter::open(path.clone()).unwrap();
        store.append(&sample_record("AAPL")).unwrap();
        store.append(&sample_record("MSFT")).unwrap();

        // Simulate a torn write: a trailing row cut off mid-field.
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"HTGC,Hercules Cap").unwrap();
        drop(file);

        let store = CsvStoreAdapter::open(path).unwrap();
        let processed = store.load_processed().unwrap();
        assert_eq!(processed.len(), 2);
        assert!(!processed.contains("HTGC"));
    }

    #[test]
    fn load_processed_skips_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = CsvStoreAdapter::open(dir.path().join("out.csv")).unwrap();
        assert!(store.load_processed().unwrap().is_empty());
    }

    #[test]
    fn load_records_parses_fields() {
        let dir = TempDir::new().unwrap();
        let mut store = CsvStoreAdapter::open(dir.path().join("out.csv")).unwrap();
        store.append(&sample_record("HTGC")).unwrap();

        let records = store.load_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "HTGC");
        assert_eq!(records[0].name, "HTGC Corp");
        assert_eq!(records[0].market_cap, 2_500_000_000.0);
        assert_eq!(records[0].dividend_yield, 8.0);
        assert_eq!(records[0].age_years, 30.5);
        assert_eq!(records[0].exchange, "NASDAQ");
    }

    #[test]
    fn load_records_skips_rows_with_bad_numbers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut store = CsvStoreAdapter::open(path.clone()).unwrap();
        store.append(&sample_record("AAPL")).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"BAD,Bad Co,not_a_number,0,0,NYSE,2025-01-01T00:00:00Z\n")
            .unwrap();
        drop(file);

        let store = CsvStoreAdapter::open(path).unwrap();
        let records = store.load_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "AAPL");
    }

    #[test]
    fn append_quotes_fields_containing_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut store = CsvStoreAdapter::open(path.clone()).unwrap();
        let mut record = sample_record("HTGC");
        record.name = "Hercules Capital, Inc.".into();
        store.append(&record).unwrap();

        let records = store.load_records().unwrap();
        assert_eq!(records[0].name, "Hercules Capital, Inc.");
    }
}
