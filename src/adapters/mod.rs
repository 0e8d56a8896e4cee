//! Concrete adapter implementations for ports.

pub mod csv_store_adapter;
pub mod file_config_adapter;
pub mod listing_adapter;
pub mod quote_adapter;
