//! Port traits implemented by adapters.

pub mod config_port;
pub mod quote_source;
pub mod record_store;
pub mod symbol_source;
