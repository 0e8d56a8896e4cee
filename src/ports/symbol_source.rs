//! Symbol universe port trait.

use crate::domain::symbol::Symbol;

/// Source of the tradable-symbol universe.
///
/// Total by contract: implementations return an empty, deduplicated sequence
/// on any network, parse, or schema error. Callers treat empty as "no data
/// available", never as a fatal condition.
pub trait SymbolSource {
    fn fetch_symbols(&self) -> Vec<Symbol>;
}
