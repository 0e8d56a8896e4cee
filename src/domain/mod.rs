//! Core domain types and logic.

pub mod collector;
pub mod error;
pub mod quote;
pub mod record;
pub mod screen;
pub mod symbol;
