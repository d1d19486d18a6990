//! Core value types
//!
//! - Symbol: validated instrument name, doubles as a routing key
//! - Trade: one simulated price observation

pub mod symbol;
pub mod trade;

pub use symbol::{Symbol, SymbolError};
pub use trade::Trade;
