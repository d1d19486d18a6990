//! Instrument symbols
//!
//! A symbol is published as the routing key of every trade, so it has to be a
//! single topic word: no `.` separators, no `*`/`#` wildcards, no whitespace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbol validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,

    #[error("symbol {symbol:?} contains reserved character {ch:?}")]
    ReservedChar { symbol: String, ch: char },
}

/// Tradable instrument identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Validate and wrap a symbol name
    pub fn new(name: impl Into<String>) -> Result<Self, SymbolError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SymbolError::Empty);
        }
        if let Some(ch) = name
            .chars()
            .find(|c| matches!(c, '.' | '*' | '#') || c.is_whitespace())
        {
            return Err(SymbolError::ReservedChar { symbol: name, ch });
        }
        Ok(Self(name))
    }

    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a list of names, failing on the first invalid one
    pub fn parse_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Self>, SymbolError> {
        names.iter().map(|n| Self::new(n.as_ref())).collect()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
