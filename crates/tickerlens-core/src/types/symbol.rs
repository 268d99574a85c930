//! Ticker symbols.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SymbolError;

const MAX_SYMBOL_LEN: usize = 12;

/// Normalized equity ticker.
///
/// Parsing trims surrounding whitespace and upper-cases the input. A valid
/// ticker starts with an ASCII letter and otherwise contains only ASCII
/// alphanumerics, `.` and `-` (e.g. `AAPL`, `BRK.B`, `RDS-A`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parse and normalize a ticker.
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }

        let normalized = trimmed.to_ascii_uppercase();
        if normalized.chars().count() > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong {
                symbol: normalized,
                max: MAX_SYMBOL_LEN,
            });
        }

        if !normalized.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(SymbolError::InvalidStart { symbol: normalized });
        }

        if let Some((index, ch)) = normalized
            .chars()
            .enumerate()
            .find(|(_, ch)| !(ch.is_ascii_alphanumeric() || *ch == '.' || *ch == '-'))
        {
            return Err(SymbolError::InvalidChar {
                symbol: normalized,
                ch,
                index,
            });
        }

        Ok(Self(normalized))
    }

    /// Get the normalized ticker text.
    pub fn as_str(&self) -> &str {
        &self.0
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
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
