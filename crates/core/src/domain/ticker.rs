use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exchange-qualified symbol, e.g. `BEL.NS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Upper-cases `symbol` and appends `market_suffix`.
    pub fn new(symbol: &str, market_suffix: &str) -> anyhow::Result<Self> {
        let symbol = symbol.trim();
        ensure!(!symbol.is_empty(), "symbol must be non-empty");
        ensure!(
            !symbol.chars().any(char::is_whitespace),
            "symbol must not contain whitespace (got {symbol:?})"
        );

        Ok(Self(format!(
            "{}{}",
            symbol.to_ascii_uppercase(),
            market_suffix.trim()
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_appends_suffix() {
        let t = Ticker::new(" bel ", ".NS").unwrap();
        assert_eq!(t.as_str(), "BEL.NS");
        assert_eq!(t.to_string(), "BEL.NS");
    }

    #[test]
    fn empty_suffix_leaves_symbol_bare() {
        assert_eq!(Ticker::new("Fortis", "").unwrap().as_str(), "FORTIS");
    }

    #[test]
    fn rejects_blank_or_spaced_symbols() {
        assert!(Ticker::new("   ", ".NS").is_err());
        assert!(Ticker::new("FEDERAL BNK", ".NS").is_err());
    }
}
