use crate::domain::Ticker;

// Selectable NSE symbols. FEDERALBNK and AAVAS used to be fused into one entry; see CHANGELOG.md.
const NSE_SYMBOLS: &[&str] = &[
    "WELCORP",
    "FORTIS",
    "BEL",
    "TDPOWERSYS",
    "ANANTRAJ",
    "TARIL",
    "KAYNES",
    "SOUTHBANK",
    "OLECTRA",
    "JWL",
    "PREMEXPLN",
    "FEDERALBNK",
    "AAVAS",
    "MANKIND",
    "BLS",
    "ARVINDFASN",
    "POLYMED",
    "REDTAPE",
    "SJS",
    "APTUS",
    "MEDANTA",
    "IDFCFIRSTB",
    "BIKAJI",
    "PNGJL",
    "BSOFT",
    "THOMASCOOK",
    "BAJFINANCE",
    "NH",
    "EMUDHRA",
    "SBFC",
    "VBL",
    "SHRIRAMFIN",
    "TATAELXSI",
    "BECTORFOOD",
    "ABCAPITAL",
    "KAJARIACER",
    "TATAMOTORS",
];

/// The symbols a user can pick from, built once at startup and never written afterwards.
#[derive(Debug, Clone)]
pub struct TickerUniverse {
    symbols: Vec<String>,
    market_suffix: String,
}

impl TickerUniverse {
    pub fn load(market_suffix: &str) -> Self {
        Self {
            symbols: NSE_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            market_suffix: market_suffix.trim().to_string(),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn default_symbol(&self) -> Option<&str> {
        self.symbols.first().map(String::as_str)
    }

    /// Case-insensitive lookup returning the canonical (upper-case) symbol.
    pub fn find(&self, symbol: &str) -> Option<&str> {
        let symbol = symbol.trim();
        self.symbols
            .iter()
            .find(|s| s.eq_ignore_ascii_case(symbol))
            .map(String::as_str)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.find(symbol).is_some()
    }

    pub fn ticker(&self, symbol: &str) -> anyhow::Result<Ticker> {
        Ticker::new(symbol, &self.market_suffix)
    }
}
