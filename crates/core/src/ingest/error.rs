use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Auth,
    QuoteInfo,
    PriceHistory,
}

impl FetchStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::QuoteInfo => "quote_info",
            Self::PriceHistory => "price_history",
        }
    }
}

/// Raised when the market-data provider could not supply data for a ticker.
#[derive(Debug, Clone)]
pub struct ProviderFetchError {
    pub provider: &'static str,
    pub stage: FetchStage,
    pub ticker: String,
    pub detail: String,
}

impl fmt::Display for ProviderFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data fetch failed (provider={}, stage={}, ticker={}): {}",
            self.provider,
            self.stage.as_str(),
            self.ticker,
            self.detail
        )
    }
}

impl std::error::Error for ProviderFetchError {}
