use crate::domain::{PriceHistoryPoint, RawQuoteInfo, Ticker};
use crate::ingest::provider::QuoteProvider;
use crate::time::HistoryWindow;
use crate::universe::TickerUniverse;
use anyhow::Result;
use chrono::{Datelike, Duration, Weekday};
use std::collections::{BTreeMap, BTreeSet};

/// In-memory provider with deterministic data, for offline runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    quotes: BTreeMap<String, RawQuoteInfo>,
    histories: BTreeMap<String, Vec<PriceHistoryPoint>>,
    failing_history: BTreeSet<String>,
    synthetic_history: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quotes for every symbol in `universe`, with one synthetic bar per weekday of the window.
    pub fn fixtures(universe: &TickerUniverse) -> Result<Self> {
        let mut out = Self {
            synthetic_history: true,
            ..Self::default()
        };
        for symbol in universe.symbols() {
            let ticker = universe.ticker(symbol)?;
            let seed = symbol_seed(symbol);
            out.quotes.insert(ticker.to_string(), fixture_quote(seed));
        }
        Ok(out)
    }

    pub fn with_quote(mut self, ticker: &Ticker, info: RawQuoteInfo) -> Self {
        self.quotes.insert(ticker.to_string(), info);
        self
    }

    pub fn with_history(mut self, ticker: &Ticker, history: Vec<PriceHistoryPoint>) -> Self {
        self.histories.insert(ticker.to_string(), history);
        self
    }

    pub fn with_failing_history(mut self, ticker: &Ticker) -> Self {
        self.failing_history.insert(ticker.to_string());
        self
    }
}

#[async_trait::async_trait]
impl QuoteProvider for MockProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn fetch_quote_info(&self, ticker: &Ticker) -> Result<RawQuoteInfo> {
        self.quotes
            .get(ticker.as_str())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no quote data for {ticker}"))
    }

    async fn fetch_price_history(
        &self,
        ticker: &Ticker,
        window: HistoryWindow,
    ) -> Result<Vec<PriceHistoryPoint>> {
        anyhow::ensure!(
            !self.failing_history.contains(ticker.as_str()),
            "history unavailable for {ticker}"
        );

        if let Some(history) = self.histories.get(ticker.as_str()) {
            return Ok(history.clone());
        }

        if self.synthetic_history && self.quotes.contains_key(ticker.as_str()) {
            return Ok(synthetic_history(symbol_seed(ticker.as_str()), window));
        }

        Ok(Vec::new())
    }
}

fn symbol_seed(symbol: &str) -> u64 {
    // FNV-1a
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
        (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn fixture_quote(seed: u64) -> RawQuoteInfo {
    let price = 50.0 + (seed % 8_000) as f64 / 4.0;
    let high = price * (1.0 + (seed % 30) as f64 / 100.0);
    let low = price * (0.95 - (seed % 40) as f64 / 100.0);
    let pe = (seed % 7 != 0).then(|| 8.0 + (seed % 450) as f64 / 10.0);

    RawQuoteInfo {
        current_price: Some(price),
        regular_market_previous_close: Some(price * 0.99),
        fifty_two_week_high: Some(high),
        fifty_two_week_low: Some(low),
        average_volume: Some(((seed % 5_000) * 1_000 + 10_000) as f64),
        trailing_pe: pe,
    }
}

fn synthetic_history(seed: u64, window: HistoryWindow) -> Vec<PriceHistoryPoint> {
    let mut out = Vec::new();
    let mut ts = window.start();
    while ts <= window.end() {
        if !matches!(ts.weekday(), Weekday::Sat | Weekday::Sun) {
            let day = u64::from(ts.ordinal());
            out.push(PriceHistoryPoint {
                timestamp: ts,
                volume: (seed.wrapping_add(day * 7_919) % 900_000) + 1_000,
            });
        }
        ts += Duration::days(1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn fixtures_cover_the_universe_deterministically() {
        let universe = TickerUniverse::load(".NS");
        let a = MockProvider::fixtures(&universe).unwrap();
        let b = MockProvider::fixtures(&universe).unwrap();

        let ticker = universe.ticker("TATAMOTORS").unwrap();
        let qa = a.fetch_quote_info(&ticker).await.unwrap();
        let qb = b.fetch_quote_info(&ticker).await.unwrap();
        assert_eq!(qa, qb);
        assert!(qa.current_price.is_some());
    }

    #[tokio::test]
    async fn synthetic_history_skips_weekends() {
        let universe = TickerUniverse::load(".NS");
        let provider = MockProvider::fixtures(&universe).unwrap();
        let ticker = universe.ticker("BEL").unwrap();

        // Wednesday 2026-10-14; the trailing week holds two weekend days.
        let now = Utc.with_ymd_and_hms(2026, 10, 14, 10, 0, 0).unwrap();
        let window = HistoryWindow::trailing_days(now, 7).unwrap();
        let history = provider.fetch_price_history(&ticker, window).await.unwrap();
        assert_eq!(history.len(), 6);
        assert!(history.iter().all(|p| p.volume >= 1_000));
    }

    #[tokio::test]
    async fn unknown_ticker_fails_quote_info() {
        let provider = MockProvider::new();
        let ticker = Ticker::new("ghost", ".NS").unwrap();
        assert!(provider.fetch_quote_info(&ticker).await.is_err());
    }
}
