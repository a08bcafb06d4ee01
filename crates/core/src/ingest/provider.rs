use crate::domain::{PriceHistoryPoint, RawQuoteInfo, Ticker};
use crate::ingest::error::{FetchStage, ProviderFetchError};
use crate::metrics::{derive_all_metrics, DerivedMetrics};
use crate::time::HistoryWindow;
use anyhow::{Context, Result};

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch_quote_info(&self, ticker: &Ticker) -> Result<RawQuoteInfo>;

    async fn fetch_price_history(
        &self,
        ticker: &Ticker,
        window: HistoryWindow,
    ) -> Result<Vec<PriceHistoryPoint>>;
}

/// Everything one derivation needs for a single ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSnapshot {
    pub info: RawQuoteInfo,
    pub history: Vec<PriceHistoryPoint>,
}

/// Fetches info, then history. Either call failing fails the whole snapshot with a
/// [`ProviderFetchError`] naming the stage.
pub async fn fetch_snapshot(
    provider: &dyn QuoteProvider,
    ticker: &Ticker,
    window: HistoryWindow,
) -> Result<QuoteSnapshot> {
    let t0 = std::time::Instant::now();

    let info = provider
        .fetch_quote_info(ticker)
        .await
        .map_err(|err| fetch_error(provider, FetchStage::QuoteInfo, ticker, err))?;

    let history = provider
        .fetch_price_history(ticker, window)
        .await
        .map_err(|err| fetch_error(provider, FetchStage::PriceHistory, ticker, err))?;

    tracing::debug!(
        provider = provider.provider_name(),
        %ticker,
        history_points = history.len(),
        elapsed_ms = t0.elapsed().as_millis(),
        "quote snapshot fetched"
    );

    Ok(QuoteSnapshot { info, history })
}

fn fetch_error(
    provider: &dyn QuoteProvider,
    stage: FetchStage,
    ticker: &Ticker,
    err: anyhow::Error,
) -> anyhow::Error {
    anyhow::Error::new(ProviderFetchError {
        provider: provider.provider_name(),
        stage,
        ticker: ticker.to_string(),
        detail: format!("{err:#}"),
    })
}

/// One fetch-then-derive cycle. The deriver is only reached when the fetch succeeded.
pub async fn load_metrics(
    provider: &dyn QuoteProvider,
    ticker: &Ticker,
    window: HistoryWindow,
) -> Result<DerivedMetrics> {
    let snapshot = fetch_snapshot(provider, ticker, window).await?;
    derive_all_metrics(Some(&snapshot.info), &snapshot.history, ticker)
        .with_context(|| format!("no metrics derived for {ticker}"))
}
