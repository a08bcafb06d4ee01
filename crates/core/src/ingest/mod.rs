pub mod error;
pub mod mock;
pub mod provider;
pub(crate) mod types;
pub mod yahoo;

use crate::config::{ProviderKind, Settings};
use crate::universe::TickerUniverse;
use std::sync::Arc;

pub use provider::{fetch_snapshot, load_metrics, QuoteProvider, QuoteSnapshot};

pub fn build_provider(
    settings: &Settings,
    universe: &TickerUniverse,
) -> anyhow::Result<Arc<dyn QuoteProvider>> {
    let provider: Arc<dyn QuoteProvider> = match settings.data_provider {
        ProviderKind::Yahoo => Arc::new(yahoo::YahooProvider::from_settings(settings)?),
        ProviderKind::Mock => Arc::new(mock::MockProvider::fixtures(universe)?),
    };
    tracing::info!(provider = provider.provider_name(), "market data provider ready");
    Ok(provider)
}
