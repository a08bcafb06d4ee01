//! Yahoo Finance wire shapes. Only the fields the dashboard reads are modelled.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiError {
    pub fn message(&self) -> String {
        match (&self.code, &self.description) {
            (Some(c), Some(d)) => format!("{c}: {d}"),
            (Some(c), None) => c.clone(),
            (None, Some(d)) => d.clone(),
            (None, None) => "unspecified provider error".to_string(),
        }
    }
}

/// Yahoo wraps most numbers as `{"raw": 1.0, "fmt": "1.00"}`; missing data is often `{}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub(crate) struct RawValue {
    #[serde(default)]
    pub raw: Option<f64>,
}

pub(crate) fn raw(v: &Option<RawValue>) -> Option<f64> {
    v.and_then(|v| v.raw)
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QuoteSummaryData {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(default)]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(default)]
    pub financial_data: Option<FinancialDataModule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PriceModule {
    #[serde(default)]
    pub regular_market_price: Option<RawValue>,
    #[serde(default)]
    pub regular_market_previous_close: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SummaryDetailModule {
    #[serde(default)]
    pub previous_close: Option<RawValue>,
    #[serde(default)]
    pub regular_market_previous_close: Option<RawValue>,
    #[serde(default)]
    pub fifty_two_week_high: Option<RawValue>,
    #[serde(default)]
    pub fifty_two_week_low: Option<RawValue>,
    #[serde(default)]
    pub average_volume: Option<RawValue>,
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<RawValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FinancialDataModule {
    #[serde(default)]
    pub current_price: Option<RawValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartResponse {
    pub chart: ChartData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartData {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChartQuote {
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}
