use crate::config::Settings;
use crate::domain::{PriceHistoryPoint, RawQuoteInfo, Ticker};
use crate::ingest::error::{FetchStage, ProviderFetchError};
use crate::ingest::provider::QuoteProvider;
use crate::ingest::types::{raw, ChartResponse, QuoteSummaryResponse};
use crate::time::HistoryWindow;
use anyhow::{Context, Result};
use chrono::DateTime;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

const PROVIDER_NAME: &str = "yahoo";
const QUOTE_SUMMARY_MODULES: &str = "price,summaryDetail,financialData";
const QUOTE_SUMMARY_PATH: &[&str] = &["v10", "finance", "quoteSummary"];
const CHART_PATH: &[&str] = &["v8", "finance", "chart"];
const CRUMB_PATH: &str = "/v1/test/getcrumb";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Debug, Clone, PartialEq, Eq)]
struct YahooAuth {
    cookie: Option<String>,
    crumb: String,
}

/// Non-2xx answer from Yahoo, kept typed so the retry loop can tell permanent failures apart.
#[derive(Debug)]
struct HttpStatusError {
    status: StatusCode,
    body: String,
}

impl HttpStatusError {
    fn is_permanent(&self) -> bool {
        self.status.is_client_error()
            && !matches!(
                self.status,
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            )
    }
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "yahoo HTTP {}: {}", self.status, self.body)
    }
}

impl std::error::Error for HttpStatusError {}

#[derive(Debug)]
pub struct YahooProvider {
    http: reqwest::Client,
    base_url: String,
    cookie_url: String,
    retries: u32,
    // Set from YAHOO_CRUMB/YAHOO_COOKIE; skips the handshake entirely.
    pinned_auth: Option<YahooAuth>,

    // Handshake result, reused for the life of the process.
    auth_cache: tokio::sync::Mutex<Option<YahooAuth>>,
}

impl YahooProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.data_provider_timeout_secs))
            .default_headers(headers)
            .build()
            .context("failed to build yahoo http client")?;

        let pinned_auth = settings.yahoo_crumb.as_ref().map(|crumb| YahooAuth {
            cookie: settings.yahoo_cookie.clone(),
            crumb: crumb.clone(),
        });

        Ok(Self {
            http,
            base_url: settings.data_provider_base_url.trim_end_matches('/').to_string(),
            cookie_url: settings.data_provider_cookie_url.clone(),
            retries: settings.data_provider_retries.max(1),
            pinned_auth,
            auth_cache: tokio::sync::Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/{prefix...}/{ticker}` with the ticker encoded as a single path segment.
    fn ticker_url(&self, prefix: &[&str], ticker: &Ticker) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid yahoo base url {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("yahoo base url cannot take a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(prefix)
            .push(ticker.as_str());
        Ok(url)
    }

    async fn auth(&self, ticker: &Ticker) -> Result<YahooAuth> {
        if let Some(auth) = &self.pinned_auth {
            return Ok(auth.clone());
        }

        let mut guard = self.auth_cache.lock().await;
        if let Some(auth) = guard.as_ref() {
            return Ok(auth.clone());
        }

        let auth = self.fetch_auth().await.map_err(|err| {
            anyhow::Error::new(ProviderFetchError {
                provider: PROVIDER_NAME,
                stage: FetchStage::Auth,
                ticker: ticker.to_string(),
                detail: format!("{err:#}"),
            })
        })?;
        tracing::debug!(has_cookie = auth.cookie.is_some(), "obtained yahoo crumb");
        *guard = Some(auth.clone());
        Ok(auth)
    }

    async fn clear_auth(&self) {
        *self.auth_cache.lock().await = None;
    }

    async fn fetch_auth(&self) -> Result<YahooAuth> {
        // The cookie endpoint answers 404 but still sets the session cookie.
        let res = self
            .http
            .get(&self.cookie_url)
            .send()
            .await
            .context("yahoo cookie request failed")?;

        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(';').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let mut req = self.http.get(self.url(CRUMB_PATH));
        if let Some(cookie) = &cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let res = req.send().await.context("yahoo crumb request failed")?;
        let status = res.status();
        let body = res.text().await.context("failed to read yahoo crumb")?;
        let crumb = body.trim();

        anyhow::ensure!(status.is_success(), "yahoo crumb HTTP {status}: {crumb}");
        anyhow::ensure!(
            !crumb.is_empty()
                && crumb.len() < 100
                && !crumb.contains(char::is_whitespace)
                && !crumb.contains('<'),
            "yahoo returned an unusable crumb: {crumb}"
        );

        Ok(YahooAuth {
            cookie,
            crumb: crumb.to_string(),
        })
    }

    async fn fetch_once(
        &self,
        url: &reqwest::Url,
        query: &[(&str, String)],
        auth: Option<&YahooAuth>,
    ) -> Result<Value> {
        let mut query = query.to_vec();
        let mut req = self.http.get(url.clone());
        if let Some(auth) = auth {
            query.push(("crumb", auth.crumb.clone()));
            if let Some(cookie) = &auth.cookie {
                req = req.header(header::COOKIE, cookie);
            }
        }

        let res = req
            .query(&query)
            .send()
            .await
            .context("yahoo request failed")?;

        let status = res.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            self.clear_auth().await;
        }

        let text = res
            .text()
            .await
            .context("failed to read yahoo response")?;
        if !status.is_success() {
            return Err(anyhow::Error::new(HttpStatusError { status, body: text }));
        }

        serde_json::from_str::<Value>(&text)
            .with_context(|| format!("yahoo response is not valid JSON (HTTP {status}): {text}"))
    }

    async fn get_json(
        &self,
        ticker: &Ticker,
        url: &reqwest::Url,
        query: &[(&str, String)],
        authenticated: bool,
    ) -> Result<Value> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let res = if authenticated {
                match self.auth(ticker).await {
                    Ok(auth) => self.fetch_once(url, query, Some(&auth)).await,
                    Err(err) => Err(err),
                }
            } else {
                self.fetch_once(url, query, None).await
            };

            match res {
                Ok(v) => return Ok(v),
                Err(err) => {
                    let permanent = err
                        .downcast_ref::<HttpStatusError>()
                        .is_some_and(HttpStatusError::is_permanent);
                    if permanent || attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = Duration::from_secs(1 << (attempt - 1));
                    tracing::warn!(attempt, %ticker, ?backoff, error = %err, "yahoo fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_quote_info(&self, ticker: &Ticker) -> Result<RawQuoteInfo> {
        let url = self.ticker_url(QUOTE_SUMMARY_PATH, ticker)?;
        let query = [("modules", QUOTE_SUMMARY_MODULES.to_string())];
        let v = self.get_json(ticker, &url, &query, true).await?;
        parse_quote_summary(v)
    }

    async fn fetch_price_history(
        &self,
        ticker: &Ticker,
        window: HistoryWindow,
    ) -> Result<Vec<PriceHistoryPoint>> {
        let url = self.ticker_url(CHART_PATH, ticker)?;
        let query = [
            ("period1", window.period1().to_string()),
            ("period2", window.period2().to_string()),
            ("interval", "1d".to_string()),
        ];
        let v = self.get_json(ticker, &url, &query, false).await?;
        parse_chart(v)
    }
}

pub(crate) fn parse_quote_summary(v: Value) -> Result<RawQuoteInfo> {
    let parsed = serde_json::from_value::<QuoteSummaryResponse>(v)
        .context("failed to parse yahoo quoteSummary response")?;

    if let Some(err) = parsed.quote_summary.error {
        anyhow::bail!("yahoo quoteSummary error: {}", err.message());
    }

    let result = parsed
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .context("yahoo quoteSummary returned no result")?;

    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();
    let financial = result.financial_data.unwrap_or_default();

    Ok(RawQuoteInfo {
        current_price: raw(&financial.current_price).or_else(|| raw(&price.regular_market_price)),
        regular_market_previous_close: raw(&price.regular_market_previous_close)
            .or_else(|| raw(&detail.regular_market_previous_close))
            .or_else(|| raw(&detail.previous_close)),
        fifty_two_week_high: raw(&detail.fifty_two_week_high),
        fifty_two_week_low: raw(&detail.fifty_two_week_low),
        average_volume: raw(&detail.average_volume),
        trailing_pe: raw(&detail.trailing_pe),
    })
}

pub(crate) fn parse_chart(v: Value) -> Result<Vec<PriceHistoryPoint>> {
    let parsed =
        serde_json::from_value::<ChartResponse>(v).context("failed to parse yahoo chart response")?;

    if let Some(err) = parsed.chart.error {
        anyhow::bail!("yahoo chart error: {}", err.message());
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let volumes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.volume)
        .unwrap_or_default();

    let mut out = Vec::with_capacity(result.timestamp.len());
    for (ts, volume) in result.timestamp.iter().zip(volumes) {
        // Null volumes mark intervals without trades data.
        let Some(volume) = volume else {
            continue;
        };
        let timestamp = DateTime::from_timestamp(*ts, 0)
            .with_context(|| format!("invalid chart timestamp {ts}"))?;
        out.push(PriceHistoryPoint { timestamp, volume });
    }
    Ok(out)
}
