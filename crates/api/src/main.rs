use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nsedash_core::ingest::QuoteProvider;
use nsedash_core::metrics::DerivedMetrics;
use nsedash_core::time::HistoryWindow;
use nsedash_core::universe::TickerUniverse;

mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nsedash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Built once here and never written again.
    let universe = Arc::new(TickerUniverse::load(&settings.market_suffix));
    let provider = nsedash_core::ingest::build_provider(&settings, &universe)?;

    let state = AppState {
        universe,
        provider,
        history_window_days: settings.history_window_days,
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(healthz))
        .route("/api/tickers", get(list_tickers))
        .route("/api/metrics/:symbol", get(get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    universe: Arc<TickerUniverse>,
    provider: Arc<dyn QuoteProvider>,
    history_window_days: i64,
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    symbol: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> (StatusCode, Html<String>) {
    let requested = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let selected = match requested {
        Some(s) => match state.universe.find(s) {
            Some(found) => found.to_string(),
            None => return (StatusCode::NOT_FOUND, Html(render::render_not_found(s))),
        },
        None => match state.universe.default_symbol() {
            Some(s) => s.to_string(),
            None => return (StatusCode::NOT_FOUND, Html(render::render_not_found(""))),
        },
    };

    let metrics = analyze(&state, &selected).await;
    let analysis = match &metrics {
        Some(m) => render::Analysis::Loaded(m),
        None => render::Analysis::Failed,
    };

    (
        StatusCode::OK,
        Html(render::render_page(
            state.universe.symbols(),
            &selected,
            &analysis,
        )),
    )
}

async fn list_tickers(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.universe.symbols().to_vec())
}

async fn get_metrics(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<DerivedMetrics>, (StatusCode, Json<ApiError>)> {
    let Some(selected) = state.universe.find(&symbol).map(str::to_string) else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiError {
                error: format!("unknown symbol {symbol}"),
            }),
        ));
    };

    analyze(&state, &selected).await.map(Json).ok_or_else(|| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ApiError {
                error: format!("Could not retrieve data for {selected}"),
            }),
        )
    })
}

/// One fetch-derive cycle for `symbol`; `None` means the fetch failed and was reported.
async fn analyze(state: &AppState, symbol: &str) -> Option<DerivedMetrics> {
    match run_cycle(state, symbol).await {
        Ok(m) => Some(m),
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%symbol, error = %err, "could not retrieve data");
            None
        }
    }
}

async fn run_cycle(state: &AppState, symbol: &str) -> anyhow::Result<DerivedMetrics> {
    let ticker = state.universe.ticker(symbol)?;
    let window = HistoryWindow::trailing_days(chrono::Utc::now(), state.history_window_days)?;
    nsedash_core::ingest::load_metrics(state.provider.as_ref(), &ticker, window).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &nsedash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
