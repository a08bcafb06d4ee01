use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nsedash_core::time::HistoryWindow;
use nsedash_core::universe::TickerUniverse;

mod report;

#[derive(Debug, Parser)]
#[command(name = "nsedash_worker")]
struct Args {
    /// NSE symbol to analyze (case-insensitive). Defaults to the first listed symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Print the selectable symbols and exit.
    #[arg(long)]
    list: bool,

    /// Emit the derived metrics as JSON instead of a text report.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = nsedash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let universe = TickerUniverse::load(&settings.market_suffix);
    if args.list {
        for s in universe.symbols() {
            println!("{s}");
        }
        return Ok(());
    }

    let symbol = resolve_symbol(&universe, args.symbol.as_deref())?;
    let ticker = universe.ticker(&symbol)?;
    let window = HistoryWindow::trailing_days(chrono::Utc::now(), settings.history_window_days)?;
    let provider = nsedash_core::ingest::build_provider(&settings, &universe)?;

    tracing::info!(%ticker, provider = provider.provider_name(), "analyzing");

    let metrics = match nsedash_core::ingest::load_metrics(provider.as_ref(), &ticker, window).await
    {
        Ok(m) => m,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%ticker, error = %err, "could not retrieve data");
            anyhow::bail!("Could not retrieve data for {symbol}");
        }
    };

    if args.json {
        let out = serde_json::to_string_pretty(&metrics).context("serialize metrics failed")?;
        println!("{out}");
    } else {
        print!("{}", report::render_text(&metrics));
    }
    Ok(())
}

fn resolve_symbol(universe: &TickerUniverse, arg: Option<&str>) -> anyhow::Result<String> {
    let Some(s) = arg.map(str::trim).filter(|s| !s.is_empty()) else {
        return universe
            .default_symbol()
            .map(str::to_string)
            .context("ticker universe is empty");
    };

    match universe.find(s) {
        Some(found) => Ok(found.to_string()),
        None => {
            tracing::warn!(symbol = %s, "symbol is not in the NSE list; querying anyway");
            Ok(s.to_ascii_uppercase())
        }
    }
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
