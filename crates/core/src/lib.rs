pub mod display;
pub mod domain;
pub mod ingest;
pub mod metrics;
pub mod time;
pub mod universe;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
    pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
    pub const DEFAULT_MARKET_SUFFIX: &str = ".NS";
    pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 7;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_RETRIES: u32 = 3;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum ProviderKind {
        Yahoo,
        Mock,
    }

    impl ProviderKind {
        pub fn parse(s: &str) -> anyhow::Result<Self> {
            match s.trim().to_ascii_lowercase().as_str() {
                "" | "yahoo" => Ok(Self::Yahoo),
                "mock" => Ok(Self::Mock),
                other => anyhow::bail!("unknown DATA_PROVIDER {other:?} (expected yahoo or mock)"),
            }
        }
    }

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub data_provider: ProviderKind,
        pub data_provider_base_url: String,
        pub data_provider_cookie_url: String,
        pub data_provider_timeout_secs: u64,
        pub data_provider_retries: u32,
        pub yahoo_cookie: Option<String>,
        pub yahoo_crumb: Option<String>,
        pub market_suffix: String,
        pub history_window_days: i64,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                data_provider: ProviderKind::Yahoo,
                data_provider_base_url: DEFAULT_BASE_URL.to_string(),
                data_provider_cookie_url: DEFAULT_COOKIE_URL.to_string(),
                data_provider_timeout_secs: DEFAULT_TIMEOUT_SECS,
                data_provider_retries: DEFAULT_RETRIES,
                yahoo_cookie: None,
                yahoo_crumb: None,
                market_suffix: DEFAULT_MARKET_SUFFIX.to_string(),
                history_window_days: DEFAULT_HISTORY_WINDOW_DAYS,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let data_provider = match std::env::var("DATA_PROVIDER") {
                Ok(s) => ProviderKind::parse(&s).context("invalid DATA_PROVIDER")?,
                Err(_) => defaults.data_provider,
            };

            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                data_provider,
                data_provider_base_url: non_empty_var("DATA_PROVIDER_BASE_URL")
                    .unwrap_or(defaults.data_provider_base_url),
                data_provider_cookie_url: non_empty_var("DATA_PROVIDER_COOKIE_URL")
                    .unwrap_or(defaults.data_provider_cookie_url),
                data_provider_timeout_secs: parsed_var::<u64>("DATA_PROVIDER_TIMEOUT_SECS")
                    .unwrap_or(defaults.data_provider_timeout_secs),
                data_provider_retries: parsed_var::<u32>("DATA_PROVIDER_RETRIES")
                    .filter(|n| *n >= 1)
                    .unwrap_or(defaults.data_provider_retries),
                yahoo_cookie: non_empty_var("YAHOO_COOKIE"),
                yahoo_crumb: non_empty_var("YAHOO_CRUMB"),
                market_suffix: std::env::var("MARKET_SUFFIX")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .unwrap_or(defaults.market_suffix),
                history_window_days: parsed_var::<i64>("HISTORY_WINDOW_DAYS")
                    .filter(|d| (1..=31).contains(d))
                    .unwrap_or(defaults.history_window_days),
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
    }

}
