use chrono::{DateTime, Duration, Utc};

const MAX_WINDOW_DAYS: i64 = 31;

/// Backward-looking `[start, end]` range used for the volume aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl HistoryWindow {
    pub fn trailing_days(now_utc: DateTime<Utc>, days: i64) -> anyhow::Result<Self> {
        anyhow::ensure!(
            (1..=MAX_WINDOW_DAYS).contains(&days),
            "history window must be 1..={MAX_WINDOW_DAYS} days (got {days})"
        );

        Ok(Self {
            start: now_utc - Duration::days(days),
            end: now_utc,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn period1(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn period2(&self) -> i64 {
        self.end.timestamp()
    }
}
