use crate::domain::{PriceHistoryPoint, RawQuoteInfo, Ticker};
use serde::{Deserialize, Serialize};

/// Cut-offs for the valuation rules. `Default` holds the dashboard's fixed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationThresholds {
    /// P/E strictly below this is reported as undervalued.
    pub undervalued_pe: f64,
    /// P/E strictly above this is reported as overvalued.
    pub overvalued_pe: f64,
    /// Price at or above `high * near_high_ratio` counts as near the 52-week high.
    pub near_high_ratio: f64,
    /// Price at or below `low * near_low_ratio` counts as near the 52-week low.
    pub near_low_ratio: f64,
}

impl Default for ValuationThresholds {
    fn default() -> Self {
        Self {
            undervalued_pe: 15.0,
            overvalued_pe: 35.0,
            near_high_ratio: 0.95,
            near_low_ratio: 1.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuationLabel {
    Undervalued,
    Overvalued,
    FairValuation,
    NearHigh,
    NearLow,
    NoSignificantAlerts,
}

impl ValuationLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undervalued => "Undervalued (P/E < 15)",
            Self::Overvalued => "Overvalued (P/E > 35)",
            Self::FairValuation => "Fair Valuation",
            Self::NearHigh => "Near 52-week High",
            Self::NearLow => "Near 52-week Low",
            Self::NoSignificantAlerts => "No significant alerts",
        }
    }
}

/// Per-ticker snapshot. Only [`MetricsDeriver`] builds one; a new fetch yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    ticker: String,
    current_price: Option<f64>,
    week52_high: Option<f64>,
    week52_low: Option<f64>,
    avg_daily_volume: Option<f64>,
    weekly_volume: Option<u64>,
    pe_ratio: Option<f64>,
    valuation_assessment: Vec<String>,
}

impl DerivedMetrics {
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    pub fn week52_high(&self) -> Option<f64> {
        self.week52_high
    }

    pub fn week52_low(&self) -> Option<f64> {
        self.week52_low
    }

    pub fn avg_daily_volume(&self) -> Option<f64> {
        self.avg_daily_volume
    }

    pub fn weekly_volume(&self) -> Option<u64> {
        self.weekly_volume
    }

    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe_ratio
    }

    pub fn valuation_assessment(&self) -> &[String] {
        &self.valuation_assessment
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsDeriver {
    thresholds: ValuationThresholds,
}

impl MetricsDeriver {
    pub fn with_thresholds(thresholds: ValuationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn current_price(&self, info: &RawQuoteInfo) -> Option<f64> {
        present(info.current_price).or_else(|| present(info.regular_market_previous_close))
    }

    pub fn weekly_volume(&self, history: &[PriceHistoryPoint]) -> Option<u64> {
        if history.is_empty() {
            return None;
        }
        Some(
            history
                .iter()
                .fold(0u64, |acc, p| acc.saturating_add(p.volume)),
        )
    }

    pub fn valuation_labels(&self, info: &RawQuoteInfo) -> Vec<ValuationLabel> {
        let t = &self.thresholds;
        let mut out = Vec::with_capacity(3);

        if let Some(pe) = present(info.trailing_pe) {
            out.push(if pe < t.undervalued_pe {
                ValuationLabel::Undervalued
            } else if pe > t.overvalued_pe {
                ValuationLabel::Overvalued
            } else {
                ValuationLabel::FairValuation
            });
        }

        let current = self.current_price(info);

        if let (Some(current), Some(high)) = (current, present(info.fifty_two_week_high)) {
            if current >= high * t.near_high_ratio {
                out.push(ValuationLabel::NearHigh);
            }
        }

        if let (Some(current), Some(low)) = (current, present(info.fifty_two_week_low)) {
            if current <= low * t.near_low_ratio {
                out.push(ValuationLabel::NearLow);
            }
        }

        if out.is_empty() {
            out.push(ValuationLabel::NoSignificantAlerts);
        }
        out
    }

    pub fn valuation_assessment(&self, info: &RawQuoteInfo) -> Vec<String> {
        self.valuation_labels(info)
            .into_iter()
            .map(|l| l.as_str().to_string())
            .collect()
    }

    /// Returns `None` only when `info` is absent, i.e. the upstream fetch produced nothing.
    pub fn derive(
        &self,
        info: Option<&RawQuoteInfo>,
        history: &[PriceHistoryPoint],
        ticker: &Ticker,
    ) -> Option<DerivedMetrics> {
        let info = info?;

        Some(DerivedMetrics {
            ticker: ticker.as_str().to_string(),
            current_price: self.current_price(info),
            week52_high: present(info.fifty_two_week_high),
            week52_low: present(info.fifty_two_week_low),
            avg_daily_volume: present(info.average_volume),
            weekly_volume: self.weekly_volume(history),
            pe_ratio: present(info.trailing_pe),
            valuation_assessment: self.valuation_assessment(info),
        })
    }
}

pub fn derive_current_price(info: &RawQuoteInfo) -> Option<f64> {
    MetricsDeriver::default().current_price(info)
}

pub fn derive_weekly_volume(history: &[PriceHistoryPoint]) -> Option<u64> {
    MetricsDeriver::default().weekly_volume(history)
}

pub fn derive_valuation_assessment(info: &RawQuoteInfo) -> Vec<String> {
    MetricsDeriver::default().valuation_assessment(info)
}

pub fn derive_all_metrics(
    info: Option<&RawQuoteInfo>,
    history: &[PriceHistoryPoint],
    ticker: &Ticker,
) -> Option<DerivedMetrics> {
    MetricsDeriver::default().derive(info, history, ticker)
}

// Zero is a real value; only non-finite numbers are discarded.
fn present(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(day: u32, volume: u64) -> PriceHistoryPoint {
        PriceHistoryPoint {
            timestamp: Utc.with_ymd_and_hms(2026, 10, day, 3, 45, 0).unwrap(),
            volume,
        }
    }

    fn pe_only(pe: f64) -> RawQuoteInfo {
        RawQuoteInfo {
            trailing_pe: Some(pe),
            ..Default::default()
        }
    }

    #[test]
    fn current_price_wins_over_previous_close() {
        let info = RawQuoteInfo {
            current_price: Some(412.3),
            regular_market_previous_close: Some(400.0),
            ..Default::default()
        };
        assert_eq!(derive_current_price(&info), Some(412.3));
    }

    #[test]
    fn falls_back_to_previous_close() {
        let info = RawQuoteInfo {
            regular_market_previous_close: Some(400.0),
            ..Default::default()
        };
        assert_eq!(derive_current_price(&info), Some(400.0));
    }

    #[test]
    fn no_price_fields_means_no_price() {
        assert_eq!(derive_current_price(&RawQuoteInfo::default()), None);
    }

    #[test]
    fn zero_price_is_kept() {
        let info = RawQuoteInfo {
            current_price: Some(0.0),
            regular_market_previous_close: Some(12.0),
            ..Default::default()
        };
        assert_eq!(derive_current_price(&info), Some(0.0));
    }

    #[test]
    fn nan_price_is_treated_as_absent() {
        let info = RawQuoteInfo {
            current_price: Some(f64::NAN),
            regular_market_previous_close: Some(12.0),
            ..Default::default()
        };
        assert_eq!(derive_current_price(&info), Some(12.0));
    }

    #[test]
    fn weekly_volume_sums_points() {
        let history = [point(5, 1_200), point(6, 0), point(7, 3_400), point(8, 50)];
        assert_eq!(derive_weekly_volume(&history), Some(4_650));
    }

    #[test]
    fn weekly_volume_of_empty_window_is_absent_not_zero() {
        assert_eq!(derive_weekly_volume(&[]), None);
        assert_eq!(derive_weekly_volume(&[point(5, 0)]), Some(0));
    }

    #[test]
    fn pe_bands() {
        assert_eq!(
            derive_valuation_assessment(&pe_only(12.0)),
            vec!["Undervalued (P/E < 15)".to_string()]
        );
        assert_eq!(
            derive_valuation_assessment(&pe_only(40.0)),
            vec!["Overvalued (P/E > 35)".to_string()]
        );
        assert_eq!(
            derive_valuation_assessment(&pe_only(20.0)),
            vec!["Fair Valuation".to_string()]
        );
    }

    #[test]
    fn pe_band_edges_are_fair() {
        assert_eq!(derive_valuation_assessment(&pe_only(15.0)), vec!["Fair Valuation"]);
        assert_eq!(derive_valuation_assessment(&pe_only(35.0)), vec!["Fair Valuation"]);
    }

    #[test]
    fn near_high_and_near_low() {
        let high = RawQuoteInfo {
            current_price: Some(100.0),
            fifty_two_week_high: Some(104.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&high), vec!["Near 52-week High"]);

        let low = RawQuoteInfo {
            current_price: Some(50.0),
            fifty_two_week_low: Some(48.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&low), vec!["Near 52-week Low"]);
    }

    #[test]
    fn near_band_edges_are_inclusive() {
        let at_high_edge = RawQuoteInfo {
            current_price: Some(95.0),
            fifty_two_week_high: Some(100.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&at_high_edge), vec!["Near 52-week High"]);

        let at_low_edge = RawQuoteInfo {
            current_price: Some(105.0),
            fifty_two_week_low: Some(100.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&at_low_edge), vec!["Near 52-week Low"]);
    }

    #[test]
    fn labels_keep_rule_order() {
        // A narrow 52-week band can put the price near both ends at once.
        let info = RawQuoteInfo {
            current_price: Some(100.0),
            fifty_two_week_high: Some(102.0),
            fifty_two_week_low: Some(98.0),
            trailing_pe: Some(41.0),
            ..Default::default()
        };
        assert_eq!(
            derive_valuation_assessment(&info),
            vec![
                "Overvalued (P/E > 35)",
                "Near 52-week High",
                "Near 52-week Low"
            ]
        );
    }

    #[test]
    fn band_rules_use_previous_close_when_current_is_missing() {
        let info = RawQuoteInfo {
            regular_market_previous_close: Some(99.0),
            fifty_two_week_high: Some(100.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&info), vec!["Near 52-week High"]);
    }

    #[test]
    fn nothing_known_yields_fallback_only() {
        assert_eq!(
            derive_valuation_assessment(&RawQuoteInfo::default()),
            vec!["No significant alerts"]
        );

        let mid_band = RawQuoteInfo {
            current_price: Some(75.0),
            fifty_two_week_high: Some(100.0),
            fifty_two_week_low: Some(50.0),
            ..Default::default()
        };
        assert_eq!(derive_valuation_assessment(&mid_band), vec!["No significant alerts"]);
    }

    #[test]
    fn custom_thresholds_shift_bands() {
        let deriver = MetricsDeriver::with_thresholds(ValuationThresholds {
            undervalued_pe: 10.0,
            ..Default::default()
        });
        assert_eq!(
            deriver.valuation_labels(&pe_only(12.0)),
            vec![ValuationLabel::FairValuation]
        );
    }

    #[test]
    fn derive_all_metrics_composes_fields() {
        let ticker = Ticker::new("bel", ".NS").unwrap();
        let info = RawQuoteInfo {
            current_price: Some(290.0),
            regular_market_previous_close: Some(288.5),
            fifty_two_week_high: Some(300.0),
            fifty_two_week_low: Some(180.0),
            average_volume: Some(18_500_000.0),
            trailing_pe: Some(45.2),
        };
        let history = [point(5, 10), point(6, 20)];

        let m = derive_all_metrics(Some(&info), &history, &ticker).unwrap();
        assert_eq!(m.ticker(), "BEL.NS");
        assert_eq!(m.current_price(), Some(290.0));
        assert_eq!(m.week52_high(), Some(300.0));
        assert_eq!(m.week52_low(), Some(180.0));
        assert_eq!(m.avg_daily_volume(), Some(18_500_000.0));
        assert_eq!(m.weekly_volume(), Some(30));
        assert_eq!(m.pe_ratio(), Some(45.2));
        assert_eq!(
            m.valuation_assessment(),
            ["Overvalued (P/E > 35)", "Near 52-week High"]
        );
    }

    #[test]
    fn missing_info_yields_no_record() {
        let ticker = Ticker::new("bel", ".NS").unwrap();
        assert!(derive_all_metrics(None, &[point(5, 10)], &ticker).is_none());
    }

    #[test]
    fn sparse_info_still_yields_record() {
        let ticker = Ticker::new("nh", ".NS").unwrap();
        let m = derive_all_metrics(Some(&RawQuoteInfo::default()), &[], &ticker).unwrap();
        assert_eq!(m.current_price(), None);
        assert_eq!(m.weekly_volume(), None);
        assert_eq!(m.valuation_assessment(), ["No significant alerts"]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let ticker = Ticker::new("kaynes", ".NS").unwrap();
        let info = RawQuoteInfo {
            current_price: Some(5_120.0),
            fifty_two_week_low: Some(4_900.0),
            trailing_pe: Some(12.0),
            ..Default::default()
        };
        let history = [point(5, 7), point(6, 9)];

        let a = derive_all_metrics(Some(&info), &history, &ticker);
        let b = derive_all_metrics(Some(&info), &history, &ticker);
        assert_eq!(a, b);
    }
}
