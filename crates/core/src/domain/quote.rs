use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quote and fundamentals fields as reported by the data provider.
///
/// Every field is optional: delisted or illiquid instruments routinely omit some of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuoteInfo {
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub regular_market_previous_close: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default)]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default)]
    pub average_volume: Option<f64>,
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryPoint {
    pub timestamp: DateTime<Utc>,
    pub volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_provider_field_names_with_gaps() {
        let v = json!({
            "currentPrice": 101.5,
            "fiftyTwoWeekLow": 80.0,
            "trailingPE": 22.4,
            "averageVolume": null
        });

        let info: RawQuoteInfo = serde_json::from_value(v).unwrap();
        assert_eq!(info.current_price, Some(101.5));
        assert_eq!(info.fifty_two_week_low, Some(80.0));
        assert_eq!(info.trailing_pe, Some(22.4));
        assert_eq!(info.average_volume, None);
        assert_eq!(info.regular_market_previous_close, None);
        assert_eq!(info.fifty_two_week_high, None);
    }
}
