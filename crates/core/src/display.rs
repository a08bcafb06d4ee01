//! Formatting shared by the dashboard and the CLI report. Runs only after derivation.

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Warning,
    Info,
}

impl AlertSeverity {
    pub fn classify(label: &str) -> Self {
        if label.contains("Overvalued") || label.contains("High") {
            Self::Warning
        } else {
            Self::Info
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

pub fn format_rupees(v: Option<f64>) -> String {
    match v {
        Some(v) => {
            let sign = if v < 0.0 { "-" } else { "" };
            let fixed = format!("{:.2}", v.abs());
            let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
            format!("{sign}₹{}.{frac}", group_thousands(int_part))
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_volume(v: Option<f64>) -> String {
    match v {
        Some(v) if v >= 0.0 => group_thousands(&format!("{:.0}", v)),
        Some(v) => format!("-{}", group_thousands(&format!("{:.0}", v.abs()))),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_count(v: Option<u64>) -> String {
    v.map(|n| group_thousands(&n.to_string()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_ratio(v: Option<f64>) -> String {
    v.map(|r| format!("{r:.2}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_use_two_decimals_and_grouping() {
        assert_eq!(format_rupees(Some(1234.5)), "₹1,234.50");
        assert_eq!(format_rupees(Some(0.0)), "₹0.00");
        assert_eq!(format_rupees(Some(999.999)), "₹1,000.00");
        assert_eq!(format_rupees(None), "N/A");
    }

    #[test]
    fn volumes_are_grouped() {
        assert_eq!(format_volume(Some(18_452_311.0)), "18,452,311");
        assert_eq!(format_count(Some(4_650)), "4,650");
        assert_eq!(format_count(Some(0)), "0");
        assert_eq!(format_count(None), "N/A");
    }

    #[test]
    fn ratio_formatting() {
        assert_eq!(format_ratio(Some(22.456)), "22.46");
        assert_eq!(format_ratio(None), "N/A");
    }

    #[test]
    fn overvalued_and_high_labels_are_warnings() {
        assert_eq!(AlertSeverity::classify("Overvalued (P/E > 35)"), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::classify("Near 52-week High"), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::classify("Near 52-week Low"), AlertSeverity::Info);
        assert_eq!(AlertSeverity::classify("Undervalued (P/E < 15)"), AlertSeverity::Info);
        assert_eq!(AlertSeverity::classify("No significant alerts"), AlertSeverity::Info);
    }
}
