use nsedash_core::display::{format_count, format_ratio, format_rupees, format_volume, AlertSeverity};
use nsedash_core::metrics::DerivedMetrics;
use std::fmt::Write as _;

pub fn render_text(m: &DerivedMetrics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} Stock Analysis", m.ticker());
    let _ = writeln!(out);
    let _ = writeln!(out, "Price Information");
    let _ = writeln!(out, "  Current Price:        {}", format_rupees(m.current_price()));
    let _ = writeln!(out, "  52-Week High:         {}", format_rupees(m.week52_high()));
    let _ = writeln!(out, "  52-Week Low:          {}", format_rupees(m.week52_low()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Valuation Metrics");
    let _ = writeln!(out, "  P/E Ratio:            {}", format_ratio(m.pe_ratio()));
    let _ = writeln!(out, "  Average Daily Volume: {}", format_volume(m.avg_daily_volume()));
    let _ = writeln!(out, "  Weekly Volume:        {}", format_count(m.weekly_volume()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Valuation Alerts");
    for label in m.valuation_assessment() {
        let marker = match AlertSeverity::classify(label) {
            AlertSeverity::Warning => "[!]",
            AlertSeverity::Info => "[i]",
        };
        let _ = writeln!(out, "  {marker} {label}");
    }
    out
}
