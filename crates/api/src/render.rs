use nsedash_core::display::{format_count, format_ratio, format_rupees, format_volume, AlertSeverity};
use nsedash_core::metrics::DerivedMetrics;
use std::fmt::Write as _;

pub enum Analysis<'a> {
    Loaded(&'a DerivedMetrics),
    Failed,
}

const STYLE: &str = "body{font-family:sans-serif;margin:0;display:flex}\
aside{width:16rem;padding:1rem;background:#f3f4f6;min-height:100vh}\
main{padding:1rem 2rem;flex:1}\
.metrics{display:flex;gap:2rem}\
.metric .label{color:#6b7280;font-size:.9rem}.metric .value{font-size:1.6rem}\
.alert{padding:.5rem 1rem;margin:.25rem 0;border-radius:.25rem}\
.alert.warning{background:#fee2e2;color:#991b1b}.alert.info{background:#dcfce7;color:#166534}\
.error{background:#fee2e2;color:#991b1b;padding:.75rem 1rem}";

pub fn render_page(symbols: &[String], selected: &str, analysis: &Analysis<'_>) -> String {
    let mut options = String::new();
    for s in symbols {
        let sel = if s == selected { " selected" } else { "" };
        let _ = write!(options, "<option value=\"{0}\"{sel}>{0}</option>", escape(s));
    }

    let body = match analysis {
        Analysis::Loaded(m) => render_results(m),
        Analysis::Failed => format!(
            "<div class=\"error\">Could not retrieve data for {}</div>",
            escape(selected)
        ),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>NSE Stock Analyzer</title><style>{STYLE}</style></head><body>\
<aside><h2>Select Stock</h2><form method=\"get\" action=\"/\">\
<label for=\"symbol\">Choose a stock symbol:</label> \
<select id=\"symbol\" name=\"symbol\" onchange=\"this.form.submit()\">{options}</select>\
<noscript><button type=\"submit\">Analyze</button></noscript></form></aside>\
<main><h1>NSE Stock Analyzer</h1><h3>Selected Stock: {selected}</h3>{body}</main>\
</body></html>",
        selected = escape(selected),
    )
}

pub fn render_not_found(symbol: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>NSE Stock Analyzer</title></head><body>\
<p class=\"error\">Unknown symbol {}. <a href=\"/\">Back</a></p></body></html>",
        escape(symbol)
    )
}

fn render_results(m: &DerivedMetrics) -> String {
    let mut alerts = String::new();
    for label in m.valuation_assessment() {
        let _ = write!(
            alerts,
            "<div class=\"alert {}\">• {}</div>",
            AlertSeverity::classify(label).as_str(),
            escape(label)
        );
    }

    format!(
        "<h2>{ticker} Stock Analysis</h2>\
<h3>Price Information</h3><div class=\"metrics\">{current}{high}{low}</div>\
<h3>Valuation Metrics</h3>\
<p><strong>P/E Ratio:</strong> {pe}</p>\
<p><strong>Average Daily Volume:</strong> {avg}</p>\
<p><strong>Weekly Volume:</strong> {weekly}</p>\
<h3>Valuation Alerts</h3>{alerts}",
        ticker = escape(m.ticker()),
        current = metric("Current Price", &format_rupees(m.current_price())),
        high = metric("52-Week High", &format_rupees(m.week52_high())),
        low = metric("52-Week Low", &format_rupees(m.week52_low())),
        pe = format_ratio(m.pe_ratio()),
        avg = format_volume(m.avg_daily_volume()),
        weekly = format_count(m.weekly_volume()),
    )
}

fn metric(label: &str, value: &str) -> String {
    format!(
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        escape(label),
        escape(value)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
