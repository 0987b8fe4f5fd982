//! Formatted terminal output: product names, trend headline, anomaly list,
//! chart table.
//!
//! Formatting lives in one place so the engine stays free of presentation
//! concerns and the TUI and CLI render identical text.

use chrono::NaiveDate;

use crate::app::pipeline::DashboardView;
use crate::domain::{ResampledSeries, TrendSummary};
use crate::engine::TimeframeTable;

/// `iphone_16_stock` -> `Iphone 16 Stock`.
pub fn display_name(product: &str) -> String {
    product
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Thousands separators, at most two decimals, trailing zeros dropped.
pub fn format_units(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// `"↑ 1.2% from previous"` / `"↓ 3.4% from previous"`.
pub fn format_trend(trend: &TrendSummary) -> String {
    let arrow = if trend.is_up() { '↑' } else { '↓' };
    format!("{arrow} {:.1}% from previous", trend.percent_change.abs())
}

pub fn format_anomaly_count(anomalies: &[NaiveDate]) -> String {
    match anomalies.len() {
        0 => "No anomalies detected".to_string(),
        1 => "1 anomaly detected".to_string(),
        n => format!("{n} anomalies detected"),
    }
}

/// Count line followed by one date per line.
pub fn format_anomalies(anomalies: &[NaiveDate]) -> String {
    let mut out = format_anomaly_count(anomalies);
    out.push('\n');
    for d in anomalies {
        out.push_str(&format!("  {d}\n"));
    }
    out
}

/// Informational note shown when the timeframe selected nothing.
pub fn fallback_note(view: &DashboardView) -> Option<String> {
    view.fell_back
        .map(|_| format!("No data for {}; showing full series", view.timeframe_label))
}

/// Header, trend headline, anomalies and window summary for one dashboard.
pub fn format_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();

    out.push_str("=== sf - Sales Forecast ===\n");
    out.push_str(&format!("Product: {} ({})\n", display_name(&view.product), view.product));
    out.push_str(&format!("Timeframe: {}\n", view.timeframe_label));
    if let (Some(first), Some(last)) = (view.chart.grid.first(), view.chart.grid.last()) {
        out.push_str(&format!("Window: {first} .. {last} ({} days)\n", view.chart.len()));
    }
    if let Some(note) = fallback_note(view) {
        out.push_str(&format!("Note: {note}\n"));
    }

    out.push_str("\nForecast trend:\n");
    out.push_str(&format!("  {} Units\n", format_units(view.trend.latest)));
    out.push_str(&format!("  {}\n", format_trend(&view.trend)));

    out.push_str("\nAnomalies:\n");
    out.push_str(&format_anomalies(&view.anomalies));

    out
}

/// One row per grid date. Anomaly rows are marked with `*`.
pub fn format_chart_table(chart: &ResampledSeries) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<10} {:>12} {:>12} {:<7}", "date", "predicted", "actual", "anomaly").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<12} {:-<12} {:-<7}", "", "", "", "").trim_end());
    out.push('\n');

    for (i, date) in chart.grid.iter().enumerate() {
        let mark = if chart.anomaly_grid_indices.contains(&i) { "*" } else { "" };
        out.push_str(
            format!(
                "{:<10} {:>12} {:>12} {:<7}",
                date.to_string(),
                format_units(chart.predicted[i]),
                format_units(chart.actual[i]),
                mark,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

pub fn format_products(products: &[String]) -> String {
    let mut out = String::new();
    for (i, p) in products.iter().enumerate() {
        out.push_str(&format!("{:>3}  {:<28} {}\n", i + 1, truncate(p, 28), display_name(p)));
    }
    out
}

/// Active timeframe table in display order; the default is starred.
pub fn format_timeframes(table: &TimeframeTable) -> String {
    let default = table.default_token();
    let mut out = String::new();
    for entry in table.entries() {
        let mark = if entry.token == default { "*" } else { " " };
        out.push_str(&format!(
            "{mark} {:<8} {:<10} {}\n",
            entry.label,
            entry.token.as_str(),
            entry.rule
        ));
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
