//! Report and artifact export.

pub mod export;
pub mod markdown;

pub use export::{write_results_json, write_summary_csv, ResultsManifest};
pub use markdown::MarkdownReportGenerator;

/// `-1234.5` → `"-$1,234.50"`
pub fn format_usd(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Fraction as a percentage with one decimal: `0.892` → `"89.2%"`.
pub fn format_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// p-values below 1e-6 are shown as a bound.
pub fn format_p(p: f64) -> String {
    if p < 1e-6 {
        "< 0.000001".to_string()
    } else {
        format!("{p:.6}")
    }
}
