//! Machine-readable artifacts: the JSON results manifest and the summary CSV.

use crate::aggregate::SentimentSummary;
use crate::result::{AnalysisResult, SCHEMA_VERSION};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsManifest {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    pub analysis: AnalysisResult,
}

pub fn write_results_json(
    path: &Path,
    result: &AnalysisResult,
    generated_at: Option<DateTime<Utc>>,
) -> Result<()> {
    let manifest = ResultsManifest {
        schema_version: SCHEMA_VERSION,
        generated_at,
        analysis: result.clone(),
    };
    let json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize analysis results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results JSON {}", path.display()))?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    sentiment: &'a str,
    closed_trades: usize,
    mean_pnl: f64,
    median_pnl: f64,
    std_pnl: Option<f64>,
    total_pnl: f64,
    win_rate: f64,
    mean_to_std: Option<f64>,
}

pub fn write_summary_csv(path: &Path, rows: &[SentimentSummary]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create summary CSV {}", path.display()))?;
    for r in rows {
        writer
            .serialize(SummaryRow {
                sentiment: r.sentiment.label(),
                closed_trades: r.count,
                mean_pnl: r.mean,
                median_pnl: r.median,
                std_pnl: r.std,
                total_pnl: r.total_pnl,
                win_rate: r.win_rate,
                mean_to_std: r.risk_adjusted,
            })
            .context("Failed to write summary row")?;
    }
    writer.flush().context("Failed to flush summary CSV")?;
    Ok(())
}
