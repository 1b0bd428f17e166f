//! End-to-end analysis run: load, test, aggregate, render, write.
//!
//! [`analyze`] is pure and returns everything the artifacts need.
//! [`run_pipeline`] adds the file I/O. Each artifact is written on its own, so
//! a failure in one (say, an unwritable PNG path) does not stop the others.

use crate::aggregate::compute_aggregates;
use crate::charts::{render_dashboard, write_png, ChartData};
use crate::config::AnalysisConfig;
use crate::hypothesis::run_hypothesis_tests;
use crate::reporting::markdown::empty_report;
use crate::reporting::{write_results_json, write_summary_csv, MarkdownReportGenerator};
use crate::result::AnalysisResult;
use crate::views::TradeViews;
use anyhow::Context;
use chrono::Utc;
use sentilab_core::data::{load_merged_trades, LoadError, LoadedDataset};
use sentilab_core::rng::RngHierarchy;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Computed results plus the chart inputs derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: AnalysisResult,
    pub charts: ChartData,
}

/// Run every test and aggregation over an already loaded dataset.
pub fn analyze(dataset: &LoadedDataset, config: &AnalysisConfig) -> Analysis {
    let policy = config.closed_trade_policy();
    let views = TradeViews::new(&dataset.trades, policy);
    tracing::info!(
        retained = dataset.trades.len(),
        closed = views.closed.len(),
        ?policy,
        "selected closed trades"
    );

    let hypotheses = run_hypothesis_tests(&views, config.analysis.alpha);
    let aggregates = compute_aggregates(&views, &config.analysis);
    let rng = RngHierarchy::new(config.seed);
    let charts = ChartData::collect(&views, &aggregates, &config.charts, &rng);

    Analysis {
        result: AnalysisResult {
            fingerprint: dataset.fingerprint.clone(),
            seed: config.seed,
            policy,
            load: dataset.summary.clone(),
            closed_trades: views.closed.len(),
            hypotheses,
            aggregates,
        },
        charts,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Chart,
    Report,
    Results,
    Summary,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactKind::Chart => "chart",
            ArtifactKind::Report => "report",
            ArtifactKind::Results => "results",
            ArtifactKind::Summary => "summary",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct ArtifactFailure {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Which artifacts made it to disk.
#[derive(Debug, Default)]
pub struct ArtifactReport {
    pub written: Vec<(ArtifactKind, PathBuf)>,
    pub failed: Vec<ArtifactFailure>,
}

impl ArtifactReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn path_of(&self, kind: ArtifactKind) -> Option<&Path> {
        self.written
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, p)| p.as_path())
    }

    fn record(&mut self, kind: ArtifactKind, path: PathBuf, outcome: anyhow::Result<()>) {
        match outcome {
            Ok(()) => {
                tracing::info!(artifact = %kind, path = %path.display(), "wrote artifact");
                self.written.push((kind, path));
            }
            Err(error) => {
                tracing::error!(artifact = %kind, path = %path.display(), "{error:#}");
                self.failed.push(ArtifactFailure { kind, path, error });
            }
        }
    }
}

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// `None` when no trade survived filtering; only the report is written then.
    pub analysis: Option<Analysis>,
    pub rows_read: usize,
    pub artifacts: ArtifactReport,
}

/// Load `input`, analyse it and write all four artifacts into `output_dir`.
///
/// Load failures abort before anything is written, except an empty filtered
/// dataset: that run succeeds with a short report saying no usable trades
/// remained. Artifact failures are collected in the returned [`ArtifactReport`].
pub fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    config: &AnalysisConfig,
) -> Result<PipelineOutcome, PipelineError> {
    let dataset = match load_merged_trades(input) {
        Ok(dataset) => dataset,
        Err(LoadError::Empty { rows_read }) => {
            tracing::warn!(rows_read, "no usable trades after filtering, analysis skipped");
            create_output_dir(output_dir)?;
            let mut artifacts = ArtifactReport::default();
            let report_path = output_dir.join(&config.output.report_file);
            let written = std::fs::write(&report_path, empty_report(rows_read))
                .with_context(|| format!("Failed to write report {}", report_path.display()));
            artifacts.record(ArtifactKind::Report, report_path, written);
            return Ok(PipelineOutcome {
                analysis: None,
                rows_read,
                artifacts,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let analysis = analyze(&dataset, config);
    create_output_dir(output_dir)?;
    let artifacts = write_artifacts(&analysis, output_dir, config);

    Ok(PipelineOutcome {
        rows_read: dataset.summary.rows_read,
        analysis: Some(analysis),
        artifacts,
    })
}

fn create_output_dir(output_dir: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(output_dir).map_err(|source| PipelineError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })
}

/// Write chart, report, results JSON and summary CSV into an existing directory.
pub fn write_artifacts(
    analysis: &Analysis,
    output_dir: &Path,
    config: &AnalysisConfig,
) -> ArtifactReport {
    let out = &config.output;
    let generated_at = out.timestamp.then(Utc::now);
    let mut report = ArtifactReport::default();

    let chart_path = output_dir.join(&out.chart_file);
    let chart = write_png(&render_dashboard(&analysis.charts, &config.charts), &chart_path);
    let chart_ok = chart.is_ok();
    report.record(ArtifactKind::Chart, chart_path, chart);

    let report_path = output_dir.join(&out.report_file);
    let markdown = MarkdownReportGenerator {
        chart_file: chart_ok.then(|| out.chart_file.clone()),
        generated_at,
    }
    .generate(&analysis.result);
    let written = std::fs::write(&report_path, markdown)
        .with_context(|| format!("Failed to write report {}", report_path.display()));
    report.record(ArtifactKind::Report, report_path, written);

    let results_path = output_dir.join(&out.results_file);
    let written = write_results_json(&results_path, &analysis.result, generated_at);
    report.record(ArtifactKind::Results, results_path, written);

    let summary_path = output_dir.join(&out.summary_file);
    let written = write_summary_csv(&summary_path, &analysis.result.aggregates.per_sentiment);
    report.record(ArtifactKind::Summary, summary_path, written);

    report
}
