//! SentiLab Runner — hypothesis tests, aggregation, charts, and reports.
//!
//! This crate builds on `sentilab-core` to provide:
//! - Closed-trade views over a loaded dataset
//! - The four sentiment hypothesis tests with skip-on-degenerate outcomes
//! - Descriptive aggregation (per sentiment, direction, size, trader, coin)
//! - A six-panel PNG dashboard
//! - Markdown report, JSON results manifest and CSV summary artifacts
//! - The end-to-end pipeline the CLI drives

pub mod aggregate;
pub mod charts;
pub mod config;
pub mod hypothesis;
pub mod pipeline;
pub mod reporting;
pub mod result;
pub mod views;

pub use aggregate::{compute_aggregates, Aggregates, SentimentSummary};
pub use charts::{render_dashboard, ChartData};
pub use config::{AnalysisConfig, AnalysisSettings, ChartSettings, ConfigError, OutputSettings};
pub use hypothesis::{run_hypothesis_tests, HypothesisReport, TestOutcome};
pub use pipeline::{
    analyze, run_pipeline, write_artifacts, Analysis, ArtifactKind, ArtifactReport,
    PipelineError, PipelineOutcome,
};
pub use reporting::{MarkdownReportGenerator, ResultsManifest};
pub use result::{AnalysisResult, SCHEMA_VERSION};
pub use views::TradeViews;
