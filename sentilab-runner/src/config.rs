//! Analysis configuration, loaded from TOML.
//!
//! Every field has a default, so a missing file or an empty table yields the
//! stock analysis:
//!
//! ```toml
//! seed = 42
//!
//! [analysis]
//! alpha = 0.05
//! include_zero_pnl = false
//!
//! [charts]
//! scatter_sample = 5000
//! ```

use sentilab_core::domain::{ClosedTradePolicy, SizeThresholds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Master seed for every sampled quantity (scatter sub-sample).
    pub seed: u64,
    pub analysis: AnalysisSettings,
    pub charts: ChartSettings,
    pub output: OutputSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            analysis: AnalysisSettings::default(),
            charts: ChartSettings::default(),
            output: OutputSettings::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let a = &self.analysis;
        if !(a.alpha > 0.0 && a.alpha < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "analysis.alpha must be in (0, 1), got {}",
                a.alpha
            )));
        }
        let t = &a.size_thresholds;
        if !(0.0 < t.medium && t.medium < t.large && t.large < t.very_large) {
            return Err(ConfigError::Invalid(format!(
                "size thresholds must be positive and increasing, got {} / {} / {}",
                t.medium, t.large, t.very_large
            )));
        }
        let c = &self.charts;
        if c.width < 600 || c.height < 400 {
            return Err(ConfigError::Invalid(format!(
                "chart canvas must be at least 600x400, got {}x{}",
                c.width, c.height
            )));
        }
        if c.pnl_display_limit <= 0.0 || c.scatter_pnl_limit <= 0.0 || c.scatter_size_max <= 0.0 {
            return Err(ConfigError::Invalid(
                "chart display limits must be positive".into(),
            ));
        }
        if c.violin_bins < 2 {
            return Err(ConfigError::Invalid("charts.violin_bins must be >= 2".into()));
        }
        Ok(())
    }

    pub fn closed_trade_policy(&self) -> ClosedTradePolicy {
        ClosedTradePolicy::from_include_zero(self.analysis.include_zero_pnl)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Significance level for every test.
    pub alpha: f64,
    /// Count break-even trades as closed.
    pub include_zero_pnl: bool,
    /// Accounts ranked by total PnL that form the "top traders" group.
    pub top_traders: usize,
    /// Minimum trades for a coin × sentiment cell to be reported.
    pub min_trades_per_cell: usize,
    /// Coins listed in the sentiment-dependency table.
    pub top_coins: usize,
    pub size_thresholds: SizeThresholds,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            include_zero_pnl: false,
            top_traders: 3,
            min_trades_per_cell: 10,
            top_coins: 10,
            size_thresholds: SizeThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    /// Violin values are clipped to ±this.
    pub pnl_display_limit: f64,
    pub scatter_sample: usize,
    pub scatter_size_max: f64,
    pub scatter_pnl_limit: f64,
    pub violin_bins: usize,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1080,
            pnl_display_limit: 1000.0,
            scatter_sample: 5000,
            scatter_size_max: 20_000.0,
            scatter_pnl_limit: 2000.0,
            violin_bins: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub chart_file: String,
    pub report_file: String,
    pub results_file: String,
    pub summary_file: String,
    /// Stamp the report and the results manifest with the wall-clock time.
    /// Off by default so reruns on the same input give identical files.
    pub timestamp: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            chart_file: "sentiment_analysis_visualizations.png".into(),
            report_file: "sentiment_trading_report.md".into(),
            results_file: "analysis_results.json".into(),
            summary_file: "sentiment_summary.csv".into(),
            timestamp: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = AnalysisConfig::from_toml("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.seed, 42);
        assert_eq!(config.closed_trade_policy(), ClosedTradePolicy::ExcludeZeroPnl);
        assert!(!config.output.timestamp);
    }

    #[test]
    fn partial_override() {
        let config = AnalysisConfig::from_toml(
            r#"
seed = 7

[analysis]
alpha = 0.01
include_zero_pnl = true

[analysis.size_thresholds]
medium = 250.0

[charts]
scatter_sample = 100
"#,
        )
        .unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.analysis.alpha, 0.01);
        assert_eq!(config.closed_trade_policy(), ClosedTradePolicy::IncludeZeroPnl);
        assert_eq!(config.analysis.size_thresholds.medium, 250.0);
        assert_eq!(config.analysis.size_thresholds.large, 2000.0);
        assert_eq!(config.charts.scatter_sample, 100);
        assert_eq!(config.charts.width, 1800);
        assert_eq!(config.output.report_file, "sentiment_trading_report.md");
    }

    #[test]
    fn rejects_bad_alpha() {
        let err = AnalysisConfig::from_toml("[analysis]\nalpha = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unordered_thresholds() {
        let err = AnalysisConfig::from_toml(
            "[analysis.size_thresholds]\nmedium = 5000.0\nlarge = 2000.0\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("increasing"));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = AnalysisConfig::from_toml("seed = \"abc\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AnalysisConfig::from_file(Path::new("/nonexistent/sentilab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
