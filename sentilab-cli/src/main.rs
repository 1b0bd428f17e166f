//! SentiLab CLI — sentiment vs trader performance analysis.
//!
//! Commands:
//! - `run`: load the merged CSV, run every test and write all artifacts
//! - `summary`: print the load summary, tables and test results; writes nothing

use anyhow::Result;
use clap::{Parser, Subcommand};
use sentilab_core::data::{load_merged_trades, LoadError};
use sentilab_runner::hypothesis::CorrelationDirection;
use sentilab_runner::reporting::{format_p, format_pct, format_usd};
use sentilab_runner::{analyze, run_pipeline, AnalysisConfig, AnalysisResult, TestOutcome};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "sentilab",
    about = "SentiLab CLI — market sentiment vs trader performance statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and write chart, report, results and summary files.
    Run {
        /// Merged trade/sentiment CSV.
        #[arg(long)]
        input: PathBuf,

        /// Output directory for artifacts.
        #[arg(long, default_value = "out")]
        output_dir: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Master seed for chart sampling (overrides the config).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the analysis to the console without writing files.
    Summary {
        /// Merged trade/sentiment CSV.
        #[arg(long)]
        input: PathBuf,

        /// Path to a TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            config,
            seed,
        } => run_cmd(&input, &output_dir, config.as_deref(), seed),
        Commands::Summary { input, config } => summary_cmd(&input, config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    Ok(match path {
        Some(p) => AnalysisConfig::from_file(p)?,
        None => AnalysisConfig::default(),
    })
}

fn run_cmd(input: &Path, output_dir: &Path, config: Option<&Path>, seed: Option<u64>) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    tracing::info!(
        input = %input.display(),
        output_dir = %output_dir.display(),
        seed = config.seed,
        "starting analysis"
    );

    let outcome = run_pipeline(input, output_dir, &config)?;
    match &outcome.analysis {
        Some(analysis) => print_summary(&analysis.result),
        None => print_no_usable_trades(outcome.rows_read),
    }

    println!();
    println!("--- Artifacts ---");
    for (kind, path) in &outcome.artifacts.written {
        println!("{:<8} {}", kind.to_string(), path.display());
    }

    if !outcome.artifacts.is_complete() {
        for failure in &outcome.artifacts.failed {
            eprintln!(
                "Failed to write {} ({}): {:#}",
                failure.kind,
                failure.path.display(),
                failure.error
            );
        }
        std::process::exit(1);
    }

    Ok(())
}

fn summary_cmd(input: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let dataset = match load_merged_trades(input) {
        Ok(dataset) => dataset,
        Err(LoadError::Empty { rows_read }) => {
            print_no_usable_trades(rows_read);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let analysis = analyze(&dataset, &config);
    print_summary(&analysis.result);
    Ok(())
}

fn print_no_usable_trades(rows_read: usize) {
    println!();
    println!("=== Sentiment Analysis ===");
    println!("Rows:           {rows_read} read, 0 retained");
    println!("No usable trades: every row lacked a known sentiment label or a numeric PnL.");
}

fn print_summary(result: &AnalysisResult) {
    let load = &result.load;
    println!();
    println!("=== Sentiment Analysis ===");
    println!("Fingerprint:    {}", result.fingerprint);
    println!(
        "Rows:           {} read, {} retained",
        load.rows_read, load.rows_retained
    );
    println!(
        "Dropped:        {} no sentiment, {} unknown label, {} no PnL",
        load.missing_sentiment, load.unknown_sentiment, load.missing_pnl
    );
    if let (Some(first), Some(last)) = (load.first_date, load.last_date) {
        println!(
            "Period:         {first} to {last} ({} trading days)",
            load.trading_days
        );
    }
    println!("Closed trades:  {}", result.closed_trades);

    println!();
    println!("--- By Sentiment ---");
    println!(
        "{:<14} {:>7} {:>14} {:>12} {:>9} {:>9}",
        "Sentiment", "Trades", "Total PnL", "Avg PnL", "Win Rate", "Mean/Std"
    );
    println!("{}", "-".repeat(70));
    for s in &result.aggregates.per_sentiment {
        println!(
            "{:<14} {:>7} {:>14} {:>12} {:>9} {:>9}",
            s.sentiment.label(),
            s.count,
            format_usd(s.total_pnl),
            format_usd(s.mean),
            format_pct(s.win_rate),
            s.risk_adjusted
                .map_or_else(|| "-".to_string(), |r| format!("{r:.3}"))
        );
    }

    println!();
    println!("--- By Direction ---");
    for d in &result.aggregates.by_direction {
        println!(
            "{:<14} {:<6} {:>7} {:>12} {:>9}",
            d.sentiment.label(),
            d.position_type.to_string(),
            d.count,
            format_usd(d.mean_pnl),
            format_pct(d.win_rate)
        );
    }

    let h = &result.hypotheses;
    println!();
    println!("--- Hypothesis Tests (alpha = {}) ---", h.alpha);
    match &h.sentiment_pnl {
        TestOutcome::Completed(t) => println!(
            "H1 sentiment vs PnL:      H = {:.3}, p = {}{}",
            t.kruskal.statistic,
            format_p(t.kruskal.p_value),
            marker(t.significant)
        ),
        TestOutcome::Skipped { reason } => println!("H1 sentiment vs PnL:      skipped ({reason})"),
    }
    match &h.win_rate {
        TestOutcome::Completed(t) => println!(
            "H2 sentiment vs win rate: chi2 = {:.3}, p = {}{}",
            t.contingency.statistic,
            format_p(t.contingency.p_value),
            marker(t.significant)
        ),
        TestOutcome::Skipped { reason } => println!("H2 sentiment vs win rate: skipped ({reason})"),
    }
    for c in &h.direction.comparisons {
        let label = format!("H3 long vs short {}:", c.sentiment.label());
        match &c.test {
            TestOutcome::Completed(m) => println!(
                "{label:<26}U = {:.1}, p = {}, adj p = {}{}",
                m.u_statistic,
                format_p(m.p_value),
                c.adjusted_p.map_or_else(|| "-".to_string(), format_p),
                marker(c.significant)
            ),
            TestOutcome::Skipped { reason } => println!("{label:<26}skipped ({reason})"),
        }
    }
    match &h.size_correlation {
        TestOutcome::Completed(t) => println!(
            "H4 size vs PnL:           rho = {:.4}, p = {}{}",
            t.spearman.rho,
            format_p(t.spearman.p_value),
            match t.direction {
                CorrelationDirection::Positive => " (positive)",
                CorrelationDirection::Negative => " (negative)",
                CorrelationDirection::None => "",
            }
        ),
        TestOutcome::Skipped { reason } => println!("H4 size vs PnL:           skipped ({reason})"),
    }
}

fn marker(significant: bool) -> &'static str {
    if significant {
        " *"
    } else {
        ""
    }
}
