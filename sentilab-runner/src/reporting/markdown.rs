//! Markdown analysis report.
//!
//! The prose is fixed; every number comes from the [`AnalysisResult`]. A test
//! that was skipped renders as "not evaluated" together with its reason.

use super::{format_p, format_pct, format_usd};
use crate::aggregate::Aggregates;
use crate::hypothesis::{CorrelationDirection, HypothesisReport, TestOutcome};
use crate::result::AnalysisResult;
use chrono::{DateTime, Utc};
use sentilab_core::domain::{ClosedTradePolicy, PositionType, Sentiment, SizeBucket};
use sentilab_core::stats::MwuMethod;

pub struct MarkdownReportGenerator {
    /// Relative path of the dashboard image, embedded in the results section.
    pub chart_file: Option<String>,
    /// Shown in the title when set.
    pub generated_at: Option<DateTime<Utc>>,
}

impl MarkdownReportGenerator {
    pub fn generate(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();
        self.title(&mut out, result);
        executive_summary(&mut out, result);
        methodology(&mut out, result);
        self.statistical_results(&mut out, &result.hypotheses);
        insights(&mut out, &result.aggregates);
        strategies(&mut out, &result.aggregates);
        risks(&mut out);
        conclusions(&mut out, result);
        appendix(&mut out, result);
        out
    }

    fn title(&self, out: &mut String, result: &AnalysisResult) {
        out.push_str(
            "# Market Sentiment & Trader Performance Analysis\n\n\
*Data-driven trading strategy recommendations*\n\n",
        );
        if let Some(at) = self.generated_at {
            out.push_str(&format!("Analysis date: {}  \n", at.format("%B %d, %Y")));
        }
        out.push_str(&format!("Input fingerprint: `{}`\n\n", result.fingerprint));
    }

    fn statistical_results(&self, out: &mut String, h: &HypothesisReport) {
        out.push_str("## 2. Statistical Analysis Results\n\n");
        if let Some(chart) = &self.chart_file {
            out.push_str(&format!("![Sentiment analysis dashboard]({chart})\n\n"));
        }

        out.push_str("### H1: Market sentiment affects trader PnL\n\n");
        match &h.sentiment_pnl {
            TestOutcome::Completed(t) => {
                out.push_str(&format!(
                    "**{}** (Kruskal-Wallis H = {:.2}, df = {}, p = {})\n\n",
                    verdict(t.significant),
                    t.kruskal.statistic,
                    t.kruskal.df,
                    format_p(t.kruskal.p_value)
                ));
                if t.significant {
                    out.push_str(
                        "The distribution of closed PnL differs between sentiment regimes.\n",
                    );
                } else {
                    out.push_str("No clear relationship between sentiment regime and closed PnL.\n");
                }
                if !t.excluded.is_empty() {
                    out.push_str(&format!(
                        "\nLabels without closed trades were left out: {}.\n",
                        join(t.excluded.iter().map(|s| s.label()))
                    ));
                }
            }
            TestOutcome::Skipped { reason } => not_evaluated(out, reason),
        }
        out.push('\n');

        out.push_str("### H2: Win rates differ by sentiment\n\n");
        match &h.win_rate {
            TestOutcome::Completed(t) => {
                out.push_str(&format!(
                    "**{}** (Chi-square = {:.2}, df = {}, p = {}{})\n\n",
                    verdict(t.significant),
                    t.contingency.statistic,
                    t.contingency.dof,
                    format_p(t.contingency.p_value),
                    if t.contingency.yates_corrected {
                        ", Yates-corrected"
                    } else {
                        ""
                    }
                ));
                out.push_str(&format!("| Sentiment | {} | Win rate |\n", t.outcomes.join(" | ")));
                out.push_str(&format!("|-----------|{}----------|\n", "------|".repeat(t.outcomes.len())));
                let win_col = t.outcomes.iter().position(|o| o == "win");
                for (s, row) in t.sentiments.iter().zip(&t.observed) {
                    let total: u64 = row.iter().sum();
                    let wins = win_col.map_or(0, |j| row[j]);
                    let cells: Vec<String> = row.iter().map(u64::to_string).collect();
                    out.push_str(&format!(
                        "| {} | {} | {} |\n",
                        s,
                        cells.join(" | "),
                        format_pct(wins as f64 / total as f64)
                    ));
                }
            }
            TestOutcome::Skipped { reason } => not_evaluated(out, reason),
        }
        out.push('\n');

        out.push_str("### H3: Long and short positions perform differently by sentiment\n\n");
        out.push_str(
            "| Sentiment | Long n | Long avg | Short n | Short avg | U | p | BH-adjusted p | Method |\n\
|-----------|--------|----------|---------|-----------|---|---|---------------|--------|\n",
        );
        for c in &h.direction.comparisons {
            let avg = |m: Option<f64>| m.map_or_else(|| "-".to_string(), format_usd);
            match &c.test {
                TestOutcome::Completed(m) => {
                    out.push_str(&format!(
                        "| {} | {} | {} | {} | {} | {:.1} | {} | {} | {} |\n",
                        c.sentiment,
                        c.long_count,
                        avg(c.long_mean),
                        c.short_count,
                        avg(c.short_mean),
                        m.u_statistic,
                        format_p(m.p_value),
                        c.adjusted_p.map_or_else(|| "-".to_string(), format_p),
                        match m.method {
                            MwuMethod::Exact => "exact",
                            MwuMethod::Asymptotic => "normal approx.",
                        }
                    ));
                }
                TestOutcome::Skipped { reason } => {
                    out.push_str(&format!(
                        "| {} | {} | {} | {} | {} | not evaluated ({}) | | | |\n",
                        c.sentiment,
                        c.long_count,
                        avg(c.long_mean),
                        c.short_count,
                        avg(c.short_mean),
                        reason
                    ));
                }
            }
        }
        let adjusted = h
            .direction
            .completed()
            .filter(|c| c.adjusted_p.is_some_and(|p| p < h.alpha))
            .count();
        out.push_str(&format!(
            "\n{} of {} evaluated comparisons are significant at alpha = {} \
({} after Benjamini-Hochberg correction).\n\n",
            h.direction.significant_count(),
            h.direction.completed().count(),
            h.alpha,
            adjusted
        ));

        out.push_str("### H4: Trade size correlates with profitability\n\n");
        match &h.size_correlation {
            TestOutcome::Completed(t) => {
                out.push_str(&format!(
                    "**{}** (Spearman rho = {:.4}, p = {}, n = {})\n\n",
                    verdict(t.significant),
                    t.spearman.rho,
                    format_p(t.spearman.p_value),
                    t.spearman.n
                ));
                out.push_str(match t.direction {
                    CorrelationDirection::Positive => {
                        "Larger trades tend to be more profitable.\n"
                    }
                    CorrelationDirection::Negative => {
                        "Larger trades tend to be less profitable.\n"
                    }
                    CorrelationDirection::None => {
                        "Trade size does not correlate with profitability.\n"
                    }
                });
            }
            TestOutcome::Skipped { reason } => not_evaluated(out, reason),
        }
        out.push('\n');
    }
}

/// Report for a run in which no trade survived filtering.
pub fn empty_report(rows_read: usize) -> String {
    format!(
        "# Market Sentiment & Trader Performance Analysis\n\n\
## No usable trades\n\n\
{rows_read} rows were read, but none had both a recognised sentiment label \
and a numeric PnL. No statistical tests were run.\n"
    )
}

fn verdict(significant: bool) -> &'static str {
    if significant {
        "CONFIRMED"
    } else {
        "NOT CONFIRMED"
    }
}

fn not_evaluated(out: &mut String, reason: &str) {
    out.push_str(&format!("**NOT EVALUATED**: {reason}\n"));
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

fn executive_summary(out: &mut String, result: &AnalysisResult) {
    let load = &result.load;
    let agg = &result.aggregates;
    let h = &result.hypotheses;

    out.push_str("## Executive Summary\n\n");
    out.push_str(&format!(
        "This analysis examines the relationship between market sentiment and trader \
performance using {} trades across {} trading days",
        load.rows_retained, load.trading_days
    ));
    if let (Some(first), Some(last)) = (load.first_date, load.last_date) {
        out.push_str(&format!(" ({first} to {last})"));
    }
    match (load.accounts, load.coins) {
        (Some(a), Some(c)) => {
            out.push_str(&format!(" from {a} accounts trading {c} instruments"));
        }
        (Some(a), None) => {
            out.push_str(&format!(" from {a} accounts"));
        }
        (None, Some(c)) => {
            out.push_str(&format!(" over {c} instruments"));
        }
        (None, None) => {}
    }
    out.push_str(".\n\n### Key Findings\n\n");

    match &h.sentiment_pnl {
        TestOutcome::Completed(t) => {
            out.push_str(&format!(
                "- Market sentiment {} trader profitability (p = {})\n",
                if t.significant {
                    "significantly affects"
                } else {
                    "does not significantly affect"
                },
                format_p(t.kruskal.p_value)
            ));
        }
        TestOutcome::Skipped { reason } => {
            out.push_str(&format!("- Sentiment effect on PnL: not evaluated ({reason})\n"));
        }
    }

    if let Some(best) = agg
        .per_sentiment
        .iter()
        .filter(|s| s.risk_adjusted.is_some())
        .max_by(|a, b| a.risk_adjusted.unwrap_or(0.0).total_cmp(&b.risk_adjusted.unwrap_or(0.0)))
    {
        out.push_str(&format!(
            "- {} presents the best risk-adjusted returns (mean/std: {:.3}, win rate: {})\n",
            best.sentiment,
            best.risk_adjusted.unwrap_or(0.0),
            format_pct(best.win_rate)
        ));
    }

    if let Some((sentiment, better, worse, long_better)) = widest_direction_gap(agg) {
        let (winner, loser) = if long_better { ("long", "short") } else { ("short", "long") };
        out.push_str(&format!(
            "- During {sentiment}, {winner} positions average {} per trade against {} for {loser}\n",
            format_usd(better),
            format_usd(worse)
        ));
    }

    match &h.size_correlation {
        TestOutcome::Completed(t) => {
            out.push_str(&format!(
                "- Trade size vs profitability: Spearman rho = {:.2} (p = {}){}\n",
                t.spearman.rho,
                format_p(t.spearman.p_value),
                match t.direction {
                    CorrelationDirection::Positive => ", larger trades earn more",
                    CorrelationDirection::Negative => ", larger trades earn less",
                    CorrelationDirection::None => ", no significant relationship",
                }
            ));
        }
        TestOutcome::Skipped { reason } => {
            out.push_str(&format!("- Trade size vs profitability: not evaluated ({reason})\n"));
        }
    }

    if let Some(top) = agg.coin_dependency.as_ref().and_then(|c| c.first()) {
        out.push_str(&format!(
            "- Coin-specific sentiment dependence is strongest for {} ({} PnL range between {} and {})\n",
            top.coin,
            format_usd(top.range),
            top.best.sentiment,
            top.worst.sentiment
        ));
    }

    out.push_str("\n### Total Profitability by Sentiment\n\n");
    out.push_str("| Sentiment | Closed trades | Total PnL | Avg PnL | Win rate |\n");
    out.push_str("|-----------|---------------|-----------|---------|----------|\n");
    for s in &agg.per_sentiment {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            s.sentiment,
            s.count,
            format_usd(s.total_pnl),
            format_usd(s.mean),
            format_pct(s.win_rate)
        ));
    }
    out.push('\n');
}

/// (sentiment, better mean, worse mean, long is better) with the largest gap.
fn widest_direction_gap(agg: &Aggregates) -> Option<(Sentiment, f64, f64, bool)> {
    Sentiment::ALL
        .into_iter()
        .filter_map(|s| {
            let long = agg.direction_for(s, PositionType::Long)?.mean_pnl;
            let short = agg.direction_for(s, PositionType::Short)?.mean_pnl;
            Some((s, long, short))
        })
        .max_by(|a, b| (a.1 - a.2).abs().total_cmp(&(b.1 - b.2).abs()))
        .map(|(s, long, short)| {
            if long >= short {
                (s, long, short, true)
            } else {
                (s, short, long, false)
            }
        })
}

fn methodology(out: &mut String, result: &AnalysisResult) {
    let load = &result.load;
    out.push_str("## 1. Methodology\n\n### 1.1 Data Overview\n\n");
    out.push_str(&format!("- Rows read: {}\n", load.rows_read));
    out.push_str(&format!("- Rows retained (known sentiment, numeric PnL): {}\n", load.rows_retained));
    out.push_str(&format!(
        "- Dropped: {} without sentiment, {} with an unrecognized label, {} without PnL\n",
        load.missing_sentiment, load.unknown_sentiment, load.missing_pnl
    ));
    if let (Some(first), Some(last)) = (load.first_date, load.last_date) {
        out.push_str(&format!("- Period: {first} to {last} ({} trading days)\n", load.trading_days));
    }
    if let Some(a) = load.accounts {
        out.push_str(&format!("- Accounts: {a}\n"));
    }
    if let Some(c) = load.coins {
        out.push_str(&format!("- Instruments: {c}\n"));
    }
    out.push_str(&format!(
        "- Closed trades analysed: {} ({})\n",
        result.closed_trades,
        match result.policy {
            ClosedTradePolicy::ExcludeZeroPnl => "a PnL of exactly zero counts as not closed",
            ClosedTradePolicy::IncludeZeroPnl => "break-even trades are counted as closed",
        }
    ));

    out.push_str(&format!(
        "\n### 1.2 Statistical Methods\n\n\
1. Kruskal-Wallis H-test: rank-based comparison of PnL across the five sentiment labels\n\
2. Chi-square test of independence: win/loss counts against sentiment\n\
3. Mann-Whitney U test: long vs short PnL within each sentiment, Benjamini-Hochberg adjusted\n\
4. Spearman rank correlation: trade size against PnL\n\n\
Significance level: alpha = {}\n\n",
        result.hypotheses.alpha
    ));
}

fn insights(out: &mut String, agg: &Aggregates) {
    out.push_str("## 3. Key Insights\n\n### 3.1 Direction by Sentiment\n\n");
    out.push_str("| Sentiment | Side | Trades | Avg PnL | Win rate |\n");
    out.push_str("|-----------|------|--------|---------|----------|\n");
    for d in &agg.by_direction {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            d.sentiment,
            d.position_type,
            d.count,
            format_usd(d.mean_pnl),
            format_pct(d.win_rate)
        ));
    }
    if let Some((sentiment, better, worse, long_better)) = widest_direction_gap(agg) {
        out.push_str(&format!(
            "\nThe widest gap between sides occurs during {sentiment}: {} positions average {} \
against {}.\n",
            if long_better { "long" } else { "short" },
            format_usd(better),
            format_usd(worse)
        ));
    }
    out.push('\n');

    out.push_str("### 3.2 Top Trader Behavior\n\n");
    match &agg.top_traders {
        Some(top) if !top.top_accounts.is_empty() => {
            let names: Vec<String> = top
                .top_accounts
                .iter()
                .map(|t| format!("`{}` ({})", t.account, format_usd(t.total_pnl)))
                .collect();
            out.push_str(&format!("Top accounts by total PnL: {}.\n\n", names.join(", ")));
            out.push_str("| Sentiment | Top avg PnL | Top trades | Others avg PnL | Other trades |\n");
            out.push_str("|-----------|-------------|------------|----------------|--------------|\n");
            for r in &top.rows {
                let avg = |m: Option<f64>| m.map_or_else(|| "-".to_string(), format_usd);
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    r.sentiment,
                    avg(r.top_mean),
                    r.top_count,
                    avg(r.others_mean),
                    r.others_count
                ));
            }
        }
        _ => out.push_str("Not available: the input has no account column.\n"),
    }
    out.push('\n');

    out.push_str("### 3.3 Coin-Specific Sentiment Dependencies\n\n");
    match &agg.coin_dependency {
        Some(deps) if !deps.is_empty() => {
            out.push_str("| Coin | Best sentiment | Best avg | Worst sentiment | Worst avg | Range |\n");
            out.push_str("|------|----------------|----------|-----------------|-----------|-------|\n");
            for d in deps {
                out.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} |\n",
                    d.coin,
                    d.best.sentiment,
                    format_usd(d.best.mean_pnl),
                    d.worst.sentiment,
                    format_usd(d.worst.mean_pnl),
                    format_usd(d.range)
                ));
            }
        }
        Some(_) => out.push_str("No coin has enough trades in two or more sentiment regimes.\n"),
        None => out.push_str("Not available: the input has no coin column.\n"),
    }
    out.push('\n');

    out.push_str("### 3.4 Position Size\n\n");
    let header: Vec<&str> = Sentiment::ALL.iter().map(|s| s.label()).collect();
    out.push_str(&format!("| Size | {} |\n", header.join(" | ")));
    out.push_str(&format!("|------|{}\n", "------|".repeat(header.len())));
    for bucket in SizeBucket::ALL {
        let cells: Vec<String> = Sentiment::ALL
            .iter()
            .map(|s| {
                agg.by_size
                    .iter()
                    .find(|c| c.bucket == bucket && c.sentiment == *s)
                    .map_or_else(|| "-".to_string(), |c| format_usd(c.mean_pnl))
            })
            .collect();
        let range = agg
            .by_size
            .iter()
            .find(|c| c.bucket == bucket)
            .map(|c| format!(" ({})", c.range))
            .unwrap_or_default();
        out.push_str(&format!("| {}{} | {} |\n", bucket, range, cells.join(" | ")));
    }
    out.push('\n');

    out.push_str("### 3.5 Risk-Adjusted Returns\n\n");
    let mut ranked: Vec<_> = agg
        .per_sentiment
        .iter()
        .filter_map(|s| s.risk_adjusted.map(|r| (s.sentiment, r)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    if ranked.is_empty() {
        out.push_str("Not available: no sentiment has two or more closed trades with varying PnL.\n");
    }
    for (i, (s, r)) in ranked.iter().enumerate() {
        out.push_str(&format!("{}. {}: {:.3}\n", i + 1, s, r));
    }
    out.push('\n');
}

fn strategies(out: &mut String, agg: &Aggregates) {
    out.push_str("## 4. Strategy Recommendations\n\n");
    out.push_str("These rules summarise what worked in the sample; they are not forecasts.\n\n");

    out.push_str("### Strategy 1: Sentiment-Adaptive Direction\n\n");
    let mut any = false;
    for s in Sentiment::ALL {
        let (Some(long), Some(short)) = (
            agg.direction_for(s, PositionType::Long),
            agg.direction_for(s, PositionType::Short),
        ) else {
            continue;
        };
        any = true;
        let (side, better, worse) = if long.mean_pnl >= short.mean_pnl {
            ("long", long, short)
        } else {
            ("short", short, long)
        };
        out.push_str(&format!(
            "- {s}: favour {side} positions ({} avg, {} win rate vs {} avg)\n",
            format_usd(better.mean_pnl),
            format_pct(better.win_rate),
            format_usd(worse.mean_pnl)
        ));
    }
    if !any {
        out.push_str("- Not enough long and short trades under the same sentiment to compare.\n");
    }

    out.push_str("\n### Strategy 2: Coin-Specific Sentiment Timing\n\n");
    match agg.coin_dependency.as_deref() {
        Some(deps) if !deps.is_empty() => {
            for d in deps.iter().take(5) {
                out.push_str(&format!(
                    "- {}: trade during {} ({} avg), avoid {} ({} avg)\n",
                    d.coin,
                    d.best.sentiment,
                    format_usd(d.best.mean_pnl),
                    d.worst.sentiment,
                    format_usd(d.worst.mean_pnl)
                ));
            }
        }
        _ => out.push_str("- No coin-level evidence available.\n"),
    }

    out.push_str("\n### Strategy 3: Adaptive Position Sizing\n\n");
    let mut sized = false;
    for s in Sentiment::ALL {
        if let Some(best) = agg
            .by_size
            .iter()
            .filter(|c| c.sentiment == s)
            .max_by(|a, b| a.mean_pnl.total_cmp(&b.mean_pnl))
        {
            sized = true;
            out.push_str(&format!(
                "- {s}: {} trades ({}) had the best average PnL ({}, {} trades)\n",
                best.bucket,
                best.range,
                format_usd(best.mean_pnl),
                best.count
            ));
        }
    }
    if !sized {
        out.push_str("- No trade sizes recorded.\n");
    }
    out.push('\n');
}

fn risks(out: &mut String) {
    out.push_str(
        "## 5. Risk Considerations\n\n\
1. Historical performance: the sample covers one market cycle and may not repeat.\n\
2. Sample bias: results depend on the accounts present in the data and their skill.\n\
3. Sentiment lag: a daily index is published after the fact and trails intraday mood.\n\
4. Execution: fees, slippage and partial fills are not modelled.\n\
5. Liquidity: very large positions may not be achievable in every instrument.\n\
6. Overfitting: coin-level rules rest on few trades per cell and need out-of-sample validation.\n\n\
Recommended risk management:\n\n\
- Cap the risk on any single trade to a small fraction of capital\n\
- Use stop-losses regardless of sentiment\n\
- Diversify across instruments\n\
- Validate every rule on data it was not derived from before deployment\n\n",
    );
}

fn conclusions(out: &mut String, result: &AnalysisResult) {
    let h = &result.hypotheses;
    out.push_str("## 6. Conclusions\n\n");

    let outcomes = [
        ("Sentiment vs PnL", h.sentiment_pnl.completed().map(|t| t.significant)),
        ("Sentiment vs win rate", h.win_rate.completed().map(|t| t.significant)),
        (
            "Long vs short by sentiment",
            (h.direction.completed().count() > 0).then(|| {
                h.direction.significant_count() > 0
            }),
        ),
        ("Trade size vs PnL", h.size_correlation.completed().map(|t| t.significant)),
    ];
    for (name, outcome) in outcomes {
        let text = match outcome {
            Some(true) => "significant",
            Some(false) => "not significant",
            None => "not evaluated",
        };
        out.push_str(&format!("- {name}: {text}\n"));
    }

    let confirmed = outcomes.iter().filter(|(_, o)| *o == Some(true)).count();
    out.push_str(&format!(
        "\n{confirmed} of 4 hypotheses are supported at alpha = {}. {}\n\n",
        h.alpha,
        if confirmed > 0 {
            "Sentiment carries measurable information about trading outcomes in this sample; \
the numerical thresholds above should be recalibrated as new data arrives."
        } else {
            "This sample gives no statistical support for sentiment-driven rules."
        }
    ));
}

fn appendix(out: &mut String, result: &AnalysisResult) {
    let load = &result.load;
    let h = &result.hypotheses;
    out.push_str("## Appendix: Technical Details\n\n### A. Data Processing Steps\n\n");
    out.push_str(&format!(
        "1. Loaded the merged trade/sentiment table ({} rows)\n\
2. Dropped {} rows without a known sentiment label and {} rows without PnL\n\
3. Derived position type, size bucket and win/loss for {} retained trades\n\
4. Selected {} closed trades for hypothesis testing\n\
5. Ran the four hypothesis tests and the descriptive aggregation\n\
6. Rendered the six-panel dashboard (scatter sample seed {})\n\n",
        load.rows_read,
        load.missing_sentiment + load.unknown_sentiment,
        load.missing_pnl,
        load.rows_retained,
        result.closed_trades,
        result.seed
    ));

    out.push_str("### B. Statistical Test Details\n\n");
    out.push_str("Kruskal-Wallis H-test:\n\n");
    match &h.sentiment_pnl {
        TestOutcome::Completed(t) => {
            out.push_str(&format!("- H = {:.4}\n", t.kruskal.statistic));
            out.push_str(&format!("- Degrees of freedom: {}\n", t.kruskal.df));
            out.push_str(&format!("- p-value: {}\n", format_p(t.kruskal.p_value)));
            let sizes: Vec<String> = t
                .groups
                .iter()
                .zip(&t.kruskal.group_sizes)
                .map(|(s, n)| format!("{s} = {n}"))
                .collect();
            out.push_str(&format!("- Group sizes: {}\n", sizes.join(", ")));
        }
        TestOutcome::Skipped { reason } => {
            out.push_str(&format!("- not evaluated: {reason}\n"));
        }
    }

    out.push_str("\nChi-square test of independence:\n\n");
    match &h.win_rate {
        TestOutcome::Completed(t) => {
            out.push_str(&format!("- Chi-square = {:.4}\n", t.contingency.statistic));
            out.push_str(&format!("- Degrees of freedom: {}\n", t.contingency.dof));
            out.push_str(&format!("- p-value: {}\n", format_p(t.contingency.p_value)));
            for (s, row) in t.sentiments.iter().zip(&t.contingency.expected) {
                let cells: Vec<String> = row.iter().map(|e| format!("{e:.2}")).collect();
                out.push_str(&format!("- Expected {s}: {}\n", cells.join(" / ")));
            }
        }
        TestOutcome::Skipped { reason } => {
            out.push_str(&format!("- not evaluated: {reason}\n"));
        }
    }

    out.push_str("\nMann-Whitney U tests (long vs short):\n\n");
    for c in &h.direction.comparisons {
        match &c.test {
            TestOutcome::Completed(m) => {
                out.push_str(&format!(
                    "- {}: U = {:.1}, p = {}, adjusted p = {}\n",
                    c.sentiment,
                    m.u_statistic,
                    format_p(m.p_value),
                    c.adjusted_p.map_or_else(|| "-".to_string(), format_p)
                ));
            }
            TestOutcome::Skipped { reason } => {
                out.push_str(&format!("- {}: not evaluated ({reason})\n", c.sentiment));
            }
        }
    }

    out.push_str("\nSpearman correlation:\n\n");
    match &h.size_correlation {
        TestOutcome::Completed(t) => {
            out.push_str(&format!("- rho = {:.4}\n", t.spearman.rho));
            out.push_str(&format!("- p-value: {}\n", format_p(t.spearman.p_value)));
            out.push_str(&format!("- Pairs: {}\n", t.spearman.n));
        }
        TestOutcome::Skipped { reason } => {
            out.push_str(&format!("- not evaluated: {reason}\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::compute_aggregates;
    use crate::config::AnalysisSettings;
    use crate::hypothesis::run_hypothesis_tests;
    use crate::views::test_support::trade;
    use crate::views::TradeViews;
    use sentilab_core::data::LoadSummary;
    use sentilab_core::domain::MergedTrade;

    fn result_for(trades: &[MergedTrade]) -> AnalysisResult {
        let views = TradeViews::new(trades, ClosedTradePolicy::ExcludeZeroPnl);
        AnalysisResult {
            fingerprint: "abc123".into(),
            seed: 42,
            policy: ClosedTradePolicy::ExcludeZeroPnl,
            load: LoadSummary {
                rows_read: trades.len(),
                rows_retained: trades.len(),
                missing_sentiment: 0,
                unknown_sentiment: 0,
                missing_pnl: 0,
                first_date: trades.first().map(|t| t.date),
                last_date: trades.last().map(|t| t.date),
                trading_days: 1,
                accounts: Some(1),
                coins: Some(1),
            },
            closed_trades: views.closed.len(),
            hypotheses: run_hypothesis_tests(&views, 0.05),
            aggregates: compute_aggregates(&views, &AnalysisSettings::default()),
        }
    }

    #[test]
    fn report_contains_every_section() {
        let mut trades = Vec::new();
        for i in 0..6 {
            let f = i as f64;
            trades.push(trade(Sentiment::Fear, "Close Long", 100.0 + f, -5.0 - f));
            trades.push(trade(Sentiment::Greed, "Close Short", 900.0 + f, 20.0 + f));
        }
        let md = MarkdownReportGenerator {
            chart_file: Some("dashboard.png".into()),
            generated_at: None,
        }
        .generate(&result_for(&trades));

        for heading in [
            "# Market Sentiment & Trader Performance Analysis",
            "## Executive Summary",
            "## 1. Methodology",
            "### 1.2 Statistical Methods",
            "## 2. Statistical Analysis Results",
            "### H1:",
            "### H2:",
            "### H3:",
            "### H4:",
            "## 3. Key Insights",
            "## 4. Strategy Recommendations",
            "## 5. Risk Considerations",
            "## 6. Conclusions",
            "## Appendix: Technical Details",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains("![Sentiment analysis dashboard](dashboard.png)"));
        assert!(md.contains("| Fear | 6 | 0 | 0.0% |"));
        assert!(md.contains("| Greed | 0 | 6 | 100.0% |"));
        assert!(md.contains("`abc123`"));
    }

    #[test]
    fn skipped_tests_render_as_not_evaluated() {
        let trades = vec![trade(Sentiment::Neutral, "Buy", 100.0, 3.0)];
        let md = MarkdownReportGenerator {
            chart_file: None,
            generated_at: None,
        }
        .generate(&result_for(&trades));
        assert!(md.contains("**NOT EVALUATED**"));
        assert!(md.contains("not evaluated (1 long and 0 short closed trades)"));
        assert!(!md.contains("!["));
    }
    #[test]
    fn analysis_date_only_when_stamped() {
        let trades = vec![trade(Sentiment::Neutral, "Buy", 100.0, 3.0)];
        let result = result_for(&trades);
        let plain = MarkdownReportGenerator {
            chart_file: None,
            generated_at: None,
        };
        assert!(!plain.generate(&result).contains("Analysis date"));
        assert_eq!(plain.generate(&result), plain.generate(&result));

        let at = chrono::DateTime::parse_from_rfc3339("2024-07-04T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let stamped = MarkdownReportGenerator {
            chart_file: None,
            generated_at: Some(at),
        };
        assert!(stamped.generate(&result).contains("Analysis date: July 04, 2024"));
    }

    #[test]
    fn direction_count_uses_raw_significance() {
        let mut trades = Vec::new();
        for i in 1..=4 {
            let f = i as f64;
            trades.push(trade(Sentiment::Fear, "Close Long", 10.0, -f));
            trades.push(trade(Sentiment::Fear, "Close Short", 10.0, 4.0 + f));
        }
        for (long, short) in [(1.0, 2.0), (3.0, 4.0)] {
            trades.push(trade(Sentiment::Greed, "Buy", 10.0, long));
            trades.push(trade(Sentiment::Greed, "Sell", 10.0, short));
            trades.push(trade(Sentiment::Neutral, "Buy", 10.0, long + 10.0));
            trades.push(trade(Sentiment::Neutral, "Sell", 10.0, short + 10.0));
        }
        let md = MarkdownReportGenerator {
            chart_file: None,
            generated_at: None,
        }
        .generate(&result_for(&trades));
        assert!(md.contains(
            "1 of 3 evaluated comparisons are significant at alpha = 0.05 \
(0 after Benjamini-Hochberg correction)."
        ));
        assert!(md.contains("- Long vs short by sentiment: significant"));
    }

    #[test]
    fn empty_report_names_rows_read() {
        let md = empty_report(12);
        assert!(md.contains("## No usable trades"));
        assert!(md.contains("12 rows were read"));
    }
}
