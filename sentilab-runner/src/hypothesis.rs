//! The four sentiment hypotheses.
//!
//! - H1: closed PnL differs across sentiment labels (Kruskal–Wallis)
//! - H2: win rate differs across sentiment labels (χ² independence)
//! - H3: long and short PnL differ within each label (Mann–Whitney U, BH-adjusted)
//! - H4: trade size correlates with PnL (Spearman)
//!
//! A test that cannot run on the given data is `Skipped` with a reason and
//! does not stop the others.

use crate::views::TradeViews;
use sentilab_core::domain::Sentiment;
use sentilab_core::stats::{
    benjamini_hochberg, chi2_contingency, kruskal_wallis, mann_whitney_u, spearman,
    trim_empty_margins, ContingencyResult, KruskalResult, MannWhitneyResult, SpearmanResult,
    StatsError,
};
use serde::{Deserialize, Serialize};

/// Columns of the win-rate contingency table.
pub const OUTCOME_LABELS: [&str; 2] = ["loss", "win"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome<T> {
    Completed(T),
    Skipped { reason: String },
}

impl<T> TestOutcome<T> {
    pub fn skipped(test: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(test, %reason, "hypothesis test skipped");
        TestOutcome::Skipped { reason }
    }

    pub fn from_stats(test: &str, result: Result<T, StatsError>) -> Self {
        match result {
            Ok(value) => TestOutcome::Completed(value),
            Err(e) => Self::skipped(test, e.to_string()),
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            TestOutcome::Completed(v) => Some(v),
            TestOutcome::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            TestOutcome::Completed(_) => None,
            TestOutcome::Skipped { reason } => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TestOutcome<U> {
        match self {
            TestOutcome::Completed(v) => TestOutcome::Completed(f(v)),
            TestOutcome::Skipped { reason } => TestOutcome::Skipped { reason },
        }
    }
}

/// H1 result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPnlTest {
    pub kruskal: KruskalResult,
    /// Labels entered into the test, in scale order.
    pub groups: Vec<Sentiment>,
    /// Labels with no closed trades.
    pub excluded: Vec<Sentiment>,
    pub significant: bool,
}

/// H2 result. `observed` rows follow `sentiments`, columns follow `outcomes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRateTest {
    pub sentiments: Vec<Sentiment>,
    pub outcomes: Vec<String>,
    pub observed: Vec<Vec<u64>>,
    pub contingency: ContingencyResult,
    pub significant: bool,
}

/// H3 entry for one sentiment label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionComparison {
    pub sentiment: Sentiment,
    pub long_count: usize,
    pub short_count: usize,
    pub long_mean: Option<f64>,
    pub short_mean: Option<f64>,
    pub test: TestOutcome<MannWhitneyResult>,
    /// Raw p below alpha.
    pub significant: bool,
    /// Benjamini–Hochberg adjusted p over the completed comparisons.
    pub adjusted_p: Option<f64>,
}

impl DirectionComparison {
    pub fn raw_p(&self) -> Option<f64> {
        self.test.completed().map(|r| r.p_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionTest {
    pub comparisons: Vec<DirectionComparison>,
}

impl DirectionTest {
    pub fn completed(&self) -> impl Iterator<Item = &DirectionComparison> {
        self.comparisons.iter().filter(|c| c.test.completed().is_some())
    }

    pub fn significant_count(&self) -> usize {
        self.comparisons.iter().filter(|c| c.significant).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationDirection {
    Positive,
    Negative,
    None,
}

/// H4 result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeCorrelationTest {
    pub spearman: SpearmanResult,
    pub significant: bool,
    /// Sign of ρ when significant, `None` otherwise.
    pub direction: CorrelationDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisReport {
    pub alpha: f64,
    pub sentiment_pnl: TestOutcome<SentimentPnlTest>,
    pub win_rate: TestOutcome<WinRateTest>,
    pub direction: DirectionTest,
    pub size_correlation: TestOutcome<SizeCorrelationTest>,
}

pub fn run_hypothesis_tests(views: &TradeViews<'_>, alpha: f64) -> HypothesisReport {
    let report = HypothesisReport {
        alpha,
        sentiment_pnl: sentiment_pnl(views, alpha),
        win_rate: win_rate(views, alpha),
        direction: direction_by_sentiment(views, alpha),
        size_correlation: size_correlation(views, alpha),
    };
    tracing::info!(
        h1 = ?report.sentiment_pnl.completed().map(|t| t.kruskal.p_value),
        h2 = ?report.win_rate.completed().map(|t| t.contingency.p_value),
        h3_completed = report.direction.completed().count(),
        h4 = ?report.size_correlation.completed().map(|t| t.spearman.p_value),
        "hypothesis tests finished"
    );
    report
}

/// H1: Kruskal–Wallis over the non-empty sentiment groups.
pub fn sentiment_pnl(views: &TradeViews<'_>, alpha: f64) -> TestOutcome<SentimentPnlTest> {
    const NAME: &str = "sentiment_pnl";
    let groups = views.closed_pnl_by_sentiment();

    let (present, excluded): (Vec<Sentiment>, Vec<Sentiment>) = Sentiment::ALL
        .into_iter()
        .partition(|s| !groups[s.index()].is_empty());
    if present.len() < 2 {
        return TestOutcome::skipped(
            NAME,
            format!(
                "need closed trades in at least two sentiment groups, found {}",
                present.len()
            ),
        );
    }

    let samples: Vec<&[f64]> = present.iter().map(|s| groups[s.index()].as_slice()).collect();
    TestOutcome::from_stats(NAME, kruskal_wallis(&samples)).map(|kruskal| SentimentPnlTest {
        significant: kruskal.p_value < alpha,
        kruskal,
        groups: present,
        excluded,
    })
}

/// Full 5 × 2 table of closed-trade (loss, win) counts in scale order.
pub fn win_loss_table(views: &TradeViews<'_>) -> Vec<Vec<u64>> {
    let mut table = vec![vec![0u64; 2]; Sentiment::ALL.len()];
    for t in &views.closed {
        table[t.sentiment.index()][usize::from(t.is_win())] += 1;
    }
    table
}

/// H2: χ² test of independence between sentiment and win/loss.
pub fn win_rate(views: &TradeViews<'_>, alpha: f64) -> TestOutcome<WinRateTest> {
    const NAME: &str = "win_rate";
    let (rows, cols, observed) = trim_empty_margins(&win_loss_table(views));
    if observed.is_empty() {
        return TestOutcome::skipped(NAME, "no closed trades");
    }

    TestOutcome::from_stats(NAME, chi2_contingency(&observed)).map(|contingency| WinRateTest {
        significant: contingency.p_value < alpha,
        sentiments: rows.iter().map(|&i| Sentiment::ALL[i]).collect(),
        outcomes: cols.iter().map(|&j| OUTCOME_LABELS[j].to_string()).collect(),
        observed,
        contingency,
    })
}

/// H3: Long vs Short within each sentiment label.
pub fn direction_by_sentiment(views: &TradeViews<'_>, alpha: f64) -> DirectionTest {
    let mut comparisons: Vec<DirectionComparison> = Sentiment::ALL
        .into_iter()
        .map(|sentiment| {
            let (long, short) = views.directional_pnl(sentiment);
            let name = format!("direction[{sentiment}]");
            let test = if long.is_empty() || short.is_empty() {
                TestOutcome::skipped(
                    &name,
                    format!("{} long and {} short closed trades", long.len(), short.len()),
                )
            } else {
                TestOutcome::from_stats(&name, mann_whitney_u(&long, &short))
            };
            DirectionComparison {
                sentiment,
                long_count: long.len(),
                short_count: short.len(),
                long_mean: mean(&long),
                short_mean: mean(&short),
                significant: test.completed().is_some_and(|m| m.p_value < alpha),
                test,
                adjusted_p: None,
            }
        })
        .collect();

    let family: Vec<(String, f64)> = comparisons
        .iter()
        .filter_map(|c| c.raw_p().map(|p| (c.sentiment.to_string(), p)))
        .collect();
    let adjusted = benjamini_hochberg(&family, alpha);
    for fdr in adjusted {
        if let Some(c) = comparisons
            .iter_mut()
            .find(|c| c.sentiment.label() == fdr.label)
        {
            c.adjusted_p = Some(fdr.adjusted_p);
        }
    }

    DirectionTest { comparisons }
}

/// H4: Spearman correlation between trade size and closed PnL.
pub fn size_correlation(views: &TradeViews<'_>, alpha: f64) -> TestOutcome<SizeCorrelationTest> {
    let (sizes, pnls) = views.size_pnl_pairs();
    TestOutcome::from_stats("size_correlation", spearman(&sizes, &pnls)).map(|spearman| {
        let significant = spearman.p_value < alpha;
        let direction = match (significant, spearman.rho > 0.0) {
            (false, _) => CorrelationDirection::None,
            (true, true) => CorrelationDirection::Positive,
            (true, false) => CorrelationDirection::Negative,
        };
        SizeCorrelationTest {
            spearman,
            significant,
            direction,
        }
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::trade;
    use sentilab_core::domain::{ClosedTradePolicy, MergedTrade};

    fn separated() -> Vec<MergedTrade> {
        let mut trades = Vec::new();
        for i in 0..5 {
            let f = i as f64;
            trades.push(trade(Sentiment::Fear, "Close Long", 100.0 + f, -10.0 - f));
            trades.push(trade(Sentiment::Greed, "Close Short", 300.0 + f, 10.0 + f));
        }
        trades
    }

    #[test]
    fn separated_groups_are_significant() {
        let trades = separated();
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let report = run_hypothesis_tests(&views, 0.05);

        let h1 = report.sentiment_pnl.completed().unwrap();
        assert!(h1.significant);
        assert_eq!(h1.groups, vec![Sentiment::Fear, Sentiment::Greed]);
        assert_eq!(h1.excluded.len(), 3);
        assert_eq!(h1.kruskal.group_sizes, vec![5, 5]);

        let h2 = report.win_rate.completed().unwrap();
        assert_eq!(h2.observed, vec![vec![5, 0], vec![0, 5]]);
        assert_eq!(h2.outcomes, vec!["loss", "win"]);
        assert!(h2.contingency.yates_corrected);

        let h4 = report.size_correlation.completed().unwrap();
        assert!(h4.spearman.rho > 0.7);
        assert_eq!(h4.direction, CorrelationDirection::Positive);
    }

    #[test]
    fn single_group_skips_h1() {
        let trades = vec![
            trade(Sentiment::Fear, "Buy", 10.0, 1.0),
            trade(Sentiment::Fear, "Sell", 20.0, -1.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let outcome = sentiment_pnl(&views, 0.05);
        assert!(outcome.skip_reason().unwrap().contains("at least two"));
    }

    #[test]
    fn constant_pnl_skips_h1_only() {
        let trades = vec![
            trade(Sentiment::Fear, "Buy", 10.0, 3.0),
            trade(Sentiment::Greed, "Sell", 20.0, 3.0),
            trade(Sentiment::Neutral, "Sell", 30.0, 3.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let report = run_hypothesis_tests(&views, 0.05);
        assert!(report.sentiment_pnl.completed().is_none());
        // every trade is a win, so the loss column is dropped and dof is 0
        let h2 = report.win_rate.completed().unwrap();
        assert_eq!(h2.outcomes, vec!["win"]);
        assert_eq!(h2.contingency.dof, 0);
        assert_eq!(h2.contingency.p_value, 1.0);
        // PnL is constant, so Spearman is undefined
        assert!(report.size_correlation.completed().is_none());
    }

    #[test]
    fn direction_comparison_skips_one_sided_labels() {
        let trades = vec![
            trade(Sentiment::Neutral, "Buy", 10.0, 1.0),
            trade(Sentiment::Neutral, "Buy", 10.0, 2.0),
            trade(Sentiment::Neutral, "Sell", 10.0, 5.0),
            trade(Sentiment::Neutral, "Sell", 10.0, 6.0),
            trade(Sentiment::Greed, "Buy", 10.0, 1.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let h3 = direction_by_sentiment(&views, 0.05);

        assert_eq!(h3.comparisons.len(), 5);
        let neutral = &h3.comparisons[Sentiment::Neutral.index()];
        let mwu = neutral.test.completed().unwrap();
        assert_eq!(mwu.u_statistic, 0.0);
        assert_eq!(neutral.long_mean, Some(1.5));
        // single comparison in the family, so BH leaves p unchanged
        assert_eq!(neutral.adjusted_p, Some(mwu.p_value));

        let greed = &h3.comparisons[Sentiment::Greed.index()];
        assert!(greed.test.completed().is_none());
        assert_eq!(greed.adjusted_p, None);
        assert_eq!(greed.long_count, 1);
        assert_eq!(greed.short_count, 0);
    }

    #[test]
    fn direction_significance_uses_raw_p() {
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
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let h3 = direction_by_sentiment(&views, 0.05);

        let fear = &h3.comparisons[Sentiment::Fear.index()];
        // 2 / C(8,4)
        assert!((fear.raw_p().unwrap() - 2.0 / 70.0).abs() < 1e-12);
        assert!(fear.significant);
        // three comparisons in the family push the adjusted p above alpha
        assert!(fear.adjusted_p.unwrap() > 0.05);

        assert!(!h3.comparisons[Sentiment::Greed.index()].significant);
        assert!(!h3.comparisons[Sentiment::ExtremeFear.index()].significant);
        assert_eq!(h3.completed().count(), 3);
        assert_eq!(h3.significant_count(), 1);
    }

    #[test]
    fn contingency_rows_match_group_counts() {
        let trades = vec![
            trade(Sentiment::ExtremeFear, "Buy", 10.0, -1.0),
            trade(Sentiment::ExtremeFear, "Buy", 10.0, 2.0),
            trade(Sentiment::Greed, "Buy", 10.0, 3.0),
            trade(Sentiment::Greed, "Buy", 10.0, 0.0),
            trade(Sentiment::ExtremeGreed, "Buy", 10.0, -4.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let h2 = win_rate(&views, 0.05).completed().cloned().unwrap();
        assert_eq!(
            h2.sentiments,
            vec![Sentiment::ExtremeFear, Sentiment::Greed, Sentiment::ExtremeGreed]
        );
        let row_sums: Vec<u64> = h2.observed.iter().map(|r| r.iter().sum()).collect();
        assert_eq!(row_sums, vec![2, 1, 1]);
        assert_eq!(row_sums.iter().sum::<u64>() as usize, views.closed.len());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let skipped: TestOutcome<SizeCorrelationTest> = TestOutcome::Skipped {
            reason: "too few".into(),
        };
        let json = serde_json::to_value(&skipped).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "too few");
    }
}
