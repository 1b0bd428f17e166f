//! Descriptive tables behind the charts and the report.

use crate::config::AnalysisSettings;
use crate::views::TradeViews;
use chrono::NaiveDate;
use sentilab_core::domain::{MergedTrade, PositionType, Sentiment, SizeBucket};
use sentilab_core::stats::{win_rate, Describe};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed-trade statistics for one sentiment label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub sentiment: Sentiment,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
    pub total_pnl: f64,
    pub win_rate: f64,
    /// mean / std
    pub risk_adjusted: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionSummary {
    pub sentiment: Sentiment,
    pub position_type: PositionType,
    pub count: usize,
    pub mean_pnl: f64,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeBucketSummary {
    pub sentiment: Sentiment,
    pub bucket: SizeBucket,
    /// e.g. `"$500-$2,000"`
    pub range: String,
    pub count: usize,
    pub mean_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraderTotal {
    pub account: String,
    pub total_pnl: f64,
    pub trades: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTraderRow {
    pub sentiment: Sentiment,
    pub top_mean: Option<f64>,
    pub top_count: usize,
    pub others_mean: Option<f64>,
    pub others_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTraderComparison {
    pub top_accounts: Vec<TraderTotal>,
    pub rows: Vec<TopTraderRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinCell {
    pub sentiment: Sentiment,
    pub count: usize,
    pub mean_pnl: f64,
}

/// How strongly one coin's mean PnL depends on sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDependency {
    pub coin: String,
    pub best: CoinCell,
    pub worst: CoinCell,
    /// best.mean_pnl − worst.mean_pnl
    pub range: f64,
    pub cells: Vec<CoinCell>,
}

/// One line of a per-sentiment time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSeries {
    pub sentiment: Sentiment,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub per_sentiment: Vec<SentimentSummary>,
    pub by_direction: Vec<DirectionSummary>,
    pub by_size: Vec<SizeBucketSummary>,
    /// `None` when the input has no account column.
    pub top_traders: Option<TopTraderComparison>,
    /// `None` when the input has no coin column.
    pub coin_dependency: Option<Vec<CoinDependency>>,
    pub daily_volume: Vec<SentimentSeries>,
    pub cumulative_pnl: Vec<SentimentSeries>,
}

impl Aggregates {
    pub fn summary_for(&self, sentiment: Sentiment) -> Option<&SentimentSummary> {
        self.per_sentiment.iter().find(|s| s.sentiment == sentiment)
    }

    pub fn direction_for(
        &self,
        sentiment: Sentiment,
        position_type: PositionType,
    ) -> Option<&DirectionSummary> {
        self.by_direction
            .iter()
            .find(|d| d.sentiment == sentiment && d.position_type == position_type)
    }
}

pub fn compute_aggregates(views: &TradeViews<'_>, settings: &AnalysisSettings) -> Aggregates {
    let has_accounts = views.all.iter().any(|t| t.account.is_some());
    let has_coins = views.all.iter().any(|t| t.coin.is_some());

    Aggregates {
        per_sentiment: per_sentiment(views),
        by_direction: by_direction(views),
        by_size: by_size(views, settings),
        top_traders: has_accounts.then(|| top_traders(views, settings.top_traders)),
        coin_dependency: has_coins
            .then(|| coin_dependency(views, settings.min_trades_per_cell, settings.top_coins)),
        daily_volume: daily_volume(views.all),
        cumulative_pnl: cumulative_pnl(views.all),
    }
}

pub fn per_sentiment(views: &TradeViews<'_>) -> Vec<SentimentSummary> {
    let groups = views.closed_pnl_by_sentiment();
    Sentiment::ALL
        .into_iter()
        .filter_map(|sentiment| {
            let pnl = &groups[sentiment.index()];
            let d = Describe::of(pnl)?;
            Some(SentimentSummary {
                sentiment,
                count: d.count,
                mean: d.mean,
                median: d.median,
                std: d.std,
                total_pnl: d.sum,
                win_rate: win_rate(pnl).unwrap_or(0.0),
                risk_adjusted: d.mean_to_std(),
            })
        })
        .collect()
}

pub fn by_direction(views: &TradeViews<'_>) -> Vec<DirectionSummary> {
    let mut out = Vec::new();
    for sentiment in Sentiment::ALL {
        let (long, short) = views.directional_pnl(sentiment);
        for (position_type, pnl) in [(PositionType::Long, long), (PositionType::Short, short)] {
            if pnl.is_empty() {
                continue;
            }
            out.push(DirectionSummary {
                sentiment,
                position_type,
                count: pnl.len(),
                mean_pnl: mean(&pnl),
                win_rate: win_rate(&pnl).unwrap_or(0.0),
            });
        }
    }
    out
}

pub fn by_size(views: &TradeViews<'_>, settings: &AnalysisSettings) -> Vec<SizeBucketSummary> {
    let thresholds = &settings.size_thresholds;
    let mut cells: BTreeMap<(Sentiment, SizeBucket), Vec<f64>> = BTreeMap::new();
    for t in &views.closed {
        if let Some(bucket) = t.size_bucket(thresholds) {
            cells.entry((t.sentiment, bucket)).or_default().push(t.closed_pnl);
        }
    }
    cells
        .into_iter()
        .map(|((sentiment, bucket), pnl)| SizeBucketSummary {
            sentiment,
            bucket,
            range: thresholds.describe(bucket),
            count: pnl.len(),
            mean_pnl: mean(&pnl),
        })
        .collect()
}

/// Rank accounts by total closed PnL and compare the top `n` with the rest.
pub fn top_traders(views: &TradeViews<'_>, n: usize) -> TopTraderComparison {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for t in &views.closed {
        if let Some(account) = t.account.as_deref() {
            let entry = totals.entry(account).or_insert((0.0, 0));
            entry.0 += t.closed_pnl;
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<TraderTotal> = totals
        .into_iter()
        .map(|(account, (total_pnl, trades))| TraderTotal {
            account: account.to_string(),
            total_pnl,
            trades,
        })
        .collect();
    // BTreeMap order breaks ties by account name
    ranked.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
    ranked.truncate(n);

    let is_top = |t: &MergedTrade| {
        t.account
            .as_deref()
            .is_some_and(|a| ranked.iter().any(|r| r.account == a))
    };

    let rows = Sentiment::ALL
        .into_iter()
        .filter_map(|sentiment| {
            let (top, others): (Vec<&MergedTrade>, Vec<&MergedTrade>) = views
                .closed
                .iter()
                .copied()
                .filter(|t| t.sentiment == sentiment)
                .partition(|t| is_top(t));
            let top: Vec<f64> = top.iter().map(|t| t.closed_pnl).collect();
            let others: Vec<f64> = others.iter().map(|t| t.closed_pnl).collect();
            if top.is_empty() && others.is_empty() {
                return None;
            }
            Some(TopTraderRow {
                sentiment,
                top_mean: (!top.is_empty()).then(|| mean(&top)),
                top_count: top.len(),
                others_mean: (!others.is_empty()).then(|| mean(&others)),
                others_count: others.len(),
            })
        })
        .collect();

    TopTraderComparison {
        top_accounts: ranked,
        rows,
    }
}

/// Coins whose mean PnL varies most across sentiment labels.
///
/// A coin × sentiment cell needs `min_trades` closed trades; a coin needs two
/// such cells to have a range at all.
pub fn coin_dependency(
    views: &TradeViews<'_>,
    min_trades: usize,
    limit: usize,
) -> Vec<CoinDependency> {
    let mut cells: BTreeMap<&str, [Vec<f64>; 5]> = BTreeMap::new();
    for t in &views.closed {
        if let Some(coin) = t.coin.as_deref() {
            cells.entry(coin).or_default()[t.sentiment.index()].push(t.closed_pnl);
        }
    }

    let mut out: Vec<CoinDependency> = cells
        .into_iter()
        .filter_map(|(coin, groups)| {
            let qualified: Vec<CoinCell> = Sentiment::ALL
                .into_iter()
                .filter(|s| {
                    let g = &groups[s.index()];
                    !g.is_empty() && g.len() >= min_trades
                })
                .map(|s| {
                    let g = &groups[s.index()];
                    CoinCell {
                        sentiment: s,
                        count: g.len(),
                        mean_pnl: mean(g),
                    }
                })
                .collect();
            if qualified.len() < 2 {
                return None;
            }
            let best = qualified
                .iter()
                .fold(&qualified[0], |acc, c| if c.mean_pnl > acc.mean_pnl { c } else { acc })
                .clone();
            let worst = qualified
                .iter()
                .fold(&qualified[0], |acc, c| if c.mean_pnl < acc.mean_pnl { c } else { acc })
                .clone();
            Some(CoinDependency {
                coin: coin.to_string(),
                range: best.mean_pnl - worst.mean_pnl,
                best,
                worst,
                cells: qualified,
            })
        })
        .collect();

    out.sort_by(|a, b| b.range.total_cmp(&a.range));
    out.truncate(limit);
    out
}

/// Sum of `Size.USD` per date for each sentiment, over every retained trade.
pub fn daily_volume(trades: &[MergedTrade]) -> Vec<SentimentSeries> {
    let mut by_day: [BTreeMap<NaiveDate, f64>; 5] = Default::default();
    for t in trades {
        if let Some(size) = t.size_usd {
            *by_day[t.sentiment.index()].entry(t.date).or_insert(0.0) += size;
        }
    }
    series(by_day)
}

/// Running PnL total per sentiment, sampled at the end of each date.
///
/// Trades are accumulated in date order; within a date the input order is
/// kept.
pub fn cumulative_pnl(trades: &[MergedTrade]) -> Vec<SentimentSeries> {
    let mut ordered: Vec<&MergedTrade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date);

    let mut running = [0.0_f64; 5];
    let mut by_day: [BTreeMap<NaiveDate, f64>; 5] = Default::default();
    for t in ordered {
        let i = t.sentiment.index();
        running[i] += t.closed_pnl;
        by_day[i].insert(t.date, running[i]);
    }
    series(by_day)
}

fn series(by_day: [BTreeMap<NaiveDate, f64>; 5]) -> Vec<SentimentSeries> {
    Sentiment::ALL
        .into_iter()
        .zip(by_day)
        .filter(|(_, days)| !days.is_empty())
        .map(|(sentiment, days)| SentimentSeries {
            sentiment,
            points: days.into_iter().collect(),
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::trade;
    use sentilab_core::domain::ClosedTradePolicy;

    fn on(day: u32, mut t: MergedTrade) -> MergedTrade {
        t.date = NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        t
    }

    fn with_account(account: &str, coin: &str, mut t: MergedTrade) -> MergedTrade {
        t.account = Some(account.into());
        t.coin = Some(coin.into());
        t
    }

    #[test]
    fn per_sentiment_table() {
        let trades = vec![
            trade(Sentiment::Fear, "Buy", 100.0, 10.0),
            trade(Sentiment::Fear, "Buy", 100.0, -4.0),
            trade(Sentiment::Fear, "Buy", 100.0, 0.0),
            trade(Sentiment::Greed, "Sell", 100.0, 6.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let table = per_sentiment(&views);

        assert_eq!(table.len(), 2);
        let fear = &table[0];
        assert_eq!(fear.sentiment, Sentiment::Fear);
        assert_eq!(fear.count, 2);
        assert_eq!(fear.total_pnl, 6.0);
        assert_eq!(fear.win_rate, 0.5);
        assert!((fear.mean - 3.0).abs() < 1e-12);
        // std of (10, -4) = sqrt(98)
        assert!((fear.std.unwrap() - 98.0_f64.sqrt()).abs() < 1e-9);
        assert!((fear.risk_adjusted.unwrap() - 3.0 / 98.0_f64.sqrt()).abs() < 1e-9);

        let greed = &table[1];
        assert_eq!(greed.std, None);
        assert_eq!(greed.risk_adjusted, None);
    }

    #[test]
    fn counts_are_conserved() {
        let trades = vec![
            trade(Sentiment::ExtremeFear, "Buy", 100.0, 1.0),
            trade(Sentiment::Neutral, "Sell", 700.0, -2.0),
            trade(Sentiment::Neutral, "Auto-Deleveraging", 3000.0, 3.0),
            trade(Sentiment::ExtremeGreed, "Buy", 20_000.0, 4.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let agg = compute_aggregates(&views, &AnalysisSettings::default());

        let total: usize = agg.per_sentiment.iter().map(|s| s.count).sum();
        assert_eq!(total, views.closed.len());
        let sized: usize = agg.by_size.iter().map(|s| s.count).sum();
        assert_eq!(sized, views.closed.len());
        // the "Other" direction does not appear in the Long/Short table
        let directional: usize = agg.by_direction.iter().map(|d| d.count).sum();
        assert_eq!(directional, 3);
    }

    #[test]
    fn size_buckets_carry_ranges() {
        let trades = vec![
            trade(Sentiment::Greed, "Buy", 499.0, 1.0),
            trade(Sentiment::Greed, "Buy", 500.0, 3.0),
            trade(Sentiment::Greed, "Buy", 1999.0, 5.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let table = by_size(&views, &AnalysisSettings::default());
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].bucket, SizeBucket::Small);
        assert_eq!(table[0].range, "<$500");
        assert_eq!(table[1].bucket, SizeBucket::Medium);
        assert_eq!(table[1].count, 2);
        assert_eq!(table[1].mean_pnl, 4.0);
    }

    #[test]
    fn top_traders_split() {
        let trades = vec![
            with_account("a", "BTC", trade(Sentiment::Fear, "Buy", 1.0, 100.0)),
            with_account("b", "BTC", trade(Sentiment::Fear, "Buy", 1.0, 50.0)),
            with_account("c", "BTC", trade(Sentiment::Fear, "Buy", 1.0, -10.0)),
            with_account("c", "BTC", trade(Sentiment::Greed, "Buy", 1.0, 4.0)),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let cmp = top_traders(&views, 2);

        let names: Vec<&str> = cmp.top_accounts.iter().map(|t| t.account.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        let fear = &cmp.rows[0];
        assert_eq!(fear.top_mean, Some(75.0));
        assert_eq!(fear.others_mean, Some(-10.0));
        let greed = &cmp.rows[1];
        assert_eq!(greed.top_mean, None);
        assert_eq!(greed.others_count, 1);
    }

    #[test]
    fn coin_dependency_ranks_by_range() {
        let mut trades = Vec::new();
        for _ in 0..2 {
            trades.push(with_account("a", "ETH", trade(Sentiment::Fear, "Buy", 1.0, 50.0)));
            trades.push(with_account("a", "ETH", trade(Sentiment::Greed, "Buy", 1.0, -50.0)));
            trades.push(with_account("a", "BTC", trade(Sentiment::Fear, "Buy", 1.0, 5.0)));
            trades.push(with_account("a", "BTC", trade(Sentiment::Greed, "Buy", 1.0, 1.0)));
            trades.push(with_account("a", "SOL", trade(Sentiment::Greed, "Buy", 1.0, 9.0)));
        }
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let deps = coin_dependency(&views, 2, 10);

        // SOL has a single qualifying sentiment and is left out
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].coin, "ETH");
        assert_eq!(deps[0].best.sentiment, Sentiment::Fear);
        assert_eq!(deps[0].worst.sentiment, Sentiment::Greed);
        assert_eq!(deps[0].range, 100.0);
        assert_eq!(deps[1].coin, "BTC");

        assert!(coin_dependency(&views, 3, 10).is_empty());
        assert_eq!(coin_dependency(&views, 2, 1).len(), 1);
    }

    #[test]
    fn time_series_are_date_ordered() {
        let trades = vec![
            on(3, trade(Sentiment::Fear, "Buy", 100.0, 5.0)),
            on(1, trade(Sentiment::Fear, "Buy", 50.0, -2.0)),
            on(1, trade(Sentiment::Fear, "Buy", 25.0, 0.0)),
            on(2, trade(Sentiment::Greed, "Buy", 10.0, 1.0)),
        ];

        let volume = daily_volume(&trades);
        assert_eq!(volume.len(), 2);
        assert_eq!(volume[0].points[0].1, 75.0);
        assert_eq!(volume[0].points[1].1, 100.0);

        let cumulative = cumulative_pnl(&trades);
        let fear: Vec<f64> = cumulative[0].points.iter().map(|p| p.1).collect();
        assert_eq!(fear, vec![-2.0, 3.0]);
        assert_eq!(cumulative[1].sentiment, Sentiment::Greed);
    }

    #[test]
    fn missing_identity_columns_disable_tables() {
        let mut t = trade(Sentiment::Fear, "Buy", 1.0, 1.0);
        t.account = None;
        t.coin = None;
        let trades = vec![t];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let agg = compute_aggregates(&views, &AnalysisSettings::default());
        assert!(agg.top_traders.is_none());
        assert!(agg.coin_dependency.is_none());
    }
}
