//! Read-only views over the loaded trades.

use sentilab_core::domain::{ClosedTradePolicy, MergedTrade, PositionType, Sentiment};

/// The loaded trades plus the closed-trade subset, grouped in scale order.
#[derive(Debug, Clone)]
pub struct TradeViews<'a> {
    pub all: &'a [MergedTrade],
    pub closed: Vec<&'a MergedTrade>,
    pub policy: ClosedTradePolicy,
}

impl<'a> TradeViews<'a> {
    pub fn new(trades: &'a [MergedTrade], policy: ClosedTradePolicy) -> Self {
        let closed = trades.iter().filter(|t| policy.is_closed(t)).collect();
        Self {
            all: trades,
            closed,
            policy,
        }
    }

    /// Closed PnL per sentiment, indexed by [`Sentiment::index`].
    pub fn closed_pnl_by_sentiment(&self) -> [Vec<f64>; 5] {
        let mut groups: [Vec<f64>; 5] = Default::default();
        for t in &self.closed {
            groups[t.sentiment.index()].push(t.closed_pnl);
        }
        groups
    }

    /// Closed PnL of one sentiment, split into (long, short).
    pub fn directional_pnl(&self, sentiment: Sentiment) -> (Vec<f64>, Vec<f64>) {
        let mut long = Vec::new();
        let mut short = Vec::new();
        for t in self.closed.iter().filter(|t| t.sentiment == sentiment) {
            match t.position_type {
                PositionType::Long => long.push(t.closed_pnl),
                PositionType::Short => short.push(t.closed_pnl),
                PositionType::Other => {}
            }
        }
        (long, short)
    }

    /// (size, pnl) pairs of closed trades with a recorded size.
    pub fn size_pnl_pairs(&self) -> (Vec<f64>, Vec<f64>) {
        self.closed
            .iter()
            .filter_map(|t| t.size_usd.map(|s| (s, t.closed_pnl)))
            .unzip()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::trade;
    use super::*;

    #[test]
    fn zero_pnl_excluded_by_default() {
        let trades = vec![
            trade(Sentiment::Fear, "Close Long", 100.0, 5.0),
            trade(Sentiment::Fear, "Open Long", 100.0, 0.0),
            trade(Sentiment::Greed, "Sell", 100.0, -2.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        assert_eq!(views.closed.len(), 2);
        let groups = views.closed_pnl_by_sentiment();
        assert_eq!(groups[Sentiment::Fear.index()], vec![5.0]);
        assert_eq!(groups[Sentiment::Greed.index()], vec![-2.0]);

        let inclusive = TradeViews::new(&trades, ClosedTradePolicy::IncludeZeroPnl);
        assert_eq!(inclusive.closed.len(), 3);
    }

    #[test]
    fn directional_split_ignores_other() {
        let trades = vec![
            trade(Sentiment::Neutral, "Buy", 10.0, 1.0),
            trade(Sentiment::Neutral, "Close Short", 10.0, 2.0),
            trade(Sentiment::Neutral, "Spot Dust Conversion", 10.0, 3.0),
            trade(Sentiment::Greed, "Buy", 10.0, 4.0),
        ];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        let (long, short) = views.directional_pnl(Sentiment::Neutral);
        assert_eq!(long, vec![1.0]);
        assert_eq!(short, vec![2.0]);
    }

    #[test]
    fn size_pairs_skip_missing_size() {
        let mut no_size = trade(Sentiment::Fear, "Buy", 0.0, 1.0);
        no_size.size_usd = None;
        let trades = vec![no_size, trade(Sentiment::Fear, "Buy", 50.0, 2.0)];
        let views = TradeViews::new(&trades, ClosedTradePolicy::ExcludeZeroPnl);
        assert_eq!(views.size_pnl_pairs(), (vec![50.0], vec![2.0]));
    }
}
