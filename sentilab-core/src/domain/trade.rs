//! MergedTrade: one executed trade joined to that day's sentiment.

use super::position::{PositionType, SizeBucket, SizeThresholds};
use super::sentiment::Sentiment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A trade record left-joined to the sentiment reading for its date.
///
/// Built once by the loader and never mutated afterwards; filtering produces
/// views (`Vec<&MergedTrade>`) rather than modified copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTrade {
    pub date: NaiveDate,
    pub account: Option<String>,
    pub coin: Option<String>,
    pub direction: String,
    pub position_type: PositionType,
    /// Executed notional in USD. `None` when the source cell was empty.
    pub size_usd: Option<f64>,
    /// Realized PnL. Zero marks a trade that was not closed.
    pub closed_pnl: f64,
    pub sentiment: Sentiment,
}

impl MergedTrade {
    pub fn is_win(&self) -> bool {
        self.closed_pnl > 0.0
    }

    pub fn size_bucket(&self, thresholds: &SizeThresholds) -> Option<SizeBucket> {
        self.size_usd.map(|s| thresholds.bucket(s))
    }
}

/// Which trades count as "closed" for PnL analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedTradePolicy {
    /// A PnL of exactly zero means the trade has not been closed.
    #[default]
    ExcludeZeroPnl,
    /// Every trade with a recorded PnL is closed, including break-even ones.
    IncludeZeroPnl,
}

impl ClosedTradePolicy {
    pub fn from_include_zero(include_zero_pnl: bool) -> Self {
        if include_zero_pnl {
            ClosedTradePolicy::IncludeZeroPnl
        } else {
            ClosedTradePolicy::ExcludeZeroPnl
        }
    }

    pub fn is_closed(self, trade: &MergedTrade) -> bool {
        match self {
            ClosedTradePolicy::ExcludeZeroPnl => trade.closed_pnl != 0.0,
            ClosedTradePolicy::IncludeZeroPnl => true,
        }
    }
}
