//! The complete, serializable outcome of one analysis run.

use crate::aggregate::Aggregates;
use crate::hypothesis::HypothesisReport;
use sentilab_core::data::LoadSummary;
use sentilab_core::domain::ClosedTradePolicy;
use serde::{Deserialize, Serialize};

/// Bumped whenever the JSON shape of [`AnalysisResult`] changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// BLAKE3 over the retained input records.
    pub fingerprint: String,
    pub seed: u64,
    pub policy: ClosedTradePolicy,
    pub load: LoadSummary,
    pub closed_trades: usize,
    pub hypotheses: HypothesisReport,
    pub aggregates: Aggregates,
}
