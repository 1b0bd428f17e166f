//! SentiLab Core — domain types, data loading, and statistics.
//!
//! This crate holds everything the analysis needs that does not touch the
//! filesystem for output:
//! - Domain types (sentiment labels, position types, size buckets, merged trades)
//! - Merged CSV loading with schema validation and drop accounting
//! - Nonparametric tests (Kruskal–Wallis, χ² contingency, Mann–Whitney U, Spearman)
//! - Benjamini–Hochberg correction and descriptive statistics
//! - Seeded RNG hierarchy for reproducible sampling

pub mod data;
pub mod domain;
pub mod rng;
pub mod stats;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::MergedTrade>();
        require_sync::<domain::MergedTrade>();
        require_send::<domain::Sentiment>();
        require_sync::<domain::Sentiment>();
        require_send::<domain::SizeThresholds>();
        require_sync::<domain::SizeThresholds>();
        require_send::<domain::ClosedTradePolicy>();
        require_sync::<domain::ClosedTradePolicy>();

        require_send::<data::LoadedDataset>();
        require_sync::<data::LoadedDataset>();

        require_send::<stats::KruskalResult>();
        require_sync::<stats::KruskalResult>();
        require_send::<stats::ContingencyResult>();
        require_sync::<stats::ContingencyResult>();
        require_send::<stats::MannWhitneyResult>();
        require_sync::<stats::MannWhitneyResult>();
        require_send::<stats::SpearmanResult>();
        require_sync::<stats::SpearmanResult>();
        require_send::<stats::StatsError>();
        require_sync::<stats::StatsError>();

        require_send::<rng::RngHierarchy>();
        require_sync::<rng::RngHierarchy>();
    }
}
