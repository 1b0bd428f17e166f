//! Nonparametric tests and descriptive statistics.
//!
//! Rank and contingency arithmetic is implemented here; distribution tail
//! functions come from statrs. Every test returns `Result<_, StatsError>` so
//! callers can turn a degenerate input into a skipped test instead of a panic.

pub mod contingency;
pub mod descriptive;
pub mod distributions;
mod error;
pub mod fdr;
pub mod kruskal;
pub mod mann_whitney;
pub mod rank;
pub mod spearman;

pub use contingency::{chi2_contingency, trim_empty_margins, ContingencyResult};
pub use descriptive::{win_rate, Describe};
pub use error::StatsError;
pub use fdr::{benjamini_hochberg, FdrResult};
pub use kruskal::{kruskal_wallis, KruskalResult};
pub use mann_whitney::{mann_whitney_u, MannWhitneyResult, MwuMethod};
pub use spearman::{spearman, SpearmanResult};
