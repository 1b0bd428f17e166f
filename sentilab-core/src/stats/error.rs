use thiserror::Error;

/// Why a statistical test could not produce a result.
///
/// These are degenerate-input conditions, not bugs: the runner turns them
/// into a skipped test with a logged reason.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("need at least two non-empty groups, got {0}")]
    TooFewGroups(usize),

    #[error("group {0} is empty")]
    EmptyGroup(usize),

    #[error("all values are identical")]
    AllIdentical,

    #[error("input lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("contingency table is not rectangular")]
    RaggedTable,

    #[error("contingency table has a zero expected frequency")]
    ZeroExpected,

    #[error("non-finite value in input")]
    NonFinite,

    #[error("distribution error: {0}")]
    Distribution(String),
}

pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), StatsError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(StatsError::NonFinite)
    }
}
