//! Grouped descriptive statistics.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Median, Statistics};

/// count / mean / median / std of one group, the shape of a pandas `agg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n − 1); `None` for a single observation.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
}

impl Describe {
    /// `None` for an empty group.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let std = (values.len() > 1).then(|| values.iter().copied().std_dev());
        Some(Self {
            count: values.len(),
            sum: values.iter().sum(),
            mean: values.iter().copied().mean(),
            median: Data::new(values.to_vec()).median(),
            std,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }

    /// mean / std, the "Sharpe-like" risk-adjusted ratio per trade.
    pub fn mean_to_std(&self) -> Option<f64> {
        self.std.filter(|s| *s > 0.0).map(|s| self.mean / s)
    }
}

/// Fraction of values strictly greater than zero; `None` for an empty slice.
pub fn win_rate(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().filter(|v| **v > 0.0).count() as f64 / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_group() {
        let d = Describe::of(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(d.count, 4);
        assert_eq!(d.sum, 10.0);
        assert!((d.mean - 2.5).abs() < 1e-12);
        assert!((d.median - 2.5).abs() < 1e-12);
        // sample variance = 5/3
        assert!((d.std.unwrap() - (5.0_f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 4.0);
    }

    #[test]
    fn single_value_has_no_std() {
        let d = Describe::of(&[7.0]).unwrap();
        assert_eq!(d.std, None);
        assert_eq!(d.median, 7.0);
        assert_eq!(d.mean_to_std(), None);
    }

    #[test]
    fn empty_group() {
        assert!(Describe::of(&[]).is_none());
        assert!(win_rate(&[]).is_none());
    }

    #[test]
    fn win_rate_ignores_zero() {
        assert_eq!(win_rate(&[1.0, 0.0, -1.0, 2.0]), Some(0.5));
    }
}
