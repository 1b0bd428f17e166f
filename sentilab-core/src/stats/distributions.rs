//! Survival functions of the reference distributions, backed by statrs.

use super::StatsError;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

fn dist_err(e: impl std::fmt::Display) -> StatsError {
    StatsError::Distribution(e.to_string())
}

/// P(X > x) for X ~ χ²(df).
pub fn chi2_sf(x: f64, df: f64) -> Result<f64, StatsError> {
    let dist = ChiSquared::new(df).map_err(dist_err)?;
    Ok(dist.sf(x))
}

/// P(Z > z) for Z ~ N(0, 1).
pub fn normal_sf(z: f64) -> Result<f64, StatsError> {
    let dist = Normal::new(0.0, 1.0).map_err(dist_err)?;
    Ok(dist.sf(z))
}

/// P(T > t) for T ~ Student-t(df).
pub fn t_sf(t: f64, df: f64) -> Result<f64, StatsError> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(dist_err)?;
    Ok(dist.sf(t))
}

/// Binomial coefficient C(n, k) as f64, exact for the magnitudes used here.
pub fn choose(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chi2_known_critical_values() {
        // 3.841 is the 95th percentile of chi2(1); 9.488 of chi2(4)
        assert!((chi2_sf(3.841_458_820_694_124, 1.0).unwrap() - 0.05).abs() < 1e-9);
        assert!((chi2_sf(9.487_729_036_781_154, 4.0).unwrap() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn normal_tail() {
        assert!((normal_sf(0.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((normal_sf(1.959_963_984_540_054).unwrap() - 0.025).abs() < 1e-9);
    }

    #[test]
    fn t_tail_symmetry() {
        let df = 7.0;
        for t in [0.3, 1.0, 2.5] {
            let upper = t_sf(t, df).unwrap();
            let lower = 1.0 - t_sf(-t, df).unwrap();
            assert!((upper - lower).abs() < 1e-12);
        }
        // Cauchy: P(T > 1) = 0.25
        assert!((t_sf(1.0, 1.0).unwrap() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn invalid_df_is_an_error() {
        assert!(matches!(chi2_sf(1.0, 0.0), Err(StatsError::Distribution(_))));
    }

    #[test]
    fn choose_small_values() {
        assert_eq!(choose(5, 2), 10.0);
        assert_eq!(choose(10, 0), 1.0);
        assert_eq!(choose(10, 10), 1.0);
        assert_eq!(choose(3, 4), 0.0);
        assert_eq!(choose(16, 8), 12_870.0);
    }
}
