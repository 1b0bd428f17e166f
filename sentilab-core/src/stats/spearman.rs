//! Spearman rank correlation with a t-distribution p-value.

use super::distributions::t_sf;
use super::error::ensure_finite;
use super::rank::rankdata;
use super::StatsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpearmanResult {
    pub rho: f64,
    /// Two-sided p-value from t = ρ·√((n−2)/((1+ρ)(1−ρ))) with n−2 dof.
    pub p_value: f64,
    pub n: usize,
}

pub fn spearman(x: &[f64], y: &[f64]) -> Result<SpearmanResult, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { needed: 3, got: n });
    }
    ensure_finite(x)?;
    ensure_finite(y)?;

    let rho = pearson(&rankdata(x), &rankdata(y))
        .ok_or(StatsError::AllIdentical)?
        .clamp(-1.0, 1.0);

    let df = (n - 2) as f64;
    let p_value = if rho.abs() == 1.0 {
        0.0
    } else {
        let t = rho * (df / ((1.0 + rho) * (1.0 - rho))).sqrt();
        (2.0 * t_sf(t.abs(), df)?).min(1.0)
    };

    Ok(SpearmanResult { rho, p_value, n })
}

/// Pearson correlation; `None` when either input has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_monotonic_relationship() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 8.0, 16.0, 32.0];
        let r = spearman(&x, &y).unwrap();
        assert_eq!(r.rho, 1.0);
        assert_eq!(r.p_value, 0.0);

        let rev: Vec<f64> = y.iter().rev().copied().collect();
        assert_eq!(spearman(&x, &rev).unwrap().rho, -1.0);
    }

    #[test]
    fn classic_rank_example() {
        // d = rank differences (0, -1, 1, -1, 1) → Σd² = 4, ρ = 1 - 6·4/(5·24) = 0.8
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        let r = spearman(&x, &y).unwrap();
        assert!((r.rho - 0.8).abs() < 1e-12);
        let t = 0.8 * (3.0_f64 / (1.8 * 0.2)).sqrt();
        let expected = 2.0 * t_sf(t, 3.0).unwrap();
        assert!((r.p_value - expected).abs() < 1e-12);
        assert!(r.p_value > 0.05);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(matches!(
            spearman(&[1.0, 2.0], &[1.0, 2.0]),
            Err(StatsError::InsufficientData { needed: 3, got: 2 })
        ));
        assert_eq!(
            spearman(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::AllIdentical)
        );
        assert!(matches!(
            spearman(&[1.0, 2.0, 3.0], &[1.0]),
            Err(StatsError::LengthMismatch { .. })
        ));
    }
}
