//! Kruskal–Wallis H test (rank-based k-sample comparison).

use super::distributions::chi2_sf;
use super::error::ensure_finite;
use super::rank::{rankdata, tie_term};
use super::StatsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KruskalResult {
    /// Tie-corrected H statistic.
    pub statistic: f64,
    pub p_value: f64,
    /// k − 1
    pub df: usize,
    pub group_sizes: Vec<usize>,
}

/// H test over `groups`, every one of which must be non-empty.
///
/// H = 12 / (n(n+1)) · Σ Rᵢ²/nᵢ − 3(n+1), divided by the tie correction
/// 1 − Σ(t³−t)/(n³−n). The p-value is the χ²(k−1) upper tail.
pub fn kruskal_wallis(groups: &[&[f64]]) -> Result<KruskalResult, StatsError> {
    if groups.len() < 2 {
        return Err(StatsError::TooFewGroups(groups.len()));
    }
    if let Some(i) = groups.iter().position(|g| g.is_empty()) {
        return Err(StatsError::EmptyGroup(i));
    }

    let pooled: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    ensure_finite(&pooled)?;

    let n = pooled.len() as f64;
    let ranks = rankdata(&pooled);

    let mut offset = 0;
    let mut weighted_sum = 0.0;
    for g in groups {
        let rank_sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        weighted_sum += rank_sum * rank_sum / g.len() as f64;
        offset += g.len();
    }

    let correction = 1.0 - tie_term(&pooled) / (n * n * n - n);
    if correction <= 0.0 {
        return Err(StatsError::AllIdentical);
    }

    let h = ((12.0 / (n * (n + 1.0)) * weighted_sum - 3.0 * (n + 1.0)) / correction).max(0.0);
    let df = groups.len() - 1;
    let p_value = chi2_sf(h, df as f64)?;

    Ok(KruskalResult {
        statistic: h,
        p_value,
        df,
        group_sizes: groups.iter().map(|g| g.len()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_value_without_ties() {
        // Hollander & Wolfe style example; H computed by hand:
        // ranks a={1,2,3} b={4,5,6} c={7,8,9}, n=9
        // Σ R²/n = 36/3 + 225/3 + 576/3 = 279
        // H = 12/90 * 279 - 30 = 7.2
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let c = [7.0, 8.0, 9.0];
        let r = kruskal_wallis(&[&a, &b, &c]).unwrap();
        assert!((r.statistic - 7.2).abs() < 1e-12);
        assert_eq!(r.df, 2);
        // chi2(2) sf(7.2) = exp(-3.6)
        assert!((r.p_value - (-3.6_f64).exp()).abs() < 1e-10);
        assert_eq!(r.group_sizes, vec![3, 3, 3]);
    }

    #[test]
    fn tie_correction_applied() {
        let a = [1.0, 1.0, 2.0];
        let b = [2.0, 3.0, 3.0];
        let r = kruskal_wallis(&[&a, &b]).unwrap();
        // ranks: 1,1 -> 1.5; 2,2 -> 3.5; 3,3 -> 5.5
        // Ra = 1.5+1.5+3.5 = 6.5, Rb = 3.5+5.5+5.5 = 14.5
        // raw H = 12/42 * (42.25/3 + 210.25/3) - 21 = 12/42*84.1667 - 21 = 3.047619..
        // ties: 3 pairs -> 18, correction = 1 - 18/210
        let raw = 12.0 / 42.0 * ((6.5f64 * 6.5 + 14.5 * 14.5) / 3.0) - 21.0;
        let expected = raw / (1.0 - 18.0 / 210.0);
        assert!((r.statistic - expected).abs() < 1e-12);
    }

    #[test]
    fn identical_groups_give_zero_statistic() {
        let a = [1.0, 2.0, 3.0];
        let r = kruskal_wallis(&[&a, &a]).unwrap();
        assert!(r.statistic.abs() < 1e-9);
        assert!(r.p_value > 0.999);
    }

    #[test]
    fn degenerate_inputs() {
        let a = [1.0, 2.0];
        assert_eq!(kruskal_wallis(&[&a]), Err(StatsError::TooFewGroups(1)));
        assert_eq!(kruskal_wallis(&[&a, &[]]), Err(StatsError::EmptyGroup(1)));
        let same = [4.0, 4.0];
        assert_eq!(kruskal_wallis(&[&same, &same]), Err(StatsError::AllIdentical));
        let bad = [f64::NAN];
        assert_eq!(kruskal_wallis(&[&a, &bad]), Err(StatsError::NonFinite));
    }
}
