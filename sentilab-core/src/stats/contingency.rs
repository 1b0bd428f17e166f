//! Pearson χ² test of independence on an r × c table of counts.

use super::distributions::chi2_sf;
use super::StatsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
    pub expected: Vec<Vec<f64>>,
    /// Yates' continuity correction is applied when dof == 1.
    pub yates_corrected: bool,
}

/// χ² test of independence.
///
/// Expected frequencies are `row_total · col_total / n`. With one degree of
/// freedom each observed count is moved up to 0.5 towards its expected value
/// before the statistic is formed. With zero degrees of freedom the statistic
/// is 0 and p = 1.
pub fn chi2_contingency(observed: &[Vec<u64>]) -> Result<ContingencyResult, StatsError> {
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }
    if observed.iter().any(|r| r.len() != cols) {
        return Err(StatsError::RaggedTable);
    }

    let row_totals: Vec<f64> = observed
        .iter()
        .map(|r| r.iter().sum::<u64>() as f64)
        .collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|j| observed.iter().map(|r| r[j]).sum::<u64>() as f64)
        .collect();
    let total: f64 = row_totals.iter().sum();
    if total == 0.0 {
        return Err(StatsError::InsufficientData { needed: 1, got: 0 });
    }

    let expected: Vec<Vec<f64>> = row_totals
        .iter()
        .map(|rt| col_totals.iter().map(|ct| rt * ct / total).collect())
        .collect();
    if expected.iter().flatten().any(|&e| e == 0.0) {
        return Err(StatsError::ZeroExpected);
    }

    let dof = (rows - 1) * (cols - 1);
    if dof == 0 {
        return Ok(ContingencyResult {
            statistic: 0.0,
            p_value: 1.0,
            dof,
            expected,
            yates_corrected: false,
        });
    }

    let yates_corrected = dof == 1;
    let mut statistic = 0.0;
    for (obs_row, exp_row) in observed.iter().zip(&expected) {
        for (&o, &e) in obs_row.iter().zip(exp_row) {
            let mut o = o as f64;
            if yates_corrected {
                let diff = e - o;
                o += diff.signum() * diff.abs().min(0.5);
            }
            statistic += (o - e) * (o - e) / e;
        }
    }

    let p_value = chi2_sf(statistic, dof as f64)?;
    Ok(ContingencyResult {
        statistic,
        p_value,
        dof,
        expected,
        yates_corrected,
    })
}

/// Indices of rows and columns whose marginal total is non-zero, and the
/// table restricted to them.
pub fn trim_empty_margins(observed: &[Vec<u64>]) -> (Vec<usize>, Vec<usize>, Vec<Vec<u64>>) {
    let cols = observed.first().map_or(0, Vec::len);
    let kept_rows: Vec<usize> = (0..observed.len())
        .filter(|&i| observed[i].iter().sum::<u64>() > 0)
        .collect();
    let kept_cols: Vec<usize> = (0..cols)
        .filter(|&j| observed.iter().map(|r| r[j]).sum::<u64>() > 0)
        .collect();
    let table = kept_rows
        .iter()
        .map(|&i| kept_cols.iter().map(|&j| observed[i][j]).collect())
        .collect();
    (kept_rows, kept_cols, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_by_two_uses_yates() {
        let table = vec![vec![5, 0], vec![0, 5]];
        let r = chi2_contingency(&table).unwrap();
        // expected 2.5 everywhere, corrected |o-e| = 2.0 -> 4 * 4/2.5 = 6.4
        assert!(r.yates_corrected);
        assert_eq!(r.dof, 1);
        assert!((r.statistic - 6.4).abs() < 1e-12);
        assert!(r.p_value < 0.05);
        assert_eq!(r.expected, vec![vec![2.5, 2.5], vec![2.5, 2.5]]);
    }

    #[test]
    fn yates_never_overshoots_expected() {
        // every |o - e| is 2/9 < 0.5, so each cell lands exactly on e
        let table = vec![vec![3, 2], vec![2, 2]];
        let r = chi2_contingency(&table).unwrap();
        assert!(r.statistic.abs() < 1e-9);
    }

    #[test]
    fn larger_table_no_correction() {
        let table = vec![vec![10, 20], vec![20, 10], vec![15, 15]];
        let r = chi2_contingency(&table).unwrap();
        assert!(!r.yates_corrected);
        assert_eq!(r.dof, 2);
        // expected 15 everywhere; Σ (o-e)²/e = 4 * 25/15 = 6.6667
        assert!((r.statistic - 20.0 / 3.0).abs() < 1e-12);
        assert!((r.p_value - (-10.0_f64 / 3.0).exp()).abs() < 1e-10);
    }

    #[test]
    fn single_column_has_zero_dof() {
        let table = vec![vec![4], vec![7]];
        let r = chi2_contingency(&table).unwrap();
        assert_eq!(r.dof, 0);
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn zero_margin_is_rejected_then_trimmed() {
        let table = vec![vec![3, 4], vec![0, 0], vec![5, 1]];
        assert_eq!(chi2_contingency(&table), Err(StatsError::ZeroExpected));

        let (rows, cols, trimmed) = trim_empty_margins(&table);
        assert_eq!(rows, vec![0, 2]);
        assert_eq!(cols, vec![0, 1]);
        assert_eq!(trimmed, vec![vec![3, 4], vec![5, 1]]);
        assert!(chi2_contingency(&trimmed).is_ok());
    }

    #[test]
    fn malformed_tables() {
        assert!(matches!(
            chi2_contingency(&[]),
            Err(StatsError::InsufficientData { .. })
        ));
        assert_eq!(
            chi2_contingency(&[vec![1, 2], vec![3]]),
            Err(StatsError::RaggedTable)
        );
    }
}
