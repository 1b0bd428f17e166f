//! Benjamini–Hochberg false discovery rate correction.
//!
//! Used when the same question is asked once per sentiment label, so the
//! family is "all completed comparisons in one run".

use serde::{Deserialize, Serialize};

/// BH-adjusted result for a single labelled p-value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdrResult {
    pub label: String,
    pub raw_p: f64,
    pub adjusted_p: f64,
    /// `adjusted_p <= alpha`.
    pub significant: bool,
}

/// Apply the Benjamini–Hochberg step-up procedure.
///
/// `adjusted_p_(k) = min(p_(k) · m / k, adjusted_p_(k+1))`, clamped to 1.
/// Results come back in input order.
pub fn benjamini_hochberg(p_values: &[(String, f64)], alpha: f64) -> Vec<FdrResult> {
    if p_values.is_empty() {
        return Vec::new();
    }
    let m = p_values.len();

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].1.total_cmp(&p_values[b].1));

    let mut adjusted = vec![0.0; m];
    let mut running = 1.0_f64;
    for (k, &idx) in order.iter().enumerate().rev() {
        let corrected = p_values[idx].1 * m as f64 / (k + 1) as f64;
        running = running.min(corrected).min(1.0);
        adjusted[idx] = running;
    }

    p_values
        .iter()
        .zip(adjusted)
        .map(|((label, raw_p), adjusted_p)| FdrResult {
            label: label.clone(),
            raw_p: *raw_p,
            adjusted_p,
            significant: adjusted_p <= alpha,
        })
        .collect()
}
