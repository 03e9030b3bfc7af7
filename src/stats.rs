//! Negative-binomial significance test and Benjamini-Hochberg correction.

/// Method-of-moments negative-binomial parameters for one row of counts.
///
/// Returns `(size, prob)` with `size = mean² / (variance − mean)` and
/// `prob = mean / variance`, or `None` when the row is not overdispersed
/// (`variance <= mean`) and the fit is undefined.
pub fn fit_negative_binomial(counts: &[f64]) -> Option<(f64, f64)> {
    if counts.is_empty() {
        return None;
    }
    let n = counts.len() as f64;
    let mean = counts.iter().sum::<f64>() / n;
    // Population variance
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    if variance > mean {
        Some((mean * mean / (variance - mean), mean / variance))
    } else {
        None
    }
}

/// One-sided p-value `1 − CDF(0)` of the fitted distribution.
///
/// For a negative binomial with `size` successes and success probability
/// `prob`, `CDF(0) = prob^size`. Rows that are not overdispersed get `0`.
pub fn negative_binomial_pvalue(counts: &[f64]) -> f64 {
    match fit_negative_binomial(counts) {
        Some((size, prob)) => {
            let p = 1.0 - prob.powf(size);
            if p.is_nan() {
                0.0
            } else {
                p
            }
        }
        None => 0.0,
    }
}

/// Benjamini-Hochberg adjusted p-values, in input order.
///
/// Each sorted p-value is scaled by `n / rank`, made monotone from the
/// largest rank down and capped at 1.
pub fn benjamini_hochberg(pvalues: &[f64]) -> Vec<f64> {
    let n = pvalues.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| pvalues[a].total_cmp(&pvalues[b]));

    let mut adjusted = vec![0.0; n];
    let mut running_min = f64::INFINITY;
    for (rank0, &i) in order.iter().enumerate().rev() {
        let scaled = pvalues[i] * n as f64 / (rank0 + 1) as f64;
        running_min = running_min.min(scaled);
        adjusted[i] = running_min.min(1.0);
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_fit_overdispersed_row() {
        // mean 5, population variance 25
        let (size, prob) = fit_negative_binomial(&[0.0, 10.0]).unwrap();
        assert!(close(size, 25.0 / 20.0));
        assert!(close(prob, 0.2));
    }

    #[test]
    fn test_non_overdispersed_rows() {
        assert!(fit_negative_binomial(&[5.0, 5.0]).is_none());
        // mean 5, variance 1
        assert!(fit_negative_binomial(&[4.0, 6.0]).is_none());
        assert_eq!(negative_binomial_pvalue(&[4.0, 6.0]), 0.0);
        assert_eq!(negative_binomial_pvalue(&[]), 0.0);
    }

    #[test]
    fn test_pvalue() {
        let p = negative_binomial_pvalue(&[0.0, 10.0]);
        assert!(close(p, 1.0 - 0.2f64.powf(1.25)));
    }

    #[test]
    fn test_benjamini_hochberg() {
        let adjusted = benjamini_hochberg(&[0.01, 0.04, 0.03, 0.20]);
        // Sorted: 0.01*4/1=0.04, 0.03*4/2=0.06, 0.04*4/3=0.0533, 0.20*4/4=0.20
        // Monotone from the top: 0.04, 0.0533, 0.0533, 0.20
        assert!(close(adjusted[0], 0.04));
        assert!(close(adjusted[1], 0.04 * 4.0 / 3.0));
        assert!(close(adjusted[2], 0.04 * 4.0 / 3.0));
        assert!(close(adjusted[3], 0.20));
    }

    #[test]
    fn test_benjamini_hochberg_caps_at_one() {
        let adjusted = benjamini_hochberg(&[0.9, 0.8]);
        assert!(adjusted.iter().all(|&p| p <= 1.0));
        assert!(close(adjusted[0], 0.9));
        assert!(close(adjusted[1], 0.9));
        assert!(benjamini_hochberg(&[]).is_empty());
    }
}
