//! Pairwise correlation kernels.
//!
//! Every kernel evaluates the rows where both inputs are finite and returns `None` when fewer than
//! two such rows remain or either side has no variance. Results are clamped to `[-1.0, 1.0]`.

use itertools::Itertools;
use std::cmp::Ordering;

const MIN_OBSERVATIONS: usize = 2;

/// Rows where both values are finite.
pub fn complete_pairs(a: &[f64], b: &[f64]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (*x, *y))
        .unzip()
}

/// Pearson correlation coefficient.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let (a, b) = complete_pairs(a, b);
    pearson_complete(&a, &b)
}

fn pearson_complete(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < MIN_OBSERVATIONS {
        return None;
    }

    let n = a.len() as f64;
    let mean_a: f64 = a.iter().sum::<f64>() / n;
    let mean_b: f64 = b.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    let mut sum_sq_a = 0.0;
    let mut sum_sq_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        let diff_a = x - mean_a;
        let diff_b = y - mean_b;
        cov += diff_a * diff_b;
        var_a += diff_a * diff_a;
        var_b += diff_b * diff_b;
        sum_sq_a += x * x;
        sum_sq_b += y * y;
    }

    // Relative to the magnitude of the data
    if is_constant(var_a, sum_sq_a) || is_constant(var_b, sum_sq_b) {
        return None;
    }

    Some((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

/// Centred sum of squares indistinguishable from rounding noise.
fn is_constant(centred_sum_sq: f64, raw_sum_sq: f64) -> bool {
    centred_sum_sq <= f64::EPSILON * raw_sum_sq
}

/// Spearman rank correlation: Pearson over average ranks.
pub fn spearman(a: &[f64], b: &[f64]) -> Option<f64> {
    let (a, b) = complete_pairs(a, b);
    pearson_complete(&average_ranks(&a), &average_ranks(&b))
}

/// Kendall tau-b, corrected for ties on either side.
pub fn kendall(a: &[f64], b: &[f64]) -> Option<f64> {
    let (a, b) = complete_pairs(a, b);
    if a.len() < MIN_OBSERVATIONS {
        return None;
    }

    let mut concordant = 0_u64;
    let mut discordant = 0_u64;
    let mut ties_a = 0_u64;
    let mut ties_b = 0_u64;

    for (i, j) in (0..a.len()).tuple_combinations() {
        let order_a = a[i].partial_cmp(&a[j]).unwrap_or(Ordering::Equal);
        let order_b = b[i].partial_cmp(&b[j]).unwrap_or(Ordering::Equal);

        match (order_a, order_b) {
            (Ordering::Equal, Ordering::Equal) => {
                ties_a += 1;
                ties_b += 1;
            }
            (Ordering::Equal, _) => ties_a += 1,
            (_, Ordering::Equal) => ties_b += 1,
            (x, y) if x == y => concordant += 1,
            _ => discordant += 1,
        }
    }

    let total = (a.len() * (a.len() - 1) / 2) as u64;
    let denominator = ((total - ties_a) as f64 * (total - ties_b) as f64).sqrt();
    if denominator == 0.0 {
        return None;
    }

    let tau = (concordant as f64 - discordant as f64) / denominator;
    Some(tau.clamp(-1.0, 1.0))
}

/// 1-based ranks, tied values share the mean of the ranks they span.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let order: Vec<usize> = (0..values.len())
        .sorted_by(|&x, &y| values[x].total_cmp(&values[y]))
        .collect();

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }

        // Positions start..end hold equal values, ranks start+1..=end
        let rank = (start + 1 + end) as f64 / 2.0;
        for &position in &order[start..end] {
            ranks[position] = rank;
        }
        start = end;
    }

    ranks
}
