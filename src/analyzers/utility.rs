/// Computes the arithmetic mean of the present values, skipping missing ones.
/// Returns `None` when no value is present.
///
/// Uses a running mean, so a series of identical values averages to exactly
/// that value.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut running = None;
    let mut count = 0usize;

    for v in values.into_iter().flatten().filter(|v| !v.is_nan()) {
        count += 1;
        running = Some(match running {
            None => v,
            Some(m) => m + (v - m) / count as f64,
        });
    }

    running
}

/// Linear-interpolation quantile (the common "type 7" estimator).
///
/// `q` is clamped to `[0, 1]`. Returns `None` for empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let frac = h - lo as f64;

    if frac == 0.0 || lo + 1 >= sorted.len() {
        Some(sorted[lo])
    } else {
        Some(sorted[lo] + (sorted[lo + 1] - sorted[lo]) * frac)
    }
}

/// Rounds half to even at the given number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_skips_missing() {
        assert_eq!(mean([Some(1.0), None, Some(3.0)]), Some(2.0));
    }

    #[test]
    fn test_mean_of_identical_values_is_exact() {
        let v = 0.123_456_789;
        assert_eq!(mean(std::iter::repeat_n(Some(v), 3)), Some(v));
    }

    #[test]
    fn test_mean_all_missing() {
        assert_eq!(mean([None, None]), None);
        assert_eq!(mean(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // h = 3 * 0.5 = 1.5 -> halfway between 2 and 3
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 2.5);
        assert_relative_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 4.0);
    }

    #[test]
    fn test_quantile_unsorted_input() {
        let values: Vec<f64> = (1..=100).rev().map(f64::from).collect();
        // h = 99 * 0.02 = 1.98 -> 2 + 0.98
        assert_relative_eq!(quantile(&values, 0.02).unwrap(), 2.98, epsilon = 1e-9);
        assert_relative_eq!(quantile(&values, 0.98).unwrap(), 98.02, epsilon = 1e-9);
    }

    #[test]
    fn test_quantile_empty() {
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(82.34, 1), 82.3);
        assert_eq!(round_to(105499.6, 0), 105500.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
    }
}
