//! Small descriptive statistics over `f64` slices.
//!
//! Non-finite values are skipped by every function here.

/// Arithmetic mean of the finite values, `None` if there are none.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Median of the finite values, `None` if there are none.
///
/// Even-length inputs average the two middle values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Population standard deviation (ddof = 0) of the finite values.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let (sq, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), &v| (s + (v - m).powi(2), n + 1));
    Some((sq / count as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_skips_nan() {
        assert_relative_eq!(mean(&[1.0, f64::NAN, 3.0]).unwrap(), 2.0);
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[f64::NAN]), None);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_relative_eq!(median(&[5.0, 1.0, 3.0]).unwrap(), 3.0);
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]).unwrap(), 2.5);
        assert_eq!(median(&[f64::INFINITY]), None);
    }

    #[test]
    fn test_std_dev_population() {
        // [0, 0, 1]: mean 1/3, variance 2/9
        let s = std_dev(&[0.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(s, (2.0f64 / 9.0).sqrt(), epsilon = 1e-12);
    }
}
