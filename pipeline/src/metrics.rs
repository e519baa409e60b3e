//! Evaluation metrics reported after training.
//!
//! Besides the usual regression metrics, [`Metrics::deviation_score`] is the
//! asymmetric price-deviation penalty: a relative error within ±15% costs
//! nothing, larger errors cost quadratically up to a cap of 9, and
//! under-prediction is weighted 1.1×.

use parcel_price::stats;
use std::fmt;

/// Relative error tolerated without penalty.
pub const THRESHOLD: f64 = 0.15;

/// Extra weight applied to under-prediction.
pub const NEGATIVE_WEIGHT: f64 = 1.1;

/// Penalty of a prediction off by four thresholds or more (before weighting).
pub const MAX_PENALTY: f64 = 9.0;

/// Regression metrics for evaluating price predictions.
pub struct Metrics;

impl Metrics {
    /// Mean Absolute Percentage Error.
    ///
    /// Targets of zero are guarded with machine epsilon. Returns 0 for empty
    /// input.
    pub fn mape(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum: f64 = absolute_percentage_errors(y_true, y_pred).sum();
        sum / y_true.len() as f64
    }

    /// Median Absolute Percentage Error.
    pub fn mdape(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");
        let errors: Vec<f64> = absolute_percentage_errors(y_true, y_pred).collect();
        stats::median(&errors).unwrap_or(0.0)
    }

    /// Root Mean Squared Error.
    pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        (sum / y_true.len() as f64).sqrt()
    }

    /// Coefficient of determination (R²).
    ///
    /// R² = 1 - SS_res / SS_tot. A constant target scores 1 when predicted
    /// exactly and 0 otherwise.
    pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");
        let Some(mean_true) = stats::mean(y_true) else {
            return 0.0;
        };

        let ss_res: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| (t - p).powi(2))
            .sum();
        let ss_tot: f64 = y_true.iter().map(|&t| (t - mean_true).powi(2)).sum();

        if ss_tot == 0.0 {
            return if ss_res == 0.0 { 1.0 } else { 0.0 };
        }
        1.0 - ss_res / ss_tot
    }

    /// Penalty of a single prediction.
    pub fn deviation_penalty(y_true: f64, y_pred: f64) -> f64 {
        let deviation = (y_pred - y_true) / y_true;
        let scaled = deviation / THRESHOLD;
        if deviation.abs() <= THRESHOLD {
            0.0
        } else if deviation <= -4.0 * THRESHOLD {
            MAX_PENALTY * NEGATIVE_WEIGHT
        } else if deviation < -THRESHOLD {
            NEGATIVE_WEIGHT * (scaled + 1.0).powi(2)
        } else if deviation < 4.0 * THRESHOLD {
            (scaled - 1.0).powi(2)
        } else {
            MAX_PENALTY
        }
    }

    /// Mean deviation penalty. Returns 0 for empty input.
    pub fn deviation_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "Arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let sum: f64 = y_true
            .iter()
            .zip(y_pred)
            .map(|(&t, &p)| Self::deviation_penalty(t, p))
            .sum();
        sum / y_true.len() as f64
    }

    /// Compute every metric at once.
    pub fn calculate_all(y_true: &[f64], y_pred: &[f64]) -> RegressionMetrics {
        RegressionMetrics {
            n_samples: y_true.len(),
            mape: Self::mape(y_true, y_pred),
            mdape: Self::mdape(y_true, y_pred),
            rmse: Self::rmse(y_true, y_pred),
            r_squared: Self::r_squared(y_true, y_pred),
            deviation: Self::deviation_score(y_true, y_pred),
        }
    }
}

fn absolute_percentage_errors<'a>(
    y_true: &'a [f64],
    y_pred: &'a [f64],
) -> impl Iterator<Item = f64> + 'a {
    y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).abs() / t.abs().max(f64::EPSILON))
}

/// Snapshot of every metric for one evaluation subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionMetrics {
    pub n_samples: usize,
    pub mape: f64,
    pub mdape: f64,
    pub rmse: f64,
    pub r_squared: f64,
    pub deviation: f64,
}

impl fmt::Display for RegressionMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} mape={:.4} mdape={:.4} rmse={:.2} r2={:.4} deviation={:.4}",
            self.n_samples, self.mape, self.mdape, self.rmse, self.r_squared, self.deviation
        )
    }
}
