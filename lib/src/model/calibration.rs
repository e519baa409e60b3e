//! Correction coefficient learned from the manual-price subset.
//!
//! A learner fitted on offer prices is systematically biased relative to
//! appraiser-assessed (manual) prices. A single scalar `c` rescales raw
//! predictions so that `manual_price ≈ c · raw_prediction` in aggregate.
//!
//! The default statistic is the median relative deviation
//!
//! ```text
//! d = median((y - p) / p),   c = 1 + d
//! ```
//!
//! When the statistic cannot be trusted (too few manual rows, non-finite, or
//! non-positive result) the coefficient falls back to 1 and a warning is
//! recorded and logged.

use crate::error::{Error, Result};
use crate::stats;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the correction coefficient is derived from manual rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStatistic {
    /// `c = 1 + median((y - p) / p)`.
    #[default]
    MedianRelativeDeviation,
    /// `c = median(y) / median(p)`.
    RatioOfMedians,
    /// `c = Σy / Σp`.
    RatioOfSums,
}

/// Calibration settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Fewer usable manual rows than this yields `c = 1`.
    pub min_manual_rows: usize,
    /// Statistic used to compute `c`.
    pub statistic: CorrectionStatistic,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            min_manual_rows: 1,
            statistic: CorrectionStatistic::default(),
        }
    }
}

/// Why the coefficient fell back to 1.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum CalibrationWarning {
    #[error("only {got} usable manual rows, at least {required} required")]
    TooFewManualRows { got: usize, required: usize },
    #[error("correction statistic is not finite")]
    NonFiniteStatistic,
    #[error("correction coefficient {0} is not positive")]
    NonPositiveCoefficient(f64),
}

/// Fitted correction: the coefficient and how it was obtained.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    coefficient: f64,
    n_samples: usize,
    statistic: CorrectionStatistic,
    raw_statistic: Option<f64>,
    warning: Option<CalibrationWarning>,
}

impl Calibration {
    /// Calibration that leaves predictions unchanged.
    pub fn identity(statistic: CorrectionStatistic) -> Self {
        Self {
            coefficient: 1.0,
            n_samples: 0,
            statistic,
            raw_statistic: None,
            warning: None,
        }
    }

    fn fallback(
        statistic: CorrectionStatistic,
        n_samples: usize,
        raw_statistic: Option<f64>,
        warning: CalibrationWarning,
    ) -> Self {
        tracing::warn!(%warning, n_samples, "correction coefficient falls back to 1");
        Self {
            coefficient: 1.0,
            n_samples,
            statistic,
            raw_statistic,
            warning: Some(warning),
        }
    }

    /// Multiplier applied to raw predictions.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// `c - 1`, the relative deviation of manual prices from raw predictions.
    pub fn deviation(&self) -> f64 {
        self.coefficient - 1.0
    }

    /// Number of manual rows the statistic was computed from.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Statistic kind.
    pub fn statistic(&self) -> CorrectionStatistic {
        self.statistic
    }

    /// Value of the statistic before any fallback, if it could be computed.
    pub fn raw_statistic(&self) -> Option<f64> {
        self.raw_statistic
    }

    /// Fallback reason, if any.
    pub fn warning(&self) -> Option<&CalibrationWarning> {
        self.warning.as_ref()
    }

    /// Whether `c` was forced to 1.
    pub fn is_fallback(&self) -> bool {
        self.warning.is_some()
    }

    /// Corrected predictions `raw · c`.
    pub fn apply(&self, raw: &Array1<f64>) -> Array1<f64> {
        raw * self.coefficient
    }

    /// Undo the correction: `corrected / c`.
    pub fn remove(&self, corrected: &Array1<f64>) -> Array1<f64> {
        corrected / self.coefficient
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if !(self.coefficient.is_finite() && self.coefficient > 0.0) {
            return Err(format!(
                "correction coefficient {} is not a positive finite number",
                self.coefficient
            ));
        }
        Ok(())
    }
}

/// Compute the correction from raw predictions and true manual prices.
///
/// Rows whose raw prediction is zero or non-finite, or whose target is not
/// finite, are ignored.
///
/// # Errors
/// `InvalidInput` if the two vectors differ in length.
pub fn calibrate(
    config: &CalibrationConfig,
    predictions: &Array1<f64>,
    targets: &Array1<f64>,
) -> Result<Calibration> {
    if predictions.len() != targets.len() {
        return Err(Error::InvalidInput(format!(
            "{} predictions but {} manual prices",
            predictions.len(),
            targets.len()
        )));
    }

    let (preds, ys): (Vec<f64>, Vec<f64>) = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, y)| p.is_finite() && **p != 0.0 && y.is_finite())
        .map(|(&p, &y)| (p, y))
        .unzip();
    let n_samples = preds.len();
    let statistic = config.statistic;

    if n_samples < config.min_manual_rows {
        return Ok(Calibration::fallback(
            statistic,
            n_samples,
            None,
            CalibrationWarning::TooFewManualRows {
                got: n_samples,
                required: config.min_manual_rows,
            },
        ));
    }

    let (raw, coefficient) = match statistic {
        CorrectionStatistic::MedianRelativeDeviation => {
            let relative: Vec<f64> = preds.iter().zip(&ys).map(|(p, y)| (y - p) / p).collect();
            let d = stats::median(&relative);
            (d, d.map(|d| 1.0 + d))
        }
        CorrectionStatistic::RatioOfMedians => {
            let c = stats::median(&ys).zip(stats::median(&preds)).map(|(y, p)| y / p);
            (c, c)
        }
        CorrectionStatistic::RatioOfSums => {
            let c = (n_samples > 0).then(|| ys.iter().sum::<f64>() / preds.iter().sum::<f64>());
            (c, c)
        }
    };

    let coefficient = match coefficient {
        Some(c) if c.is_finite() => c,
        _ => {
            return Ok(Calibration::fallback(
                statistic,
                n_samples,
                raw,
                CalibrationWarning::NonFiniteStatistic,
            ))
        }
    };
    if coefficient <= 0.0 {
        return Ok(Calibration::fallback(
            statistic,
            n_samples,
            raw,
            CalibrationWarning::NonPositiveCoefficient(coefficient),
        ));
    }

    tracing::debug!(coefficient, n_samples, ?statistic, "calibrated correction coefficient");
    Ok(Calibration {
        coefficient,
        n_samples,
        statistic,
        raw_statistic: raw,
        warning: None,
    })
}
