//! Linear regression trained by full-batch gradient descent.
//!
//! - [`LinearRegression`]: hyperparameters, used during training.
//! - [`FittedLinearRegression`]: inference-only, serializable predictor.
//!
//! The fitted model is free from training hyperparameters.
//!
//! Training minimises the ridge objective
//!
//! ```text
//! loss(w, b) = mean((X·w + b - y)²) + l2 · ‖w‖²
//! ```
//!
//! on internally standardized features, with a step size bounded by the
//! inverse of a Lipschitz bound on the gradient. The learned weights are
//! folded back into input units, so [`FittedLinearRegression`] applies to
//! the raw feature matrix. Columns of very different magnitude (for
//! example ordinal codes next to z-scores) train at the same rate.

use super::{FittedLearner, Learner};
use crate::error::{Error, Result, SchemaMismatch};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Hyperparameters of [`LinearRegression`].
///
/// Defaults:
/// - `learning_rate`: 0.05
/// - `max_epochs`: 5000
/// - `l2`: 1e-4
/// - `tolerance`: 1e-8
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearRegressionConfig {
    /// Upper bound on the gradient step.
    pub learning_rate: f64,
    /// Maximum number of full passes over the data.
    pub max_epochs: usize,
    /// Ridge penalty on the weights (the bias is not penalised).
    pub l2: f64,
    /// Training stops once the gradient norm falls below this value.
    pub tolerance: f64,
}

impl Default for LinearRegressionConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.05,
            max_epochs: 5000,
            l2: 1e-4,
            tolerance: 1e-8,
        }
    }
}

impl LinearRegressionConfig {
    fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "l2 penalty must be non-negative, got {}",
                self.l2
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Unfitted linear regression.
///
/// ```rust
/// use ndarray::array;
/// use parcel_price::model::{FittedLearner, Learner, LinearRegression};
///
/// let x = array![[0.0], [1.0], [2.0], [3.0]];
/// let y = array![1.0, 3.0, 5.0, 7.0];
/// let fitted = LinearRegression::default().fit(&x, &y).unwrap();
/// let pred = fitted.predict(&array![[4.0]]).unwrap();
/// assert!((pred[0] - 9.0).abs() < 1e-2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LinearRegression {
    config: LinearRegressionConfig,
}

impl LinearRegression {
    /// Create a learner with the given hyperparameters.
    pub fn new(config: LinearRegressionConfig) -> Self {
        Self { config }
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.config.max_epochs = epochs;
        self
    }

    pub fn l2(mut self, l2: f64) -> Self {
        self.config.l2 = l2;
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Hyperparameters.
    pub fn config(&self) -> &LinearRegressionConfig {
        &self.config
    }
}

/// Trained linear model: `y = x·w + b`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedLinearRegression {
    weights: Vec<f64>,
    bias: f64,
    n_epochs: usize,
}

impl FittedLinearRegression {
    /// Build a model from explicit parameters.
    pub fn from_params(weights: Vec<f64>, bias: f64) -> Self {
        Self {
            weights,
            bias,
            n_epochs: 0,
        }
    }

    /// Learned weights, one per feature.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Learned intercept.
    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Epochs run before convergence or the epoch limit.
    pub fn n_epochs(&self) -> usize {
        self.n_epochs
    }
}

impl Learner for LinearRegression {
    type Fitted = FittedLinearRegression;

    fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedLinearRegression> {
        self.config.validate()?;
        let (n, d) = x.dim();
        if n == 0 {
            return Err(Error::EmptyData(
                "Cannot fit LinearRegression on empty data".to_string(),
            ));
        }
        if y.len() != n {
            return Err(Error::InvalidInput(format!(
                "{n} feature rows but {} targets",
                y.len()
            )));
        }
        if !x.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidInput(
                "features contain non-finite values".to_string(),
            ));
        }
        if !y.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidInput(
                "targets contain non-finite values".to_string(),
            ));
        }

        let (center, scale) = column_moments(x);
        let mut z = x.to_owned();
        for mut row in z.rows_mut() {
            row -= &center;
            row /= &scale;
        }

        let n_f = n as f64;
        let l2 = self.config.l2;
        // Lipschitz bound of the gradient, bias column included.
        let lipschitz = 2.0 * (z.iter().map(|v| v * v).sum::<f64>() + n_f) / n_f + 2.0 * l2;
        let step = self.config.learning_rate.min(1.0 / lipschitz);

        let mut weights = Array1::<f64>::zeros(d);
        let mut bias = y.mean().unwrap_or(0.0);
        let mut n_epochs = 0;
        let mut loss = f64::NAN;

        for epoch in 0..self.config.max_epochs {
            n_epochs = epoch + 1;
            let residual = z.dot(&weights) + bias - y;
            loss = residual.mapv(|r| r * r).sum() / n_f + l2 * weights.dot(&weights);
            if !loss.is_finite() {
                return Err(Error::InvalidInput(format!(
                    "linear regression diverged at epoch {epoch}"
                )));
            }

            let grad_w = z.t().dot(&residual) * (2.0 / n_f) + &weights * (2.0 * l2);
            let grad_b = 2.0 * residual.sum() / n_f;
            let grad_norm = (grad_w.dot(&grad_w) + grad_b * grad_b).sqrt();
            tracing::trace!(epoch, loss, grad_norm, "linear regression epoch");
            if grad_norm < self.config.tolerance {
                break;
            }

            weights.scaled_add(-step, &grad_w);
            bias -= step * grad_b;
        }

        tracing::debug!(
            rows = n,
            features = d,
            epochs = n_epochs,
            loss,
            "fitted linear regression"
        );

        let weights = weights / &scale;
        let bias = bias - center.dot(&weights);
        Ok(FittedLinearRegression {
            weights: weights.to_vec(),
            bias,
            n_epochs,
        })
    }
}

/// Column means and standard deviations; constant columns get unit scale.
fn column_moments(x: &Array2<f64>) -> (Array1<f64>, Array1<f64>) {
    let d = x.ncols();
    let center = x
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(d));
    let scale = x.var_axis(Axis(0), 0.0).mapv(|v| {
        let s = v.sqrt();
        if s.is_finite() && s > 0.0 {
            s
        } else {
            1.0
        }
    });
    (center, scale)
}

impl FittedLearner for FittedLinearRegression {
    const KIND: &'static str = "linear_regression";

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.weights.len() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.weights.len(),
                got: x.ncols(),
            }
            .into());
        }
        let weights = Array1::from(self.weights.clone());
        Ok(x.dot(&weights) + self.bias)
    }

    fn n_features_in(&self) -> usize {
        self.weights.len()
    }
}
