//! Learners and the dual-regime benchmark model.
//!
//! Training and inference are separate types: an unfitted learner holds only
//! hyperparameters, and `fit` produces a fitted learner that holds only
//! prediction parameters. A fitted value is never constructed without
//! training, so predicting with an untrained model does not type-check.

pub mod benchmark;
pub mod calibration;
pub mod linear;

pub use benchmark::{BenchmarkModel, FitReport, FittedBenchmarkModel};
pub use calibration::{
    calibrate, Calibration, CalibrationConfig, CalibrationWarning, CorrectionStatistic,
};
pub use linear::{FittedLinearRegression, LinearRegression, LinearRegressionConfig};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Unfitted regression learner: hyperparameters only.
pub trait Learner {
    /// Trained state produced by [`Learner::fit`].
    type Fitted: FittedLearner;

    /// Train on `(n_rows, n_features)` features and `n_rows` targets.
    fn fit(&self, features: &Array2<f64>, targets: &Array1<f64>) -> Result<Self::Fitted>;
}

/// Trained learner ready for inference and persistence.
pub trait FittedLearner: Clone + Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Tag stored in model artifacts; loading checks it.
    const KIND: &'static str;

    /// One prediction per row.
    ///
    /// # Errors
    /// A schema mismatch if the feature width differs from training.
    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>>;

    /// Feature width seen during training.
    fn n_features_in(&self) -> usize;
}
