//! Core traits for preprocessing transformers.
//!
//! This module defines the two central traits:
//! - [`Transformer`]: Used during fitting; has hyperparameters and can learn from data.
//! - [`FittedTransformer`]: After fitting; ready for inference and serialization.
//!
//! Splitting the two phases into distinct types means a transformer that has
//! not been fitted has no `transform` method at all.

use crate::error::Result;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for unfitted transformers with hyperparameters.
///
/// A transformer learns parameters from training data and can then transform
/// new data using those learned parameters. This trait represents the
/// configurable, unfitted state.
///
/// # Example
/// ```ignore
/// use parcel_price::preprocessing::{StandardScaler, Transformer, FittedTransformer};
///
/// let fitted = StandardScaler::new().fit(&train_block)?;
/// let scaled = fitted.transform(&test_block)?;
/// ```
pub trait Transformer {
    /// Input data type (a [`Frame`](crate::dataset::Frame) or a numeric block).
    type Input: ?Sized;
    /// The fitted transformer type ready for inference.
    type Fitted: FittedTransformer<Input = Self::Input>;

    /// Fit the transformer to the training data.
    ///
    /// # Errors
    /// Returns an error if the data is empty or does not have the columns
    /// the transformer was configured for.
    fn fit(&self, data: &Self::Input) -> Result<Self::Fitted>;

    /// Fit the transformer and transform the data in one step.
    fn fit_transform(&self, data: &Self::Input) -> Result<Array2<f64>> {
        let fitted = self.fit(data)?;
        fitted.transform(data)
    }
}

/// Trait for fitted transformers ready for inference.
///
/// Fitted transformers are plain serde types, persisted as part of a fitted
/// model.
pub trait FittedTransformer: Clone + Serialize + DeserializeOwned {
    /// Input data type for transformation.
    type Input: ?Sized;

    /// Transform data using learned parameters into an `(n_rows, n_features_out)` block.
    ///
    /// # Errors
    /// Returns a schema mismatch if the input does not have the shape or
    /// columns seen during fit.
    fn transform(&self, data: &Self::Input) -> Result<Array2<f64>>;

    /// Names of the produced columns, in output order.
    fn feature_names_out(&self) -> Vec<String>;

    /// Number of produced columns.
    fn n_features_out(&self) -> usize {
        self.feature_names_out().len()
    }
}
