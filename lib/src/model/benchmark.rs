//! Dual-regime benchmark model.
//!
//! The model is fitted on two disjoint row sets:
//!
//! - **offer** rows (listing prices, abundant, biased) train the feature
//!   assembler and the learner;
//! - **manual** rows (appraiser prices, scarce) only calibrate the scalar
//!   correction coefficient applied to every prediction.
//!
//! ```text
//! offer ──► FeatureAssembler::fit ──► Learner::fit
//!                    │                     │
//! manual ────────────┴──► assemble ──► predict ──► calibrate ──► c
//!
//! predict(rows) = learner(assemble(rows)) · c
//! ```

use super::calibration::{calibrate, Calibration, CalibrationConfig, CalibrationWarning};
use super::linear::LinearRegression;
use super::{FittedLearner, Learner};
use crate::config::{FeatureConfig, ModelConfig};
use crate::dataset::Frame;
use crate::error::{Error, Result, SchemaMismatch};
use crate::persistence;
use crate::preprocessing::{
    FeatureAssembler, FeatureSchema, FittedFeatureAssembler, FittedTransformer, Transformer,
};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unfitted benchmark model: feature configuration, calibration settings
/// and an unfitted learner.
#[derive(Clone, Debug)]
pub struct BenchmarkModel<L> {
    features: FeatureConfig,
    calibration: CalibrationConfig,
    learner: L,
}

impl BenchmarkModel<LinearRegression> {
    /// Model with the default linear learner, configured from a [`ModelConfig`].
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.features.clone(),
            config.calibration.clone(),
            LinearRegression::new(config.learner.clone()),
        )
    }
}

/// Summary of a fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FitReport {
    /// Offer rows used to train.
    pub offer_rows: usize,
    /// Manual rows used to calibrate.
    pub manual_rows: usize,
    /// Width of the feature matrix.
    pub n_features: usize,
    /// The fitted correction.
    pub calibration: Calibration,
    /// Non-fatal problems encountered.
    pub warnings: Vec<CalibrationWarning>,
}

fn targets(frame: &Frame, column: &str, subset: &str) -> Result<Array1<f64>> {
    let values = frame.numeric(column)?;
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "{subset} row {row} has a non-finite `{column}`"
        )));
    }
    Ok(Array1::from(values.to_vec()))
}

impl<L: Learner> BenchmarkModel<L> {
    /// Create a model.
    pub fn new(features: FeatureConfig, calibration: CalibrationConfig, learner: L) -> Self {
        Self {
            features,
            calibration,
            learner,
        }
    }

    /// Feature configuration.
    pub fn features(&self) -> &FeatureConfig {
        &self.features
    }

    /// Fit on disjoint offer and manual subsets.
    ///
    /// # Errors
    /// - `EmptyData` if there are no offer rows
    /// - `InvalidInput` if a target is missing or non-finite
    /// - `SchemaMismatch` if a configured column is absent
    pub fn fit(
        &self,
        offer: &Frame,
        manual: &Frame,
    ) -> Result<(FittedBenchmarkModel<L::Fitted>, FitReport)> {
        if offer.is_empty() {
            return Err(Error::EmptyData("no offer rows to train on".to_string()));
        }
        let target = self.features.target.as_str();
        let offer_y = targets(offer, target, "offer")?;

        let assembler = FeatureAssembler::new(self.features.clone()).fit(offer)?;
        let offer_x = assembler.transform(offer)?;
        let learner = self.learner.fit(&offer_x, &offer_y)?;
        if learner.n_features_in() != assembler.n_features_out() {
            return Err(SchemaMismatch::FeatureCount {
                expected: assembler.n_features_out(),
                got: learner.n_features_in(),
            }
            .into());
        }

        let (manual_raw, manual_y) = if manual.is_empty() {
            (Array1::zeros(0), Array1::zeros(0))
        } else {
            let manual_y = targets(manual, target, "manual")?;
            let raw = learner.predict(&assembler.transform(manual)?)?;
            (raw, manual_y)
        };
        if manual_raw.len() != manual_y.len() {
            return Err(Error::InvalidInput(format!(
                "learner returned {} predictions for {} manual rows",
                manual_raw.len(),
                manual_y.len()
            )));
        }
        let calibration = calibrate(&self.calibration, &manual_raw, &manual_y)?;

        tracing::info!(
            offer_rows = offer.n_rows(),
            manual_rows = manual.n_rows(),
            features = assembler.n_features_out(),
            learner = L::Fitted::KIND,
            coefficient = calibration.coefficient(),
            "fitted benchmark model"
        );

        let report = FitReport {
            offer_rows: offer.n_rows(),
            manual_rows: manual.n_rows(),
            n_features: assembler.n_features_out(),
            warnings: calibration.warning().cloned().into_iter().collect(),
            calibration: calibration.clone(),
        };
        let model = FittedBenchmarkModel {
            assembler,
            learner,
            calibration,
        };
        Ok((model, report))
    }

    /// Split a training frame by price regime and fit.
    pub fn fit_frame(&self, frame: &Frame) -> Result<(FittedBenchmarkModel<L::Fitted>, FitReport)> {
        let split = frame.split_by_regime()?;
        self.fit(&split.offer, &split.manual)
    }
}

/// Fitted benchmark model. Immutable; safe to share across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedBenchmarkModel<F> {
    assembler: FittedFeatureAssembler,
    learner: F,
    calibration: Calibration,
}

#[derive(Serialize)]
struct ArtifactRef<'a, F> {
    learner_kind: &'a str,
    assembler: &'a FittedFeatureAssembler,
    learner: &'a F,
    calibration: &'a Calibration,
}

#[derive(Deserialize)]
struct Artifact<F> {
    learner_kind: String,
    assembler: FittedFeatureAssembler,
    learner: F,
    calibration: Calibration,
}

impl<F: FittedLearner> FittedBenchmarkModel<F> {
    /// Uncorrected learner output.
    pub fn predict_raw(&self, frame: &Frame) -> Result<Array1<f64>> {
        let features = self.assembler.transform(frame)?;
        let raw = self.learner.predict(&features)?;
        if raw.len() != frame.n_rows() {
            return Err(Error::InvalidInput(format!(
                "learner returned {} predictions for {} rows",
                raw.len(),
                frame.n_rows()
            )));
        }
        Ok(raw)
    }

    /// Corrected predictions: `raw · c`.
    pub fn predict(&self, frame: &Frame) -> Result<Array1<f64>> {
        Ok(self.calibration.apply(&self.predict_raw(frame)?))
    }

    /// The correction coefficient `c`.
    pub fn correction(&self) -> f64 {
        self.calibration.coefficient()
    }

    /// Calibration details.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Feature matrix schema.
    pub fn schema(&self) -> &FeatureSchema {
        self.assembler.schema()
    }

    /// Feature configuration the model was fitted with.
    pub fn feature_config(&self) -> &FeatureConfig {
        self.assembler.config()
    }

    /// Fitted feature assembler.
    pub fn assembler(&self) -> &FittedFeatureAssembler {
        &self.assembler
    }

    /// Fitted learner.
    pub fn learner(&self) -> &F {
        &self.learner
    }

    /// Serialize to the versioned model format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        persistence::encode_envelope(&self.artifact())
    }

    /// Restore from bytes produced by [`FittedBenchmarkModel::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_artifact(persistence::decode_envelope(bytes)?)
    }

    /// Write the complete fitted state to `path` atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        persistence::save_envelope(path, &self.artifact())?;
        tracing::debug!(path = %path.display(), "saved model");
        Ok(())
    }

    /// Load a model written by [`FittedBenchmarkModel::save`].
    ///
    /// # Errors
    /// `Persistence` if the file is not a model, is corrupt, was written for
    /// another learner, or is internally inconsistent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::from_artifact(persistence::load_envelope(path)?)?;
        tracing::debug!(path = %path.display(), "loaded model");
        Ok(model)
    }

    /// Load a model and require it to match a feature configuration.
    ///
    /// # Errors
    /// As [`FittedBenchmarkModel::load`], plus
    /// `SchemaMismatch::Configuration` if the model was fitted with other
    /// features.
    pub fn load_expecting<P: AsRef<Path>>(path: P, features: &FeatureConfig) -> Result<Self> {
        let model = Self::load(path)?;
        if model.feature_config() != features {
            return Err(SchemaMismatch::Configuration.into());
        }
        Ok(model)
    }

    fn artifact(&self) -> ArtifactRef<'_, F> {
        ArtifactRef {
            learner_kind: F::KIND,
            assembler: &self.assembler,
            learner: &self.learner,
            calibration: &self.calibration,
        }
    }

    fn from_artifact(artifact: Artifact<F>) -> Result<Self> {
        if artifact.learner_kind != F::KIND {
            return Err(Error::Persistence(format!(
                "model holds a `{}` learner, expected `{}`",
                artifact.learner_kind,
                F::KIND
            )));
        }
        artifact
            .assembler
            .check_consistency()
            .map_err(Error::Persistence)?;
        let width = artifact.assembler.schema().len();
        if artifact.learner.n_features_in() != width {
            return Err(Error::Persistence(format!(
                "learner expects {} features, schema has {width}",
                artifact.learner.n_features_in()
            )));
        }
        artifact.calibration.check().map_err(Error::Persistence)?;

        Ok(Self {
            assembler: artifact.assembler,
            learner: artifact.learner,
            calibration: artifact.calibration,
        })
    }
}
