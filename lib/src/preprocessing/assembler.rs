//! Feature assembly: raw frame to model-ready feature matrix.
//!
//! Column order of the assembled matrix is fixed:
//!
//! 1. configured numeric columns (imputed, standardised)
//! 2. interaction columns over the top numeric columns (standardised)
//! 3. one-hot indicator columns
//! 4. ordinal code columns
//!
//! Every stage is fitted once, on the training frame, and the fitted state is
//! reused verbatim at inference.

use crate::config::FeatureConfig;
use crate::dataset::Frame;
use crate::error::{Error, Result};
use crate::preprocessing::encoding::{CategoricalEncoder, FittedCategoricalEncoder};
use crate::preprocessing::feature_engineering::{FittedInteractionFeatures, InteractionFeatures};
use crate::preprocessing::imputation::{FittedSimpleImputer, SimpleImputer};
use crate::preprocessing::scaling::{FittedStandardScaler, StandardScaler};
use crate::preprocessing::schema::{FeatureMatrix, FeatureSchema};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

fn hcat(left: &Array2<f64>, right: &Array2<f64>) -> Result<Array2<f64>> {
    concatenate(Axis(1), &[left.view(), right.view()])
        .map_err(|e| Error::InvalidInput(format!("feature blocks: {e}")))
}

/// Unfitted assembler for a [`FeatureConfig`].
///
/// # Example
/// ```ignore
/// let assembler = FeatureAssembler::new(FeatureConfig::default());
/// let fitted = assembler.fit(&offer_rows)?;
/// let matrix = fitted.assemble(&rows)?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct FeatureAssembler {
    config: FeatureConfig,
}

impl FeatureAssembler {
    /// Create an assembler for the given configuration.
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    /// The feature configuration.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }
}

impl Transformer for FeatureAssembler {
    type Input = Frame;
    type Fitted = FittedFeatureAssembler;

    fn fit(&self, frame: &Frame) -> Result<FittedFeatureAssembler> {
        let config = &self.config;
        config.validate()?;
        if frame.is_empty() {
            return Err(Error::EmptyData(
                "Cannot fit FeatureAssembler on empty data".to_string(),
            ));
        }

        let numeric = frame.numeric_block(&config.numeric)?;
        let imputer = SimpleImputer::new(config.impute_strategy)
            .with_names(config.numeric.clone())
            .fit(&numeric)?;
        let imputed = imputer.transform(&numeric)?;

        let interactions =
            InteractionFeatures::new(config.numeric.clone(), config.interaction_top.clone())
                .with_epsilon(config.ratio_epsilon)
                .fit(&imputed)?;
        let dense = hcat(&imputed, &interactions.transform(&imputed)?)?;

        let mut dense_names = config.numeric.clone();
        dense_names.extend(interactions.feature_names_out());
        let scaler = StandardScaler::new()
            .with_names(dense_names.clone())
            .fit(&dense)?;

        let encoder = CategoricalEncoder::from_config(config).fit(frame)?;

        let mut columns = dense_names;
        columns.extend(encoder.feature_names_out());

        tracing::debug!(
            rows = frame.n_rows(),
            numeric = config.numeric.len(),
            interactions = interactions.n_features_out(),
            categorical = encoder.n_features_out(),
            "fitted feature assembler"
        );

        Ok(FittedFeatureAssembler {
            config: config.clone(),
            imputer,
            interactions,
            scaler,
            encoder,
            schema: FeatureSchema::new(columns),
        })
    }
}

/// Fitted assembler: imputer, interaction generator, scaler and encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedFeatureAssembler {
    config: FeatureConfig,
    imputer: FittedSimpleImputer,
    interactions: FittedInteractionFeatures,
    scaler: FittedStandardScaler,
    encoder: FittedCategoricalEncoder,
    schema: FeatureSchema,
}

impl FittedFeatureAssembler {
    /// Build the feature matrix for a frame.
    ///
    /// # Errors
    /// A schema mismatch if a configured column is missing or has the wrong kind.
    pub fn assemble(&self, frame: &Frame) -> Result<FeatureMatrix> {
        let values = self.transform(frame)?;
        FeatureMatrix::new(self.schema.clone(), values)
    }

    /// Output schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Configuration the assembler was fitted with.
    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Fitted numeric imputer.
    pub fn imputer(&self) -> &FittedSimpleImputer {
        &self.imputer
    }

    /// Fitted interaction generator.
    pub fn interactions(&self) -> &FittedInteractionFeatures {
        &self.interactions
    }

    /// Fitted scaler over the numeric and interaction block.
    pub fn scaler(&self) -> &FittedStandardScaler {
        &self.scaler
    }

    /// Fitted categorical encoder.
    pub fn encoder(&self) -> &FittedCategoricalEncoder {
        &self.encoder
    }

    /// Check that the fitted stages agree with each other and with the
    /// configuration. Returns a description of the first disagreement.
    pub fn check_consistency(&self) -> std::result::Result<(), String> {
        let config = &self.config;
        config.validate().map_err(|err| err.to_string())?;
        let n_numeric = config.numeric.len();

        if self.imputer.n_features_in() != n_numeric {
            return Err(format!(
                "imputer covers {} columns, configuration lists {n_numeric}",
                self.imputer.n_features_in()
            ));
        }
        if self.interactions.n_features_in() != n_numeric
            || self.interactions.top() != config.interaction_top.as_slice()
        {
            return Err("interaction columns disagree with configuration".to_string());
        }
        self.imputer.check()?;
        self.interactions.check()?;
        self.scaler.check()?;
        self.encoder.check()?;

        let dense = n_numeric + self.interactions.n_features_out();
        if self.scaler.n_features_in() != dense {
            return Err(format!(
                "scaler covers {} columns, expected {dense}",
                self.scaler.n_features_in()
            ));
        }
        if self.encoder.one_hot().columns() != config.one_hot.as_slice()
            || self.encoder.ordinal().columns() != config.ordinal.as_slice()
        {
            return Err("categorical columns disagree with configuration".to_string());
        }

        let mut expected = config.numeric.clone();
        expected.extend(self.interactions.feature_names_out());
        expected.extend(self.encoder.feature_names_out());
        if self.schema.columns() != expected.as_slice() {
            return Err("feature schema disagrees with fitted stages".to_string());
        }
        Ok(())
    }
}

impl FittedTransformer for FittedFeatureAssembler {
    type Input = Frame;

    fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let numeric = frame.numeric_block(&self.config.numeric)?;
        let imputed = self.imputer.transform(&numeric)?;
        let dense = hcat(&imputed, &self.interactions.transform(&imputed)?)?;
        let scaled = self.scaler.transform(&dense)?;
        let encoded = self.encoder.transform(frame)?;
        hcat(&scaled, &encoded)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.schema.columns().to_vec()
    }

    fn n_features_out(&self) -> usize {
        self.schema.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaMismatch;
    use crate::preprocessing::encoding::UNKNOWN_ORDINAL;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn config() -> FeatureConfig {
        FeatureConfig::new(
            vec!["area".into(), "floor".into(), "dist".into()],
            vec!["area".into(), "dist".into()],
            vec!["kind".into()],
            vec!["city".into()],
        )
    }

    fn frame() -> Frame {
        Frame::new()
            .with_numeric("area", vec![100.0, 50.0, f64::NAN, 70.0])
            .unwrap()
            .with_numeric("floor", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_numeric("dist", vec![0.5, 1.5, 2.5, 3.5])
            .unwrap()
            .with_categorical("kind", vec![Some("office"), Some("retail"), None, Some("office")])
            .unwrap()
            .with_categorical("city", vec![Some("Tver"), Some("Kazan"), Some("Tver"), Some("Omsk")])
            .unwrap()
    }

    #[test]
    fn test_assembler_column_order() {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        assert_eq!(
            fitted.schema().columns(),
            &[
                "area",
                "floor",
                "dist",
                "area-dist",
                "area/dist",
                "area*dist",
                "kind=office",
                "kind=retail",
                "kind=__missing__",
                "city",
            ]
        );
        assert!(fitted.check_consistency().is_ok());
    }

    #[test]
    fn test_assembler_imputes_before_interactions() {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        assert_relative_eq!(fitted.imputer().statistics()[0], 70.0);

        let matrix = fitted.assemble(&frame()).unwrap();
        assert!(matrix.values().iter().all(|v| v.is_finite()));

        // Row 2 had area missing; its product term uses the imputed median.
        let scaler = fitted.scaler();
        let product = matrix.column("area*dist").unwrap()[2] * scaler.std()[5] + scaler.mean()[5];
        assert_relative_eq!(product, 70.0 * 2.5, epsilon = 1e-9);
    }

    #[test]
    fn test_assembler_is_reproducible() {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        let first = fitted.assemble(&frame()).unwrap();
        let second = fitted.assemble(&frame()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_assembler_unseen_categories() {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        let new_rows = Frame::new()
            .with_numeric("area", vec![80.0])
            .unwrap()
            .with_numeric("floor", vec![2.0])
            .unwrap()
            .with_numeric("dist", vec![1.0])
            .unwrap()
            .with_categorical("kind", vec![Some("warehouse")])
            .unwrap()
            .with_categorical("city", vec![Some("Perm")])
            .unwrap();

        let matrix = fitted.assemble(&new_rows).unwrap();
        assert_eq!(matrix.column("kind=office").unwrap()[0], 0.0);
        assert_eq!(matrix.column("kind=retail").unwrap()[0], 0.0);
        assert_eq!(matrix.column("city").unwrap()[0], UNKNOWN_ORDINAL);
    }

    #[test]
    fn test_assembler_missing_column() {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        let rows = Frame::new().with_numeric("area", vec![1.0]).unwrap();
        assert!(matches!(
            fitted.assemble(&rows),
            Err(Error::SchemaMismatch(SchemaMismatch::MissingColumn(_)))
        ));
    }

    #[test]
    fn test_assembler_wrong_kind() {
        let rows = Frame::new()
            .with_categorical("area", vec![Some("big")])
            .unwrap();
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        assert!(matches!(
            fitted.assemble(&rows),
            Err(Error::SchemaMismatch(SchemaMismatch::WrongKind { .. }))
        ));
    }

    #[test]
    fn test_assembler_empty_frame() {
        let empty = frame().select_rows(&[]).unwrap();
        assert!(matches!(
            FeatureAssembler::new(config()).fit(&empty),
            Err(Error::EmptyData(_))
        ));
    }

    #[test]
    fn test_assembler_rejects_invalid_config() {
        let bad = FeatureConfig::new(
            vec!["area".into()],
            vec!["dist".into()],
            vec![],
            vec![],
        );
        assert!(matches!(
            FeatureAssembler::new(bad).fit(&frame()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[rstest]
    #[case::interaction_source_out_of_range("/interactions/source_indices/1", json!(3))]
    #[case::interaction_term_out_of_range("/interactions/terms/0/right", json!(5))]
    #[case::interaction_epsilon("/interactions/epsilon", json!(0.0))]
    #[case::one_hot_width("/encoder/one_hot/n_features_out", json!(7))]
    #[case::one_hot_vocabularies("/encoder/one_hot/categories", json!([]))]
    #[case::ordinal_mappings("/encoder/ordinal/mappings", json!([]))]
    #[case::scaler_std_length("/scaler/std", json!([1.0, 1.0]))]
    #[case::scaler_zero_std("/scaler/std/0", json!(0.0))]
    #[case::scaler_names("/scaler/names", json!(["area"]))]
    #[case::imputer_names("/imputer/names", json!(["area"]))]
    #[case::config_epsilon("/config/ratio_epsilon", json!(-1.0))]
    fn test_consistency_rejects_corrupt_stage(#[case] path: &str, #[case] replacement: Value) {
        let fitted = FeatureAssembler::new(config()).fit(&frame()).unwrap();
        let mut value = serde_json::to_value(&fitted).unwrap();
        *value.pointer_mut(path).unwrap() = replacement;
        let corrupt: FittedFeatureAssembler = serde_json::from_value(value).unwrap();
        assert!(corrupt.check_consistency().is_err());
    }
}
