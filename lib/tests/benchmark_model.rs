//! End-to-end behaviour of the dual-regime benchmark model.

use approx::assert_relative_eq;
use ndarray::{Array1, Array2};
use parcel_price::config::FeatureConfig;
use parcel_price::dataset::{Frame, PriceRegime};
use parcel_price::model::{
    BenchmarkModel, CalibrationConfig, CalibrationWarning, FittedBenchmarkModel, FittedLearner,
    FittedLinearRegression, Learner, LinearRegression,
};
use parcel_price::preprocessing::UNKNOWN_ORDINAL;
use parcel_price::{Error, Result, SchemaMismatch};
use serde::{Deserialize, Serialize};

/// Learner that always predicts the training mean.
#[derive(Clone, Debug, Default)]
struct MeanLearner;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FittedMean {
    mean: f64,
    width: usize,
}

impl Learner for MeanLearner {
    type Fitted = FittedMean;

    fn fit(&self, features: &Array2<f64>, targets: &Array1<f64>) -> Result<FittedMean> {
        Ok(FittedMean {
            mean: targets.mean().unwrap_or(0.0),
            width: features.ncols(),
        })
    }
}

impl FittedLearner for FittedMean {
    const KIND: &'static str = "mean";

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(features.nrows(), self.mean))
    }

    fn n_features_in(&self) -> usize {
        self.width
    }
}

fn features() -> FeatureConfig {
    FeatureConfig::new(
        vec!["feat".into(), "dist".into()],
        vec!["feat".into(), "dist".into()],
        vec!["kind".into()],
        vec!["city".into()],
    )
}

fn frame(feat: &[f64], price: &[f64], kind: &str, city: &str) -> Frame {
    let n = feat.len();
    Frame::new()
        .with_numeric("feat", feat.to_vec())
        .unwrap()
        .with_numeric("dist", (0..n).map(|i| 1.0 + i as f64).collect())
        .unwrap()
        .with_categorical("kind", (0..n).map(|_| Some(kind)))
        .unwrap()
        .with_categorical("city", (0..n).map(|_| Some(city)))
        .unwrap()
        .with_numeric("per_square_meter_price", price.to_vec())
        .unwrap()
}

fn linear_model() -> BenchmarkModel<LinearRegression> {
    BenchmarkModel::new(
        features(),
        CalibrationConfig::default(),
        LinearRegression::default(),
    )
}

fn fitted_linear() -> FittedBenchmarkModel<FittedLinearRegression> {
    let offer = frame(&[10.0, 20.0, 30.0, 40.0], &[100.0, 120.0, 140.0, 160.0], "X", "A");
    let manual = frame(&[15.0, 35.0], &[95.0, 125.0], "X", "A");
    linear_model().fit(&offer, &manual).unwrap().0
}

#[test]
fn offer_and_manual_scenario_learns_correction() {
    let offer = frame(&[10.0, 10.0], &[100.0, 100.0], "X", "A");
    let manual = frame(&[10.0], &[80.0], "X", "A");
    let model = BenchmarkModel::new(features(), CalibrationConfig::default(), MeanLearner);

    let (fitted, report) = model.fit(&offer, &manual).unwrap();
    assert_relative_eq!(fitted.correction(), 0.8, epsilon = 1e-12);
    assert!(report.warnings.is_empty());
    assert_eq!(report.manual_rows, 1);

    let new_row = frame(&[10.0], &[0.0], "X", "A");
    assert_relative_eq!(fitted.predict(&new_row).unwrap()[0], 80.0, epsilon = 1e-9);
}

#[test]
fn linear_learner_scenario_learns_correction() {
    let offer = frame(&[10.0, 10.0, 10.0], &[100.0, 100.0, 100.0], "X", "A");
    let manual = frame(&[10.0], &[80.0], "X", "A");
    let (fitted, _) = linear_model().fit(&offer, &manual).unwrap();

    assert_relative_eq!(fitted.correction(), 0.8, epsilon = 1e-6);
    let new_row = frame(&[10.0], &[0.0], "X", "A");
    assert_relative_eq!(fitted.predict(&new_row).unwrap()[0], 80.0, epsilon = 1e-4);
}

#[test]
fn single_offer_row_learns_correction() {
    let offer = frame(&[10.0], &[100.0], "X", "A");
    let manual = frame(&[10.0], &[80.0], "X", "A");
    let (fitted, report) = linear_model().fit(&offer, &manual).unwrap();

    assert_eq!(report.offer_rows, 1);
    assert_relative_eq!(fitted.correction(), 0.8, epsilon = 1e-9);
    assert_relative_eq!(fitted.predict_raw(&offer).unwrap()[0], 100.0, epsilon = 1e-9);

    let new_row = frame(&[10.0], &[0.0], "X", "A");
    assert_relative_eq!(fitted.predict(&new_row).unwrap()[0], 80.0, epsilon = 1e-9);
}

#[test]
fn many_cities_do_not_drown_numeric_signal() {
    let n = 4000;
    let feat: Vec<f64> = (0..n).map(|i| ((i * 37) % 101) as f64).collect();
    let price: Vec<f64> = feat.iter().map(|f| 1000.0 + 50.0 * f).collect();
    let cities: Vec<String> = (0..n).map(|i| format!("city-{}", i % 2000)).collect();
    let offer = Frame::new()
        .with_numeric("feat", feat.clone())
        .unwrap()
        .with_categorical("city", cities.iter().map(|c| Some(c.as_str())))
        .unwrap()
        .with_numeric("per_square_meter_price", price.clone())
        .unwrap();
    let manual = offer.select_rows(&[]).unwrap();

    let features = FeatureConfig::new(vec!["feat".into()], vec![], vec![], vec!["city".into()]);
    let model = BenchmarkModel::new(features, CalibrationConfig::default(), LinearRegression::default());
    let (fitted, _) = model.fit(&offer, &manual).unwrap();

    let predicted = fitted.predict(&offer).unwrap();
    for (p, y) in predicted.iter().zip(price.iter()) {
        assert_relative_eq!(*p, *y, max_relative = 1e-3);
    }
}

#[test]
fn empty_manual_subset_keeps_raw_predictions() {
    let offer = frame(&[10.0, 20.0], &[100.0, 140.0], "X", "A");
    let manual = frame(&[], &[], "X", "A");
    let (fitted, report) = linear_model().fit(&offer, &manual).unwrap();

    assert_eq!(fitted.correction(), 1.0);
    assert!(fitted.calibration().is_fallback());
    assert_eq!(
        report.warnings,
        vec![CalibrationWarning::TooFewManualRows { got: 0, required: 1 }]
    );

    assert_eq!(
        fitted.predict(&offer).unwrap(),
        fitted.predict_raw(&offer).unwrap()
    );
}

#[test]
fn unseen_category_at_predict_is_not_an_error() {
    let fitted = fitted_linear();
    let rows = frame(&[25.0], &[0.0], "Y", "Unknown city");

    let prediction = fitted.predict(&rows).unwrap();
    assert!(prediction[0].is_finite());

    let matrix = fitted.assembler().assemble(&rows).unwrap();
    assert_eq!(matrix.column("kind=X").unwrap()[0], 0.0);
    assert_eq!(matrix.column("city").unwrap()[0], UNKNOWN_ORDINAL);
}

#[test]
fn zero_denominator_interaction_is_finite() {
    let fitted = fitted_linear();
    let rows = Frame::new()
        .with_numeric("feat", vec![5.0])
        .unwrap()
        .with_numeric("dist", vec![0.0])
        .unwrap()
        .with_categorical("kind", vec![Some("X")])
        .unwrap()
        .with_categorical("city", vec![Some("A")])
        .unwrap();

    let matrix = fitted.assembler().assemble(&rows).unwrap();
    assert!(matrix.values().iter().all(|v| v.is_finite()));
    assert!(fitted.predict(&rows).unwrap()[0].is_finite());
}

#[test]
fn save_load_round_trip_is_bit_exact() {
    let fitted = fitted_linear();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fitted.save(&path).unwrap();

    let loaded = FittedBenchmarkModel::<FittedLinearRegression>::load(&path).unwrap();
    let rows = frame(&[12.0, 33.0, 47.0], &[0.0; 3], "X", "B");
    let before = fitted.predict(&rows).unwrap();
    let after = loaded.predict(&rows).unwrap();
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
    assert_eq!(loaded.correction().to_bits(), fitted.correction().to_bits());
    assert_eq!(loaded.schema(), fitted.schema());
}

#[test]
fn truncated_or_corrupt_artifacts_fail_to_load() {
    let fitted = fitted_linear();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fitted.save(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();

    let truncated = dir.path().join("truncated.bin");
    std::fs::write(&truncated, &bytes[..bytes.len() / 2]).unwrap();
    assert!(matches!(
        FittedBenchmarkModel::<FittedLinearRegression>::load(&truncated),
        Err(Error::Persistence(_))
    ));

    let mut garbage = bytes.clone();
    garbage[..8].copy_from_slice(b"NOTMODEL");
    let corrupt = dir.path().join("corrupt.bin");
    std::fs::write(&corrupt, &garbage).unwrap();
    assert!(matches!(
        FittedBenchmarkModel::<FittedLinearRegression>::load(&corrupt),
        Err(Error::Persistence(_))
    ));
}

#[test]
fn flipped_bytes_never_yield_a_model_that_panics() {
    let fitted = fitted_linear();
    let bytes = fitted.to_bytes().unwrap();
    let rows = frame(&[12.0, 33.0], &[0.0, 0.0], "Y", "B");

    for i in 0..bytes.len() {
        for delta in [0x01u8, 0x80] {
            let mut corrupt = bytes.clone();
            corrupt[i] = corrupt[i].wrapping_add(delta);
            match FittedBenchmarkModel::<FittedLinearRegression>::from_bytes(&corrupt) {
                Ok(model) => {
                    // Whatever survives validation must predict or fail cleanly.
                    let _ = model.predict(&rows);
                }
                Err(err) => assert!(matches!(err, Error::Persistence(_)), "byte {i}: {err}"),
            }
        }
    }
}

#[test]
fn artifact_for_other_learner_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fitted_linear().save(&path).unwrap();

    assert!(matches!(
        FittedBenchmarkModel::<FittedMean>::load(&path),
        Err(Error::Persistence(_))
    ));
}

#[test]
fn artifact_for_other_configuration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.bin");
    fitted_linear().save(&path).unwrap();

    assert!(FittedBenchmarkModel::<FittedLinearRegression>::load_expecting(&path, &features()).is_ok());

    let other = features().with_ratio_epsilon(1e-3);
    assert!(matches!(
        FittedBenchmarkModel::<FittedLinearRegression>::load_expecting(&path, &other),
        Err(Error::SchemaMismatch(SchemaMismatch::Configuration))
    ));
}

#[test]
fn missing_column_at_predict_is_schema_mismatch() {
    let fitted = fitted_linear();
    let rows = Frame::new().with_numeric("feat", vec![1.0]).unwrap();
    assert!(matches!(
        fitted.predict(&rows),
        Err(Error::SchemaMismatch(SchemaMismatch::MissingColumn(_)))
    ));
}

#[test]
fn regime_frame_fit_matches_explicit_split() {
    let frame_all = frame(&[10.0, 20.0, 30.0], &[100.0, 120.0, 90.0], "X", "A")
        .with_regime(vec![PriceRegime::Offer, PriceRegime::Offer, PriceRegime::Manual])
        .unwrap();
    let split = frame_all.split_by_regime().unwrap();

    let (a, _) = linear_model().fit_frame(&frame_all).unwrap();
    let (b, _) = linear_model().fit(&split.offer, &split.manual).unwrap();
    assert_eq!(a, b);
}

#[test]
fn fitted_model_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FittedBenchmarkModel<FittedLinearRegression>>();

    let fitted = std::sync::Arc::new(fitted_linear());
    let rows = frame(&[22.0], &[0.0], "X", "A");
    let expected = fitted.predict(&rows).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fitted = std::sync::Arc::clone(&fitted);
            let rows = rows.clone();
            std::thread::spawn(move || fitted.predict(&rows).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
