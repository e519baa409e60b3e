//! Model configuration.
//!
//! All feature lists and tuning knobs live in one immutable [`ModelConfig`]
//! that is handed to the constructors. The feature part ([`FeatureConfig`]) is
//! persisted with every fitted model, so a model loaded against another
//! configuration is detected by plain structural comparison.
//!
//! Configurations can be read from JSON; missing fields take the defaults
//! below, which describe the commercial real-estate dataset.
//!
//! ```json
//! {
//!   "features": { "interaction_top": ["lat", "lng", "total_square"] },
//!   "calibration": { "min_manual_rows": 50 },
//!   "learner": { "max_epochs": 2000 }
//! }
//! ```

use crate::error::{Error, Result};
use crate::model::calibration::CalibrationConfig;
use crate::model::linear::LinearRegressionConfig;
use crate::preprocessing::imputation::ImputeStrategy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Numeric columns of the dataset: coordinates, OSM point-of-interest counts
/// and distances, building statistics and the parcel area.
pub const DEFAULT_NUMERIC_FEATURES: &[&str] = &[
    "lat",
    "lng",
    "osm_amenity_points_in_0.001",
    "osm_amenity_points_in_0.005",
    "osm_amenity_points_in_0.0075",
    "osm_amenity_points_in_0.01",
    "osm_building_points_in_0.001",
    "osm_building_points_in_0.005",
    "osm_building_points_in_0.0075",
    "osm_building_points_in_0.01",
    "osm_catering_points_in_0.001",
    "osm_catering_points_in_0.005",
    "osm_catering_points_in_0.0075",
    "osm_catering_points_in_0.01",
    "osm_city_closest_dist",
    "osm_city_nearest_population",
    "osm_crossing_closest_dist",
    "osm_crossing_points_in_0.001",
    "osm_crossing_points_in_0.005",
    "osm_crossing_points_in_0.0075",
    "osm_crossing_points_in_0.01",
    "osm_culture_points_in_0.001",
    "osm_culture_points_in_0.005",
    "osm_culture_points_in_0.0075",
    "osm_culture_points_in_0.01",
    "osm_finance_points_in_0.001",
    "osm_finance_points_in_0.005",
    "osm_finance_points_in_0.0075",
    "osm_finance_points_in_0.01",
    "osm_healthcare_points_in_0.005",
    "osm_healthcare_points_in_0.0075",
    "osm_healthcare_points_in_0.01",
    "osm_historic_points_in_0.005",
    "osm_historic_points_in_0.0075",
    "osm_historic_points_in_0.01",
    "osm_hotels_points_in_0.005",
    "osm_hotels_points_in_0.0075",
    "osm_hotels_points_in_0.01",
    "osm_leisure_points_in_0.005",
    "osm_leisure_points_in_0.0075",
    "osm_leisure_points_in_0.01",
    "osm_offices_points_in_0.001",
    "osm_offices_points_in_0.005",
    "osm_offices_points_in_0.0075",
    "osm_offices_points_in_0.01",
    "osm_shops_points_in_0.001",
    "osm_shops_points_in_0.005",
    "osm_shops_points_in_0.0075",
    "osm_shops_points_in_0.01",
    "osm_subway_closest_dist",
    "osm_train_stop_closest_dist",
    "osm_train_stop_points_in_0.005",
    "osm_train_stop_points_in_0.0075",
    "osm_train_stop_points_in_0.01",
    "osm_transport_stop_closest_dist",
    "osm_transport_stop_points_in_0.005",
    "osm_transport_stop_points_in_0.0075",
    "osm_transport_stop_points_in_0.01",
    "reform_count_of_houses_1000",
    "reform_count_of_houses_500",
    "reform_house_population_1000",
    "reform_house_population_500",
    "reform_mean_floor_count_1000",
    "reform_mean_floor_count_500",
    "reform_mean_year_building_1000",
    "reform_mean_year_building_500",
    "total_square",
];

/// Numeric columns that feed the pairwise interaction generator.
pub const DEFAULT_INTERACTION_TOP: &[&str] = &[
    "total_square",
    "osm_city_nearest_population",
    "reform_mean_year_building_1000",
    "osm_crossing_closest_dist",
    "osm_subway_closest_dist",
];

/// Low-cardinality categorical columns, one-hot encoded.
pub const DEFAULT_ONE_HOT_FEATURES: &[&str] = &["realty_type"];

/// High-cardinality categorical columns, ordinal encoded.
pub const DEFAULT_ORDINAL_FEATURES: &[&str] = &["region", "city", "osm_city_nearest_name"];

/// Price per square meter.
pub const DEFAULT_TARGET: &str = "per_square_meter_price";

/// Price regime tag column.
pub const DEFAULT_REGIME_COLUMN: &str = "price_type";

/// Row identifier column carried through to predictions.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Placeholder category for missing categorical cells.
pub const DEFAULT_MISSING_CATEGORY: &str = "__missing__";

/// Additive guard used by the ratio interaction.
pub const DEFAULT_RATIO_EPSILON: f64 = 1e-6;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Which columns the model reads and how it turns them into features.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Numeric feature columns, in feature-matrix order.
    pub numeric: Vec<String>,
    /// Ordered subset of `numeric` used for pairwise interactions.
    pub interaction_top: Vec<String>,
    /// Categorical columns encoded as indicator vectors.
    pub one_hot: Vec<String>,
    /// Categorical columns encoded as integer codes.
    pub ordinal: Vec<String>,
    /// Target column (training only).
    pub target: String,
    /// Price regime column (training only).
    pub regime: String,
    /// Row identifier column.
    pub id: String,
    /// Category substituted for missing categorical cells.
    pub missing_category: String,
    /// Denominator guard of the ratio interaction.
    pub ratio_epsilon: f64,
    /// How missing numeric cells are filled.
    pub impute_strategy: ImputeStrategy,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            numeric: owned(DEFAULT_NUMERIC_FEATURES),
            interaction_top: owned(DEFAULT_INTERACTION_TOP),
            one_hot: owned(DEFAULT_ONE_HOT_FEATURES),
            ordinal: owned(DEFAULT_ORDINAL_FEATURES),
            target: DEFAULT_TARGET.to_string(),
            regime: DEFAULT_REGIME_COLUMN.to_string(),
            id: DEFAULT_ID_COLUMN.to_string(),
            missing_category: DEFAULT_MISSING_CATEGORY.to_string(),
            ratio_epsilon: DEFAULT_RATIO_EPSILON,
            impute_strategy: ImputeStrategy::Median,
        }
    }
}

impl FeatureConfig {
    /// A configuration with the given feature lists and default bookkeeping
    /// columns, epsilon and imputation.
    pub fn new(
        numeric: Vec<String>,
        interaction_top: Vec<String>,
        one_hot: Vec<String>,
        ordinal: Vec<String>,
    ) -> Self {
        Self {
            numeric,
            interaction_top,
            one_hot,
            ordinal,
            ..Self::default()
        }
    }

    /// Set the target column.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the ratio epsilon.
    pub fn with_ratio_epsilon(mut self, epsilon: f64) -> Self {
        self.ratio_epsilon = epsilon;
        self
    }

    /// Set the numeric imputation strategy.
    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }

    /// Every feature column the model reads, in feature-group order.
    pub fn feature_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .iter()
            .chain(&self.one_hot)
            .chain(&self.ordinal)
            .map(String::as_str)
    }

    /// Check the configuration for overlapping or dangling names.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.feature_columns() {
            if !seen.insert(name) {
                return Err(Error::InvalidConfig(format!(
                    "column `{name}` is listed more than once among the features"
                )));
            }
        }
        for reserved in [&self.target, &self.regime, &self.id] {
            if seen.contains(reserved.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "bookkeeping column `{reserved}` cannot also be a feature"
                )));
            }
        }
        let numeric: HashSet<&str> = self.numeric.iter().map(String::as_str).collect();
        let mut top = HashSet::new();
        for name in &self.interaction_top {
            if !numeric.contains(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "interaction column `{name}` is not a numeric feature"
                )));
            }
            if !top.insert(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "interaction column `{name}` is listed twice"
                )));
            }
        }
        if !(self.ratio_epsilon.is_finite() && self.ratio_epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "ratio epsilon must be positive and finite, got {}",
                self.ratio_epsilon
            )));
        }
        Ok(())
    }
}

/// Complete configuration of a training run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature selection and encoding.
    pub features: FeatureConfig,
    /// Correction coefficient estimation.
    pub calibration: CalibrationConfig,
    /// Hyperparameters of the default learner.
    pub learner: LinearRegressionConfig,
}

impl ModelConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.features.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
