//! Combined one-hot + ordinal encoder.

use super::{FittedOneHotEncoder, FittedOrdinalEncoder, OneHotEncoder, OrdinalEncoder};
use crate::config::FeatureConfig;
use crate::dataset::Frame;
use crate::error::{Error, Result};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Encodes every categorical feature column of a frame.
///
/// Output columns are the one-hot block followed by the ordinal block.
#[derive(Clone, Debug)]
pub struct CategoricalEncoder {
    one_hot: OneHotEncoder,
    ordinal: OrdinalEncoder,
}

impl CategoricalEncoder {
    /// Create an encoder from explicit column lists.
    pub fn new(
        one_hot: Vec<String>,
        ordinal: Vec<String>,
        missing_category: impl Into<String>,
    ) -> Self {
        let missing_category = missing_category.into();
        Self {
            one_hot: OneHotEncoder::new(one_hot, missing_category.clone()),
            ordinal: OrdinalEncoder::new(ordinal, missing_category),
        }
    }

    /// Create an encoder for the categorical columns of a feature configuration.
    pub fn from_config(config: &FeatureConfig) -> Self {
        Self::new(
            config.one_hot.clone(),
            config.ordinal.clone(),
            config.missing_category.clone(),
        )
    }
}

/// Fitted vocabularies of both encoding families.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedCategoricalEncoder {
    one_hot: FittedOneHotEncoder,
    ordinal: FittedOrdinalEncoder,
}

impl FittedCategoricalEncoder {
    /// The fitted one-hot part.
    pub fn one_hot(&self) -> &FittedOneHotEncoder {
        &self.one_hot
    }

    /// The fitted ordinal part.
    pub fn ordinal(&self) -> &FittedOrdinalEncoder {
        &self.ordinal
    }

    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        self.one_hot.check()?;
        self.ordinal.check()
    }
}

impl Transformer for CategoricalEncoder {
    type Input = Frame;
    type Fitted = FittedCategoricalEncoder;

    fn fit(&self, frame: &Frame) -> Result<FittedCategoricalEncoder> {
        Ok(FittedCategoricalEncoder {
            one_hot: self.one_hot.fit(frame)?,
            ordinal: self.ordinal.fit(frame)?,
        })
    }
}

impl FittedTransformer for FittedCategoricalEncoder {
    type Input = Frame;

    fn transform(&self, frame: &Frame) -> Result<Array2<f64>> {
        let one_hot = self.one_hot.transform(frame)?;
        let ordinal = self.ordinal.transform(frame)?;
        concatenate(Axis(1), &[one_hot.view(), ordinal.view()])
            .map_err(|e| Error::InvalidInput(format!("categorical blocks: {e}")))
    }

    fn feature_names_out(&self) -> Vec<String> {
        let mut names = self.one_hot.feature_names_out();
        names.extend(self.ordinal.feature_names_out());
        names
    }

    fn n_features_out(&self) -> usize {
        self.one_hot.n_features_out() + self.ordinal.n_features_out()
    }
}
