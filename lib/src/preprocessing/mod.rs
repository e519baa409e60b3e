//! Data preprocessing transformers.
//!
//! Every transformer comes as an unfitted configuration type and a fitted
//! type produced by [`Transformer::fit`]. Only fitted types can transform,
//! and fitted types are plain serde values stored inside a fitted model.
//!
//! # Core Traits
//!
//! - [`Transformer`]: Unfitted transformer with hyperparameters
//! - [`FittedTransformer`]: Fitted transformer ready for inference
//!
//! # Available Transformers
//!
//! ## Encoding
//! - [`OneHotEncoder`], [`OrdinalEncoder`], [`CategoricalEncoder`]
//!
//! ## Feature engineering
//! - [`InteractionFeatures`]: pairwise difference / ratio / product
//!
//! ## Imputation and scaling
//! - [`SimpleImputer`]: Fill missing values with mean, median or a constant
//! - [`StandardScaler`]: Z-score normalization
//!
//! ## Assembly
//! - [`FeatureAssembler`]: all of the above, producing a [`FeatureMatrix`]
//!
//! # Example
//!
//! ```ignore
//! use parcel_price::config::FeatureConfig;
//! use parcel_price::preprocessing::{FeatureAssembler, Transformer};
//!
//! let fitted = FeatureAssembler::new(FeatureConfig::default()).fit(&train)?;
//! let matrix = fitted.assemble(&test)?;
//! ```

pub mod assembler;
pub mod encoding;
pub mod feature_engineering;
pub mod imputation;
pub mod scaling;
pub mod schema;
pub mod traits;

pub use assembler::{FeatureAssembler, FittedFeatureAssembler};
pub use encoding::{
    CategoricalEncoder, FittedCategoricalEncoder, FittedOneHotEncoder, FittedOrdinalEncoder,
    OneHotEncoder, OrdinalEncoder, UNKNOWN_ORDINAL,
};
pub use feature_engineering::{
    FittedInteractionFeatures, InteractionFeatures, InteractionOp, InteractionTerm,
};
pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
pub use scaling::{FittedStandardScaler, StandardScaler};
pub use schema::{FeatureMatrix, FeatureSchema};
pub use traits::{FittedTransformer, Transformer};
