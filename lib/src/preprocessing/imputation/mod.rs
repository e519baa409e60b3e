//! Imputation transformers for handling missing values.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`SimpleImputer`] | Impute with mean, median or a constant |
//!
//! # Example
//!
//! ```ignore
//! use parcel_price::preprocessing::imputation::{ImputeStrategy, SimpleImputer};
//! use parcel_price::preprocessing::{FittedTransformer, Transformer};
//!
//! let imputer = SimpleImputer::new(ImputeStrategy::Median);
//! let fitted = imputer.fit(&data)?;
//! let imputed = fitted.transform(&new_data)?;
//! ```

pub mod simple;

pub use simple::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
