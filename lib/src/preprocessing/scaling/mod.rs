//! Scaling transformers for feature normalization.
//!
//! | Transformer | Description |
//! |-------------|-------------|
//! | [`StandardScaler`] | Z-score normalization (mean=0, std=1) |
//!
//! # Example
//!
//! ```ignore
//! use parcel_price::preprocessing::scaling::StandardScaler;
//! use parcel_price::preprocessing::{FittedTransformer, Transformer};
//!
//! let fitted = StandardScaler::new().fit(&data)?;
//! let scaled = fitted.transform(&new_data)?;
//! ```

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScaler};
