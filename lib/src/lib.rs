//! # parcel-price
//!
//! Per-square-meter price benchmark for commercial real estate.
//!
//! Listing (offer) prices are plentiful but biased; appraiser (manual) prices
//! are scarce but trustworthy. The model learns from offer rows and corrects
//! its output with a single coefficient calibrated on manual rows.
//!
//! ## Core Design Principles
//!
//! - **Stateful Type Safety**: unfitted and fitted stages are different types,
//!   so transforming or predicting before fitting does not compile.
//! - **Training/Inference Separation**: fitted values hold only what prediction
//!   needs; hyperparameters stay on the unfitted side.
//! - **Fixed Feature Schema**: the column layout is fitted state and is
//!   reproduced identically at inference; any mismatch is an error.
//!
//! ## Quick Start
//!
//! ```rust
//! use parcel_price::config::FeatureConfig;
//! use parcel_price::dataset::Frame;
//! use parcel_price::model::{BenchmarkModel, CalibrationConfig, LinearRegression};
//!
//! let features = FeatureConfig::new(vec!["area".into()], vec![], vec![], vec![]);
//! let offer = Frame::new()
//!     .with_numeric("area", vec![10.0, 10.0])?
//!     .with_numeric("per_square_meter_price", vec![100.0, 100.0])?;
//! let manual = Frame::new()
//!     .with_numeric("area", vec![10.0])?
//!     .with_numeric("per_square_meter_price", vec![80.0])?;
//!
//! let model = BenchmarkModel::new(features, CalibrationConfig::default(), LinearRegression::default());
//! let (fitted, _report) = model.fit(&offer, &manual)?;
//! assert!((fitted.correction() - 0.8).abs() < 1e-9);
//! # Ok::<(), parcel_price::Error>(())
//! ```
//!
//! ## Module Structure
//!
//! - `dataset`: column-oriented [`Frame`](dataset::Frame) and price regimes
//! - `config`: feature lists and tuning knobs
//! - `preprocessing`: encoders, interactions, imputation, scaling, assembly
//! - `model`: learners, calibration and the benchmark model
//! - `persistence`: versioned model files
//! - `stats`: small descriptive statistics

/// Model configuration.
pub mod config;

/// In-memory tabular data.
pub mod dataset;

pub mod error;

/// Learners and the benchmark model.
pub mod model;

/// Versioned model file format.
pub mod persistence;

/// Data preprocessing transformers.
pub mod preprocessing;

pub mod stats;

pub use error::{Error, Result, SchemaMismatch};
