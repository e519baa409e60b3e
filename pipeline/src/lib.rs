//! # parcel-pipeline
//!
//! File-based entry points around [`parcel_price`]: CSV loading, the
//! `train` and `predict` commands, evaluation metrics and logging setup.
//!
//! ```text
//! train.csv ──► PriceDataset ──► BenchmarkModel::fit ──► model.bin
//!                                                          │
//! test.csv ───► PriceDataset ──► FittedBenchmarkModel::predict ──► predictions.csv
//! ```

pub mod commands;
pub mod data;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{PipelineError, Result};
