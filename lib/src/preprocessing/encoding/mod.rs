//! Categorical feature encoding transformers.
//!
//! Two disjoint encoding families are used:
//!
//! ## OneHotEncoder
//! For low-cardinality columns: an indicator per category seen during fit.
//!
//! ```ignore
//! // Input: ["office", "retail", "office"]
//! // Output: [[1,0], [0,1], [1,0]]
//! ```
//!
//! ## OrdinalEncoder
//! For high-cardinality columns: one integer code per category.
//!
//! ## CategoricalEncoder
//! Both families fitted together over a [`Frame`](crate::dataset::Frame).
//!
//! # Unknown and missing values
//!
//! Encoding never fails on a category that was absent during fitting:
//! one-hot blocks stay all-zero and ordinal codes become [`UNKNOWN_ORDINAL`].
//! Missing cells are replaced by a placeholder category before encoding, so
//! missingness is learned like any other category.

mod categorical;
mod one_hot;
mod ordinal;

pub use categorical::{CategoricalEncoder, FittedCategoricalEncoder};
pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
pub use ordinal::{FittedOrdinalEncoder, OrdinalEncoder};

/// Ordinal code for categories not seen during fit.
pub const UNKNOWN_ORDINAL: f64 = -1.0;

fn category_of<'a>(value: &'a Option<String>, missing: &'a str) -> &'a str {
    value.as_deref().unwrap_or(missing)
}
