//! Column schema of an assembled feature matrix.

use crate::error::{Result, SchemaMismatch};
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// Ordered names of the columns of a feature matrix.
///
/// Fixed when the assembler is fitted and reproduced identically at
/// inference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema from column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Fail unless `width` equals the number of columns.
    pub fn check_width(&self, width: usize) -> Result<()> {
        if width != self.columns.len() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.columns.len(),
                got: width,
            }
            .into());
        }
        Ok(())
    }
}

/// Feature values together with their schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMatrix {
    schema: FeatureSchema,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Pair values with a schema of the same width.
    pub fn new(schema: FeatureSchema, values: Array2<f64>) -> Result<Self> {
        schema.check_width(values.ncols())?;
        Ok(Self { schema, values })
    }

    /// Column schema.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Row-major values, `(n_rows, schema.len())`.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Take ownership of the values.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Values of one named column.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.schema
            .position(name)
            .map(|idx| self.values.index_axis(Axis(1), idx))
    }
}
