//! In-memory tabular data for the price model.
//!
//! A [`Frame`] is a column-oriented table of named columns. Numeric cells are
//! `f64` (`NaN` marks a missing value) and categorical cells are
//! `Option<String>`. Training frames additionally carry a typed
//! [`PriceRegime`] per row, which [`Frame::split_by_regime`] uses to produce
//! the offer and manual subsets.
//!
//! # Example
//!
//! ```rust
//! use parcel_price::dataset::{Frame, PriceRegime};
//!
//! let frame = Frame::new()
//!     .with_numeric("total_square", vec![120.0, 80.0])
//!     .unwrap()
//!     .with_categorical("city", vec![Some("Moscow"), None])
//!     .unwrap()
//!     .with_regime(vec![PriceRegime::Offer, PriceRegime::Manual])
//!     .unwrap();
//!
//! let split = frame.split_by_regime().unwrap();
//! assert_eq!(split.offer.n_rows(), 1);
//! assert_eq!(split.manual.n_rows(), 1);
//! ```

mod regime;

pub use regime::PriceRegime;

use crate::error::{Error, Result, SchemaMismatch};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The two kinds of feature columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Floating point values.
    Numeric,
    /// String categories.
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("numeric"),
            ColumnKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Values of a single column.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numeric values; `NaN` marks a missing cell.
    Numeric(Vec<f64>),
    /// Categorical values; `None` marks a missing cell.
    Categorical(Vec<Option<String>>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kind of values held.
    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Numeric(_) => ColumnKind::Numeric,
            Column::Categorical(_) => ColumnKind::Categorical,
        }
    }

    fn select(&self, rows: &[usize]) -> Column {
        match self {
            Column::Numeric(values) => Column::Numeric(rows.iter().map(|&r| values[r]).collect()),
            Column::Categorical(values) => {
                Column::Categorical(rows.iter().map(|&r| values[r].clone()).collect())
            }
        }
    }
}

/// Column-oriented table of named columns.
///
/// Column order is insertion order. All columns (and the optional regime
/// vector) share one row count, fixed by the first column inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    n_rows: Option<usize>,
    columns: Vec<(String, Column)>,
    index: HashMap<String, usize>,
    regime: Option<Vec<PriceRegime>>,
}

/// Offer and manual subsets of a training frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RegimeSplit {
    /// Rows whose price is a listing price.
    pub offer: Frame,
    /// Rows whose price is an appraiser assessment.
    pub manual: Frame,
}

impl Frame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for a frame without columns).
    pub fn n_rows(&self) -> usize {
        self.n_rows.unwrap_or(0)
    }

    /// Number of named columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&i| &self.columns[i].1)
    }

    /// Per-row price regimes, if the frame carries them.
    pub fn regime(&self) -> Option<&[PriceRegime]> {
        self.regime.as_deref()
    }

    /// Borrow a numeric column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(values)) => Ok(values),
            Some(Column::Categorical(_)) => Err(SchemaMismatch::WrongKind {
                column: name.to_string(),
                expected: ColumnKind::Numeric,
            }
            .into()),
            None => Err(SchemaMismatch::MissingColumn(name.to_string()).into()),
        }
    }

    /// Borrow a categorical column.
    pub fn categorical(&self, name: &str) -> Result<&[Option<String>]> {
        match self.column(name) {
            Some(Column::Categorical(values)) => Ok(values),
            Some(Column::Numeric(_)) => Err(SchemaMismatch::WrongKind {
                column: name.to_string(),
                expected: ColumnKind::Categorical,
            }
            .into()),
            None => Err(SchemaMismatch::MissingColumn(name.to_string()).into()),
        }
    }

    /// Gather the named numeric columns into an `(n_rows, names.len())` matrix.
    pub fn numeric_block(&self, names: &[String]) -> Result<Array2<f64>> {
        let columns = names
            .iter()
            .map(|name| self.numeric(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array2::from_shape_fn(
            (self.n_rows(), columns.len()),
            |(row, col)| columns[col][row],
        ))
    }

    /// Add a column, checking its name and length.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(Error::InvalidInput(format!("duplicate column `{name}`")));
        }
        self.check_len(&name, column.len())?;
        self.index.insert(name.clone(), self.columns.len());
        self.columns.push((name, column));
        Ok(())
    }

    /// Attach per-row price regimes, replacing any previous ones.
    pub fn set_regime(&mut self, regime: Vec<PriceRegime>) -> Result<()> {
        self.check_len("<price regime>", regime.len())?;
        self.regime = Some(regime);
        Ok(())
    }

    /// Builder form of [`Frame::insert`] for numeric columns.
    pub fn with_numeric(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.insert(name, Column::Numeric(values))?;
        Ok(self)
    }

    /// Builder form of [`Frame::insert`] for categorical columns.
    pub fn with_categorical<S: Into<String>>(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = Option<S>>,
    ) -> Result<Self> {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        self.insert(name, Column::Categorical(values))?;
        Ok(self)
    }

    /// Builder form of [`Frame::set_regime`].
    pub fn with_regime(mut self, regime: Vec<PriceRegime>) -> Result<Self> {
        self.set_regime(regime)?;
        Ok(self)
    }

    /// New frame holding only the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Frame> {
        let n_rows = self.n_rows();
        if let Some(&bad) = rows.iter().find(|&&r| r >= n_rows) {
            return Err(Error::InvalidInput(format!(
                "row {bad} out of bounds for frame with {n_rows} rows"
            )));
        }
        Ok(Frame {
            n_rows: Some(rows.len()),
            columns: self
                .columns
                .iter()
                .map(|(name, column)| (name.clone(), column.select(rows)))
                .collect(),
            index: self.index.clone(),
            regime: self
                .regime
                .as_ref()
                .map(|regime| rows.iter().map(|&r| regime[r]).collect()),
        })
    }

    /// Partition rows into the offer and manual subsets.
    ///
    /// Row order inside each subset follows the original frame.
    pub fn split_by_regime(&self) -> Result<RegimeSplit> {
        let regime = self.regime.as_ref().ok_or_else(|| {
            Error::InvalidInput("frame carries no price regime column".to_string())
        })?;
        let (offer, manual): (Vec<usize>, Vec<usize>) =
            (0..regime.len()).partition(|&r| regime[r] == PriceRegime::Offer);
        Ok(RegimeSplit {
            offer: self.select_rows(&offer)?,
            manual: self.select_rows(&manual)?,
        })
    }

    fn check_len(&mut self, name: &str, len: usize) -> Result<()> {
        match self.n_rows {
            Some(n) if n != len => Err(Error::InvalidInput(format!(
                "column `{name}` has {len} rows, frame has {n}"
            ))),
            Some(_) => Ok(()),
            None => {
                self.n_rows = Some(len);
                Ok(())
            }
        }
    }
}
