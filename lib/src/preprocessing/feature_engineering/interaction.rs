//! Pairwise interaction feature generation.
//!
//! Generates difference, ratio and product features for every unordered pair
//! of a designated subset of numeric columns.

use crate::error::{Error, Result, SchemaMismatch};
use crate::preprocessing::traits::{FittedTransformer, Transformer};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Binary operator applied to a pair of numeric features.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionOp {
    /// `a - b`
    Difference,
    /// `a / (b + eps)`
    Ratio,
    /// `a * b`
    Product,
}

impl InteractionOp {
    /// Operators in output order for each pair.
    pub const ALL: [InteractionOp; 3] = [
        InteractionOp::Difference,
        InteractionOp::Ratio,
        InteractionOp::Product,
    ];

    /// Symbol used in generated feature names.
    pub fn symbol(self) -> char {
        match self {
            InteractionOp::Difference => '-',
            InteractionOp::Ratio => '/',
            InteractionOp::Product => '*',
        }
    }

    /// Evaluate the operator.
    ///
    /// The ratio adds `eps` to the denominator; when `b + eps` is exactly
    /// zero it divides by `eps` instead, so it never divides by zero. Any
    /// operator can still overflow to infinity on extreme inputs.
    pub fn apply(self, a: f64, b: f64, eps: f64) -> f64 {
        match self {
            InteractionOp::Difference => a - b,
            InteractionOp::Product => a * b,
            InteractionOp::Ratio => {
                let denom = b + eps;
                if denom == 0.0 {
                    a / eps
                } else {
                    a / denom
                }
            }
        }
    }
}

/// One generated column, identified by operator and positions in the top list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionTerm {
    /// Operator.
    pub op: InteractionOp,
    /// Position of the left operand in the top list.
    pub left: usize,
    /// Position of the right operand in the top list (`left < right`).
    pub right: usize,
}

impl InteractionTerm {
    /// Feature name such as `"a/b"`.
    pub fn name(&self, top: &[String]) -> String {
        format!("{}{}{}", top[self.left], self.op.symbol(), top[self.right])
    }
}

impl fmt::Display for InteractionTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}{}#{}", self.left, self.op.symbol(), self.right)
    }
}

/// All terms for `k` top columns: for i in 0..k, j in i+1..k, each operator.
pub fn generate_terms(k: usize) -> Vec<InteractionTerm> {
    let mut terms = Vec::with_capacity(3 * k * k.saturating_sub(1) / 2);
    for left in 0..k {
        for right in left + 1..k {
            for op in InteractionOp::ALL {
                terms.push(InteractionTerm { op, left, right });
            }
        }
    }
    terms
}

/// Interaction generator over a numeric block.
///
/// The input block has one column per name in `input_columns`; interactions
/// are generated for the columns named in `top`, in `top` order.
///
/// # Example
/// ```ignore
/// let gen = InteractionFeatures::new(vec!["a".into(), "b".into()], vec!["a".into(), "b".into()]);
/// let fitted = gen.fit(&block)?;
/// // names: ["a-b", "a/b", "a*b"]
/// let out = fitted.transform(&block)?;
/// ```
#[derive(Clone, Debug)]
pub struct InteractionFeatures {
    input_columns: Vec<String>,
    top: Vec<String>,
    epsilon: f64,
}

impl InteractionFeatures {
    /// Create a generator with the default ratio epsilon.
    pub fn new(input_columns: Vec<String>, top: Vec<String>) -> Self {
        Self {
            input_columns,
            top,
            epsilon: crate::config::DEFAULT_RATIO_EPSILON,
        }
    }

    /// Set the additive ratio epsilon.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

/// Fitted interaction generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedInteractionFeatures {
    /// Top column names.
    top: Vec<String>,
    /// Position of each top column in the input block.
    source_indices: Vec<usize>,
    /// Generated terms, in output order.
    terms: Vec<InteractionTerm>,
    /// Ratio epsilon.
    epsilon: f64,
    /// Width of the input block.
    n_features_in: usize,
}

impl FittedInteractionFeatures {
    /// Generated terms in output order.
    pub fn terms(&self) -> &[InteractionTerm] {
        &self.terms
    }

    /// Top column names.
    pub fn top(&self) -> &[String] {
        &self.top
    }

    /// Width of the input block.
    pub fn n_features_in(&self) -> usize {
        self.n_features_in
    }

    /// Check that every stored index is in range and the terms are the
    /// ones generated for `top`.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        if self.source_indices.len() != self.top.len() {
            return Err(format!(
                "{} interaction sources for {} top columns",
                self.source_indices.len(),
                self.top.len()
            ));
        }
        if let Some(&idx) = self.source_indices.iter().find(|&&i| i >= self.n_features_in) {
            return Err(format!(
                "interaction source {idx} outside an input block of width {}",
                self.n_features_in
            ));
        }
        if self.terms != generate_terms(self.top.len()) {
            return Err("interaction terms disagree with the top columns".to_string());
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(format!("ratio epsilon {} is not positive", self.epsilon));
        }
        Ok(())
    }

    fn row_values(&self, row: ArrayView1<'_, f64>, out: &mut [f64]) {
        for (slot, term) in out.iter_mut().zip(&self.terms) {
            let a = row[self.source_indices[term.left]];
            let b = row[self.source_indices[term.right]];
            *slot = term.op.apply(a, b, self.epsilon);
        }
    }
}

impl Transformer for InteractionFeatures {
    type Input = Array2<f64>;
    type Fitted = FittedInteractionFeatures;

    fn fit(&self, data: &Array2<f64>) -> Result<FittedInteractionFeatures> {
        if data.nrows() == 0 {
            return Err(Error::EmptyData(
                "Cannot fit InteractionFeatures on empty data".to_string(),
            ));
        }
        if data.ncols() != self.input_columns.len() {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.input_columns.len(),
                got: data.ncols(),
            }
            .into());
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "ratio epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }

        let mut seen = HashSet::new();
        let mut source_indices = Vec::with_capacity(self.top.len());
        for name in &self.top {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "interaction column `{name}` is listed twice"
                )));
            }
            let idx = self
                .input_columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "interaction column `{name}` is not a numeric feature"
                    ))
                })?;
            source_indices.push(idx);
        }

        Ok(FittedInteractionFeatures {
            top: self.top.clone(),
            source_indices,
            terms: generate_terms(self.top.len()),
            epsilon: self.epsilon,
            n_features_in: data.ncols(),
        })
    }
}

impl FittedTransformer for FittedInteractionFeatures {
    type Input = Array2<f64>;

    fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.n_features_in {
            return Err(SchemaMismatch::FeatureCount {
                expected: self.n_features_in,
                got: data.ncols(),
            }
            .into());
        }

        let mut result = Array2::zeros((data.nrows(), self.terms.len()));
        for (row, mut out) in data.rows().into_iter().zip(result.rows_mut()) {
            if let Some(slice) = out.as_slice_mut() {
                self.row_values(row, slice);
            }
        }
        Ok(result)
    }

    fn feature_names_out(&self) -> Vec<String> {
        self.terms.iter().map(|t| t.name(&self.top)).collect()
    }

    fn n_features_out(&self) -> usize {
        self.terms.len()
    }
}
