//! Feature engineering transformers.
//!
//! This module provides transformers for generating new features from existing data.

mod interaction;

pub use interaction::{
    generate_terms, FittedInteractionFeatures, InteractionFeatures, InteractionOp,
    InteractionTerm,
};
