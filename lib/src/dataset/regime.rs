//! Price regime tag attached to every training row.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which ground-truth source a row's price comes from.
///
/// Offer prices are self-reported listing prices: abundant, biased upward.
/// Manual prices are appraiser assessments: scarce, treated as ground truth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceRegime {
    /// Listing ("offer") price.
    Offer,
    /// Appraiser-assessed ("manual") price.
    Manual,
}

impl PriceRegime {
    /// Numeric code used by the raw data files (`0` offer, `1` manual).
    pub const fn code(self) -> u8 {
        match self {
            PriceRegime::Offer => 0,
            PriceRegime::Manual => 1,
        }
    }
}

impl fmt::Display for PriceRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRegime::Offer => f.write_str("offer"),
            PriceRegime::Manual => f.write_str("manual"),
        }
    }
}

impl FromStr for PriceRegime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "0.0" | "offer" | "offer_price" => Ok(PriceRegime::Offer),
            "1" | "1.0" | "manual" | "manual_price" => Ok(PriceRegime::Manual),
            other => Err(Error::InvalidInput(format!(
                "unrecognised price regime `{other}` (expected 0/offer or 1/manual)"
            ))),
        }
    }
}
