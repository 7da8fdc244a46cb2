//! Visibility of quote fields per paid tier.
//!
//! The engine always computes the full quote; the gate only decides what the
//! page may show. Hidden fields come back as `None` with their `locked` flag set.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{ComparableGame, Price, PriceQuote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "snake_case")]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum AccessTier {
    #[default]
    Free,
    SmallIndie,
    VeteranIndie,
}

impl From<bool> for AccessTier {
    fn from(entitled: bool) -> Self {
        if entitled {
            AccessTier::VeteranIndie
        } else {
            AccessTier::Free
        }
    }
}

impl AccessTier {
    /// Tier from the entitlement flag and the optional tier label.
    ///
    /// Unknown labels on an entitled user grant full access.
    pub fn from_entitlement(entitled: bool, tier: Option<&str>) -> Self {
        if !entitled {
            return AccessTier::Free;
        }
        match tier.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("small_indie") => AccessTier::SmallIndie,
            _ => AccessTier::VeteranIndie,
        }
    }

    /// Whether the upper/lower band (C and D) is shown.
    pub fn shows_band(&self) -> bool {
        !matches!(self, AccessTier::Free)
    }

    /// Number of comparable games shown.
    pub fn showcase_slots(&self) -> usize {
        match self {
            AccessTier::Free => 1,
            AccessTier::SmallIndie => 3,
            AccessTier::VeteranIndie => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct GatedQuote {
    pub price_a: Price,
    pub price_b: Price,
    pub price_c: Price,
    pub price_d: Price,
    pub band_locked: bool,
    pub comparables: Vec<ComparableGame>,
    /// Comparables withheld from this tier.
    pub locked_comparables: usize,
}

pub fn gate(quote: &PriceQuote, tier: AccessTier) -> GatedQuote {
    let shows_band = tier.shows_band();
    let slots = tier.showcase_slots();
    let visible: Vec<ComparableGame> = quote.comparables.iter().take(slots).cloned().collect();
    GatedQuote {
        price_a: quote.price_a,
        price_b: quote.price_b,
        price_c: quote.price_c.filter(|_| shows_band),
        price_d: quote.price_d.filter(|_| shows_band),
        band_locked: !shows_band,
        locked_comparables: quote.comparables.len() - visible.len(),
        comparables: visible,
    }
}
