use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::Price;

/// Fraction at or above which a price rounds up to `whole.99`.
const ROUND_UP_FRACTION: f64 = 0.49;

/// Absorbs binary noise in the fraction (`19.49 - 19.0 == 0.48999...`).
const FRACTION_EPSILON: f64 = 1e-9;

const BAND_UPPER: f64 = 1.25;
const BAND_LOWER: f64 = 0.75;

/// `whole + 0.99`, as the double nearest the two-decimal value.
fn anchor(whole: f64) -> f64 {
    (whole * 100.0 + 99.0) / 100.0
}

/// Snap a price to the nearest `.99` anchor.
///
/// - fraction ≥ 0.49 → `whole.99`
/// - otherwise `(whole - 1).99`, except below 1.00 where the result is 0.99
///
/// N/A for non-positive or non-finite input.
pub fn smart_round(x: f64) -> Price {
    if !x.is_finite() || x <= 0.0 {
        return None;
    }
    let whole = x.floor();
    let frac = x - whole;
    if frac + FRACTION_EPSILON >= ROUND_UP_FRACTION {
        Some(anchor(whole))
    } else if whole == 0.0 {
        Some(anchor(0.0))
    } else {
        Some(anchor(whole - 1.0))
    }
}

/// Upper and lower prices around the adjusted price.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct PriceBand {
    pub upper: Price,
    pub lower: Price,
}

/// ±25% band around `adjusted`, each side smart-rounded.
pub fn derive_band(adjusted: Price) -> PriceBand {
    match adjusted.filter(|p| *p != 0.0) {
        Some(p) => PriceBand {
            upper: smart_round(p * BAND_UPPER),
            lower: smart_round(p * BAND_LOWER),
        },
        None => PriceBand::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_at_threshold() {
        assert_eq!(smart_round(19.49), Some(19.99));
        assert_eq!(smart_round(19.75), Some(19.99));
        assert_eq!(smart_round(20.0 - 1e-12), Some(19.99));
    }

    #[test]
    fn rounds_down_below_threshold() {
        assert_eq!(smart_round(19.48), Some(18.99));
        assert_eq!(smart_round(20.0), Some(19.99));
        assert_eq!(smart_round(73.0), Some(72.99));
    }

    #[test]
    fn sub_dollar_amounts_floor_to_99_cents() {
        assert_eq!(smart_round(0.50), Some(0.99));
        assert_eq!(smart_round(0.10), Some(0.99));
        assert_eq!(smart_round(1.20), Some(0.99));
    }

    #[test]
    fn already_anchored_is_fixed_point() {
        for whole in [0.0, 4.0, 19.0, 59.0, 199.0] {
            let p = anchor(whole);
            assert_eq!(smart_round(p), Some(p));
        }
    }

    #[test]
    fn non_positive_is_unavailable() {
        assert_eq!(smart_round(0.0), None);
        assert_eq!(smart_round(-5.0), None);
        assert_eq!(smart_round(f64::NAN), None);
        assert_eq!(smart_round(f64::INFINITY), None);
    }

    #[test]
    fn band_offsets() {
        let band = derive_band(Some(19.99));
        assert_eq!(band.upper, Some(24.99));
        assert_eq!(band.lower, Some(14.99));

        let band = derive_band(Some(40.0));
        assert_eq!(band.upper, Some(49.99));
        assert_eq!(band.lower, Some(29.99));
    }

    #[test]
    fn band_unavailable_for_na_or_zero() {
        assert_eq!(derive_band(None), PriceBand::default());
        assert_eq!(derive_band(Some(0.0)), PriceBand { upper: None, lower: None });
    }
}
