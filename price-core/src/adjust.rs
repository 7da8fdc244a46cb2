//! Business-input adjustments applied to the market price.
//!
//! Every rule contributes a whole-percent delta. Deltas are summed in basis
//! points, so the resulting factor is exact and independent of rule order.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{AdjustmentInputs, Price};

const HIGH_INCOME_COUNTRIES: &[&str] = &[
    "us", "ca", "gb", "de", "fr", "it", "es", "nl", "be", "ch", "at", "se", "no", "dk", "fi",
    "au", "nz", "jp", "kr", "sg",
];

const LEAST_DEVELOPED_COUNTRIES: &[&str] = &[
    "af", "bd", "bf", "bi", "cf", "td", "km", "cd", "dj", "er", "et", "gm", "gn", "gw", "ht",
    "kh", "la", "lr", "mg", "mw", "ml", "mr", "mz", "mm", "ne", "rw", "st", "sn", "sl", "so",
    "ss", "sd", "tl", "tg", "ug", "tz", "ye", "zm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "snake_case")]
#[tsify(into_wasm_abi)]
pub enum AdjustmentRule {
    WishlistLarge,
    WishlistSmall,
    DevEffortHigh,
    DevEffortLow,
    MarketingBudget,
    SteamCut,
    RefundRate,
    Chargebacks,
    GeneralDiscounting,
    CountryHighIncome,
    CountryLeastDeveloped,
}

impl AdjustmentRule {
    /// Signed effect in basis points (100 bps = 1%).
    pub fn delta_bps(&self) -> i32 {
        match self {
            AdjustmentRule::WishlistLarge => -1000,
            AdjustmentRule::WishlistSmall => 500,
            AdjustmentRule::DevEffortHigh => 800,
            AdjustmentRule::DevEffortLow => -1200,
            AdjustmentRule::MarketingBudget => 500,
            AdjustmentRule::SteamCut => 1000,
            AdjustmentRule::RefundRate => 300,
            AdjustmentRule::Chargebacks => 200,
            AdjustmentRule::GeneralDiscounting => 500,
            AdjustmentRule::CountryHighIncome => -500,
            AdjustmentRule::CountryLeastDeveloped => -1000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdjustmentRule::WishlistLarge => "wishlist_large",
            AdjustmentRule::WishlistSmall => "wishlist_small",
            AdjustmentRule::DevEffortHigh => "dev_effort_high",
            AdjustmentRule::DevEffortLow => "dev_effort_low",
            AdjustmentRule::MarketingBudget => "marketing_budget",
            AdjustmentRule::SteamCut => "steam_cut",
            AdjustmentRule::RefundRate => "refund_rate",
            AdjustmentRule::Chargebacks => "chargebacks",
            AdjustmentRule::GeneralDiscounting => "general_discounting",
            AdjustmentRule::CountryHighIncome => "country_high_income",
            AdjustmentRule::CountryLeastDeveloped => "country_least_developed",
        }
    }
}

/// Which rules fired for one set of inputs, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct AdjustmentBreakdown {
    pub rules: Vec<AdjustmentRule>,
}

impl AdjustmentBreakdown {
    pub fn net_bps(&self) -> i32 {
        self.rules.iter().map(AdjustmentRule::delta_bps).sum()
    }

    /// Multiplicative factor, 1.0 when nothing fired.
    pub fn factor(&self) -> f64 {
        f64::from(10_000 + self.net_bps()) / 10_000.0
    }
}

fn country_rule(code: &str) -> Option<AdjustmentRule> {
    let code = code.trim().to_lowercase();
    if HIGH_INCOME_COUNTRIES.contains(&code.as_str()) {
        Some(AdjustmentRule::CountryHighIncome)
    } else if LEAST_DEVELOPED_COUNTRIES.contains(&code.as_str()) {
        Some(AdjustmentRule::CountryLeastDeveloped)
    } else {
        None
    }
}

/// Evaluate every rule against `inputs`.
pub fn breakdown(inputs: &AdjustmentInputs) -> AdjustmentBreakdown {
    let mut rules = Vec::new();

    match inputs.wishlist_count {
        n if n >= 30_000 => rules.push(AdjustmentRule::WishlistLarge),
        n if n > 0 && n < 20_000 => rules.push(AdjustmentRule::WishlistSmall),
        _ => {}
    }

    let effort = u64::from(inputs.dev_time_months) * u64::from(inputs.team_size);
    if effort > 60 {
        rules.push(AdjustmentRule::DevEffortHigh);
    } else if effort > 0 && effort < 24 {
        rules.push(AdjustmentRule::DevEffortLow);
    }

    if inputs.marketing_cost >= 25_000.0 {
        rules.push(AdjustmentRule::MarketingBudget);
    }
    if inputs.steam_cut {
        rules.push(AdjustmentRule::SteamCut);
    }
    if inputs.refund_rate {
        rules.push(AdjustmentRule::RefundRate);
    }
    if inputs.chargebacks {
        rules.push(AdjustmentRule::Chargebacks);
    }
    if inputs.general_discounting > 0.0 {
        rules.push(AdjustmentRule::GeneralDiscounting);
    }
    rules.extend(country_rule(&inputs.country_code));

    AdjustmentBreakdown { rules }
}

/// Apply the adjustment model to a base price.
///
/// N/A for an N/A or zero base. A net-zero adjustment returns `base` as is;
/// otherwise `base × factor`, floored at zero.
pub fn adjust(base: Price, inputs: &AdjustmentInputs) -> Price {
    let base = base.filter(|b| *b != 0.0 && b.is_finite())?;
    let breakdown = breakdown(inputs);

    #[cfg(feature = "audit")]
    for rule in &breakdown.rules {
        tracing::info!(
            target: "adjustment",
            rule = rule.name(),
            delta_bps = i64::from(rule.delta_bps()),
        );
    }

    let net = breakdown.net_bps();
    if net == 0 {
        return Some(base);
    }
    let adjusted = base * f64::from(10_000 + net) / 10_000.0;
    Some(adjusted.max(0.0))
}
