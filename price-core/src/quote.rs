use crate::adjust::adjust;
use crate::catalog::Catalog;
use crate::market::{average_price, comparables};
use crate::matcher::match_comparables;
use crate::rounding::{derive_band, smart_round};
use crate::types::{AdjustmentInputs, EngineConfig, PriceQuote, SelectionCriteria};

/// Run the full derivation: match → average → round → adjust → round → band.
///
/// A missing catalog (still loading) yields an all-N/A quote. Each stage
/// passes N/A forward instead of failing.
pub fn calculate(
    catalog: Option<&Catalog>,
    criteria: &SelectionCriteria,
    inputs: &AdjustmentInputs,
    config: &EngineConfig,
) -> PriceQuote {
    let Some(catalog) = catalog else {
        #[cfg(feature = "audit")]
        tracing::warn!(target: "quote", "catalog not ready");
        return PriceQuote::unavailable();
    };

    let candidates = match_comparables(
        catalog,
        criteria,
        config.max_tags,
        config.multiplayer_genre_cap,
    );

    let price_a = average_price(catalog, &candidates).and_then(smart_round);
    let price_b = adjust(price_a, inputs).and_then(smart_round);
    let band = derive_band(price_b);

    let quote = PriceQuote {
        price_a,
        price_b,
        price_c: band.upper,
        price_d: band.lower,
        candidate_count: candidates.len(),
        comparables: comparables(catalog, &candidates, config.showcase_limit),
    };

    #[cfg(feature = "audit")]
    tracing::info!(
        target: "quote",
        candidates = quote.candidate_count as u64,
        multiplayer = criteria.is_multiplayer,
        price_a = quote.price_a.unwrap_or(f64::NAN),
        price_b = quote.price_b.unwrap_or(f64::NAN),
        price_c = quote.price_c.unwrap_or(f64::NAN),
        price_d = quote.price_d.unwrap_or(f64::NAN),
    );

    quote
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{from_csv, sample};
    use crate::types::Scope;

    fn action_compact() -> Catalog {
        from_csv(
            "Name,Genre,Scope,Price\n\
             A,Action,Compact 0-5h,10\n\
             B,Action,Compact 0-5h,20\n\
             C,Action,Compact 0-5h,30",
        )
    }

    #[test]
    fn end_to_end_without_adjustments() {
        let catalog = action_compact();
        let criteria = SelectionCriteria::new(&["action"], Scope::Compact, false);
        let quote = calculate(
            Some(&catalog),
            &criteria,
            &AdjustmentInputs::default(),
            &EngineConfig::default(),
        );
        assert_eq!(quote.price_a, Some(19.99));
        assert_eq!(quote.price_b, Some(19.99));
        assert_eq!(quote.price_c, Some(24.99));
        assert_eq!(quote.price_d, Some(14.99));
        assert_eq!(quote.candidate_count, 3);
        assert_eq!(quote.comparables.len(), 3);
    }

    #[test]
    fn not_ready_is_all_na() {
        let criteria = SelectionCriteria::new(&["action"], Scope::Compact, false);
        let quote = calculate(None, &criteria, &AdjustmentInputs::default(), &EngineConfig::default());
        assert!(quote.is_unavailable());
        assert_eq!(quote.candidate_count, 0);
    }

    #[test]
    fn no_comparables_cascades_na() {
        let catalog = sample();
        let criteria = SelectionCriteria::new(&["horror"], Scope::High, false);
        let inputs = AdjustmentInputs {
            steam_cut: true,
            ..Default::default()
        };
        let quote = calculate(Some(&catalog), &criteria, &inputs, &EngineConfig::default());
        assert!(quote.is_unavailable());
        assert!(quote.comparables.is_empty());
    }

    #[test]
    fn empty_tag_list_is_na() {
        let catalog = sample();
        let criteria = SelectionCriteria::new(&[], Scope::None, false);
        let quote = calculate(Some(&catalog), &criteria, &AdjustmentInputs::default(), &EngineConfig::default());
        assert!(quote.is_unavailable());
    }

    #[test]
    fn adjusted_price_is_smart_rounded() {
        let catalog = from_csv("Name,Genre,Scope,Price\nA,RPG,High 15h+,100.49");
        let criteria = SelectionCriteria::new(&["rpg"], Scope::High, false);
        let inputs = AdjustmentInputs {
            wishlist_count: 35_000,
            dev_time_months: 2,
            team_size: 2,
            country_code: "us".to_string(),
            ..Default::default()
        };
        let quote = calculate(Some(&catalog), &criteria, &inputs, &EngineConfig::default());
        // 100.99 × 0.73 = 73.7227
        assert_eq!(quote.price_a, Some(100.99));
        assert_eq!(quote.price_b, Some(73.99));
        // 73.99 × 1.25 = 92.4875, 73.99 × 0.75 = 55.4925
        assert_eq!(quote.price_c, Some(91.99));
        assert_eq!(quote.price_d, Some(55.99));
    }

    #[test]
    fn identical_inputs_identical_quotes() {
        let catalog = sample();
        let criteria = SelectionCriteria::new(&["action", "rpg"], Scope::Compact, false);
        let inputs = AdjustmentInputs {
            wishlist_count: 12_000,
            marketing_cost: 30_000.0,
            country_code: "bd".to_string(),
            ..Default::default()
        };
        let config = EngineConfig::default();
        let first = calculate(Some(&catalog), &criteria, &inputs, &config);
        let second = calculate(Some(&catalog), &criteria, &inputs, &config);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
