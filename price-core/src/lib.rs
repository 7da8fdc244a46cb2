use wasm_bindgen::prelude::*;

pub mod adjust;
pub mod catalog;
pub mod csv;
pub mod gate;
pub mod loader;
pub mod market;
pub mod matcher;
pub mod quote;
pub mod rounding;
pub mod types;

pub use adjust::{AdjustmentBreakdown, AdjustmentRule, adjust, breakdown};
pub use catalog::{Catalog, CatalogSummary, ColumnRoles, GameRecord, normalize, resolve_columns};
pub use gate::{AccessTier, GatedQuote, gate};
pub use loader::{CatalogLoader, CatalogSource, FetchOutcome, LoadError};
pub use market::average_price;
pub use matcher::match_comparables;
pub use quote::calculate;
pub use rounding::{PriceBand, derive_band, smart_round};
pub use types::*;

#[cfg(feature = "audit")]
pub use pricing_audit as audit;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// ============================================================================
// WASM API - Pricing Calculator
// ============================================================================

#[wasm_bindgen]
pub struct PricingCalculator {
    config: EngineConfig,
    loader: CatalogLoader,
}

impl Default for PricingCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl PricingCalculator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Create a calculator from a JSON config; missing keys take defaults.
    #[wasm_bindgen]
    pub fn with_config(config_json: &str) -> Result<PricingCalculator, JsValue> {
        let config = EngineConfig::from_json(config_json).map_err(js_error)?;
        Ok(Self::from_config(config))
    }

    /// Create a calculator from a plain JS object, e.g. `{ max_tags: 3 }`.
    #[wasm_bindgen]
    pub fn with_config_object(config: JsValue) -> Result<PricingCalculator, JsValue> {
        let config: EngineConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
        config.validate().map_err(js_error)?;
        Ok(Self::from_config(config))
    }

    /// Calculator already loaded with the built-in sample catalog
    #[wasm_bindgen]
    pub fn with_sample() -> Self {
        let mut calc = Self::new();
        calc.loader.load_sample();
        calc
    }

    /// Endpoint the page should fetch the catalog CSV from
    #[wasm_bindgen]
    pub fn csv_endpoint(&self) -> String {
        self.config.csv_endpoint.clone()
    }

    #[wasm_bindgen]
    pub fn is_ready(&self) -> bool {
        self.loader.is_ready()
    }

    /// Hand over the catalog response. Returns `"remote"` or `"sample"`.
    #[wasm_bindgen]
    pub fn load_response(&mut self, status: u16, body: String) -> Result<String, JsValue> {
        self.complete_load(FetchOutcome::Response { status, body })
            .map(|s| s.as_str().to_string())
            .map_err(js_error)
    }

    /// Report a failed catalog request (network error, CORS, ...).
    #[wasm_bindgen]
    pub fn load_failed(&mut self, message: String) -> Result<String, JsValue> {
        self.complete_load(FetchOutcome::NetworkError(message))
            .map(|s| s.as_str().to_string())
            .map_err(js_error)
    }

    /// Genre and scope counts of the loaded catalog, if ready
    #[wasm_bindgen]
    pub fn catalog_summary(&self) -> Option<CatalogSummary> {
        self.loader.catalog().map(Catalog::summary)
    }

    /// Every tag slug the matcher understands
    #[wasm_bindgen]
    pub fn genre_tags() -> Vec<String> {
        genre_slugs().map(str::to_string).collect()
    }

    #[wasm_bindgen]
    pub fn calculate(
        &self,
        tags: Vec<String>,
        scope: &str,
        is_multiplayer: bool,
        inputs: AdjustmentInputs,
    ) -> PriceQuote {
        self.quote(&criteria(tags, scope, is_multiplayer), &inputs)
    }

    /// Same as `calculate`, decoding raw form strings first.
    #[wasm_bindgen]
    pub fn calculate_form(
        &self,
        tags: Vec<String>,
        scope: &str,
        is_multiplayer: bool,
        form: FormInputs,
    ) -> PriceQuote {
        self.quote(&criteria(tags, scope, is_multiplayer), &AdjustmentInputs::from(&form))
    }

    /// Quote masked for the user's entitlement.
    #[wasm_bindgen]
    pub fn calculate_gated(
        &self,
        tags: Vec<String>,
        scope: &str,
        is_multiplayer: bool,
        inputs: AdjustmentInputs,
        entitled: bool,
        tier: Option<String>,
    ) -> GatedQuote {
        let quote = self.quote(&criteria(tags, scope, is_multiplayer), &inputs);
        gate(&quote, AccessTier::from_entitlement(entitled, tier.as_deref()))
    }

    /// Which adjustment rules the inputs trigger
    #[wasm_bindgen]
    pub fn explain(&self, inputs: AdjustmentInputs) -> AdjustmentBreakdown {
        breakdown(&inputs)
    }
}

impl PricingCalculator {
    pub fn from_config(config: EngineConfig) -> Self {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Self {
            config,
            loader: CatalogLoader::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.loader.catalog()
    }

    pub fn complete_load(&mut self, outcome: FetchOutcome) -> Result<CatalogSource, LoadError> {
        self.loader.complete(outcome, self.config.sample_fallback)
    }

    pub fn quote(&self, criteria: &SelectionCriteria, inputs: &AdjustmentInputs) -> PriceQuote {
        calculate(self.loader.catalog(), criteria, inputs, &self.config)
    }
}

fn criteria(tags: Vec<String>, scope: &str, is_multiplayer: bool) -> SelectionCriteria {
    SelectionCriteria {
        tags,
        scope: Scope::from_ui(scope),
        is_multiplayer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pending_calculator_quotes_na() {
        let calc = PricingCalculator::new();
        assert!(!calc.is_ready());
        let quote = calc.calculate(tags(&["action"]), "compact", false, AdjustmentInputs::default());
        assert!(quote.is_unavailable());
        assert!(calc.catalog_summary().is_none());
    }

    #[test]
    fn sample_calculator_prices_action_compact() {
        let calc = PricingCalculator::with_sample();
        // Game1..Game5: (15.99 + 18.99 + 12.99 + 22.99 + 16.99) / 5 = 17.59
        let quote = calc.calculate(tags(&["action"]), "compact", false, AdjustmentInputs::default());
        assert_eq!(quote.price_a, Some(17.99));
        assert_eq!(quote.price_b, Some(17.99));
        assert_eq!(quote.candidate_count, 5);
    }

    #[test]
    fn load_response_success_and_fallback() {
        let mut calc = PricingCalculator::new();
        assert_eq!(
            calc.load_response(200, "Name,Genre,Scope,Price\nX,RPG,High 15h+,40".to_string())
                .ok()
                .as_deref(),
            Some("remote")
        );
        assert_eq!(calc.catalog().unwrap().len(), 1);

        assert_eq!(calc.load_response(502, String::new()).ok().as_deref(), Some("sample"));
        assert_eq!(calc.catalog().unwrap().len(), 20);
    }

    #[test]
    fn form_and_struct_inputs_agree() {
        let calc = PricingCalculator::with_sample();
        let form = FormInputs {
            wishlist_count: "35000".to_string(),
            dev_time: "2 months".to_string(),
            team_size: "2".to_string(),
            country_code: "us".to_string(),
            ..Default::default()
        };
        let from_form = calc.calculate_form(tags(&["rpg"]), "compact", false, form.clone());
        let from_struct = calc.calculate(
            tags(&["rpg"]),
            "compact",
            false,
            AdjustmentInputs::from(&form),
        );
        assert_eq!(from_form, from_struct);
    }

    #[test]
    fn gated_quote_for_free_user() {
        let calc = PricingCalculator::with_sample();
        let gated = calc.calculate_gated(
            tags(&["action"]),
            "high",
            false,
            AdjustmentInputs::default(),
            false,
            None,
        );
        assert!(gated.price_a.is_some());
        assert!(gated.price_c.is_none());
        assert!(gated.band_locked);
        assert_eq!(gated.comparables.len(), 1);
    }

    #[test]
    fn genre_tags_lists_known_slugs() {
        let slugs = PricingCalculator::genre_tags();
        assert!(slugs.contains(&"scifi".to_string()));
        assert!(slugs.iter().all(|s| genre_label(s).is_some()));
    }

    #[test]
    fn explain_reports_fired_rules() {
        let calc = PricingCalculator::new();
        let inputs = AdjustmentInputs {
            steam_cut: true,
            country_code: "et".to_string(),
            ..Default::default()
        };
        let b = calc.explain(inputs);
        assert_eq!(
            b.rules,
            vec![AdjustmentRule::SteamCut, AdjustmentRule::CountryLeastDeveloped]
        );
        assert_eq!(b.net_bps(), 0);
    }
}
