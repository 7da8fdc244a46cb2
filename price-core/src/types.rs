use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

/// Price value with `None` as the N/A sentinel.
pub type Price = Option<f64>;

// ============================================================================
// Scope - Playtime bucket selected by the user
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "lowercase")]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Scope {
    Compact,
    Standard,
    High,
    #[default]
    None,
}

/// Scope label used for every multiplayer title in the catalog.
pub const MULTIPLAYER_SCOPE_LABEL: &str = "Unscoped/Multiplayer";

impl Scope {
    /// Parse the UI value (`compact|standard|high|""`). Anything else is no scope.
    pub fn from_ui(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Scope::Compact,
            "standard" => Scope::Standard,
            "high" => Scope::High,
            _ => Scope::None,
        }
    }

    /// Exact scope-column label in the catalog.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Scope::Compact => Some("Compact 0-5h"),
            Scope::Standard => Some("Standard 5-15h"),
            Scope::High => Some("High 15h+"),
            Scope::None => None,
        }
    }
}

// ============================================================================
// Genre tags - UI slugs and their catalog labels
// ============================================================================

const GENRE_LABELS: &[(&str, &str)] = &[
    ("darkfantasy", "Dark Fantasy"),
    ("scifi", "Sci-fi"),
    ("noir", "Noir/Detective"),
    ("storyrich", "Story Rich"),
    ("postapocalyptic", "Post Apocalyptic"),
    ("fantasy", "Fantasy"),
    ("action", "Action"),
    ("rpg", "RPG"),
    ("strategy", "Strategy"),
    ("adventure", "Adventure"),
    ("simulation", "Simulation"),
    ("sports", "Sports"),
    ("racing", "Racing"),
    ("puzzle games", "Puzzle Games"),
    ("puzzle", "Puzzle Games"),
    ("horror", "Horror"),
    ("cozy", "Cozy/Relaxing"),
    ("survival", "Survival"),
    ("shooter", "Shooter"),
    ("platformer", "Platformer"),
    ("fighting", "Fighting"),
    ("mmo", "MMO"),
    ("indie", "Indie"),
    ("roguelike", "Roguelike"),
    ("sandbox", "Sandbox"),
    ("educational", "Educational"),
    ("cyberpunk", "Cyberpunk/Dystopian"),
    ("comedy", "Comedy"),
    ("historical", "Historical"),
];

/// Canonical catalog label for a tag slug, if the slug is known.
pub fn genre_label(slug: &str) -> Option<&'static str> {
    let slug = slug.trim().to_lowercase();
    GENRE_LABELS
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, label)| *label)
}

/// Every known tag slug, in display order.
pub fn genre_slugs() -> impl Iterator<Item = &'static str> {
    GENRE_LABELS.iter().map(|(slug, _)| *slug)
}

// ============================================================================
// Selection Criteria - What the user is pricing
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SelectionCriteria {
    pub tags: Vec<String>,
    pub scope: Scope,
    pub is_multiplayer: bool,
}

impl SelectionCriteria {
    pub fn new(tags: &[&str], scope: Scope, is_multiplayer: bool) -> Self {
        Self {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            scope,
            is_multiplayer,
        }
    }
}

// ============================================================================
// Adjustment Inputs - Business facts supplied by the developer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[serde(default)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct AdjustmentInputs {
    pub wishlist_count: u32,
    pub dev_time_months: u32,
    pub team_size: u32,
    pub marketing_cost: f64,
    pub country_code: String,
    pub steam_cut: bool,
    pub refund_rate: bool,
    pub chargebacks: bool,
    pub general_discounting: f64,
}

/// Raw form values as the page reads them, before any numeric parsing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[serde(default)]
#[tsify(from_wasm_abi)]
pub struct FormInputs {
    pub wishlist_count: String,
    /// Dropdown value such as `"12 months"`.
    pub dev_time: String,
    pub team_size: String,
    pub marketing_cost: String,
    pub country_code: String,
    pub steam_cut: bool,
    pub refund_rate: bool,
    pub chargebacks: bool,
    pub general_discounting: String,
}

impl From<&FormInputs> for AdjustmentInputs {
    /// Malformed or negative numbers decode to zero.
    fn from(form: &FormInputs) -> Self {
        let months = form.dev_time.replace("months", "").replace("month", "");
        Self {
            wishlist_count: leading_int(&form.wishlist_count),
            dev_time_months: leading_int(&months),
            team_size: leading_int(&form.team_size),
            marketing_cost: leading_float(&form.marketing_cost).unwrap_or(0.0).max(0.0),
            country_code: form.country_code.trim().to_lowercase(),
            steam_cut: form.steam_cut,
            refund_rate: form.refund_rate,
            chargebacks: form.chargebacks,
            general_discounting: leading_float(&form.general_discounting)
                .unwrap_or(0.0)
                .max(0.0),
        }
    }
}

/// Non-negative integer prefix of `s`; zero when there is none.
fn leading_int(s: &str) -> u32 {
    let s = s.trim();
    let s = s.strip_prefix('+').unwrap_or(s);
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(if digits.is_empty() { 0 } else { u32::MAX })
}

/// Longest decimal prefix of `s` (sign, digits, one dot, optional exponent).
pub(crate) fn leading_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }
    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits = bytes[exp_end..].iter().take_while(|b| b.is_ascii_digit()).count();
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

// ============================================================================
// Price Quote - The four outputs of one calculation
// ============================================================================

/// A candidate shown alongside the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ComparableGame {
    pub name: String,
    pub genre: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct PriceQuote {
    /// Smart-rounded market average.
    pub price_a: Price,
    /// Adjusted price.
    pub price_b: Price,
    /// Upper band.
    pub price_c: Price,
    /// Lower band.
    pub price_d: Price,
    pub candidate_count: usize,
    pub comparables: Vec<ComparableGame>,
}

impl PriceQuote {
    /// All four prices N/A.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_unavailable(&self) -> bool {
        self.price_a.is_none()
            && self.price_b.is_none()
            && self.price_c.is_none()
            && self.price_d.is_none()
    }
}

/// `$19.99` style text, or `N/A`.
pub fn format_price(price: Price) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "N/A".to_string(),
    }
}

// ============================================================================
// Engine Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Endpoint the host fetches the catalog CSV from.
    pub csv_endpoint: String,
    /// Use the built-in sample catalog when the fetch fails.
    pub sample_fallback: bool,
    pub max_tags: usize,
    /// Per-genre candidate cap in multiplayer mode.
    pub multiplayer_genre_cap: usize,
    /// Comparable games attached to each quote.
    pub showcase_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            csv_endpoint: "/api/sheets".to_string(),
            sample_fallback: true,
            max_tags: 5,
            multiplayer_genre_cap: 2,
            showcase_limit: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid engine config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("max_tags must be at least 1")]
    NoTags,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_tags == 0 {
            return Err(ConfigError::NoTags);
        }
        Ok(())
    }
}
