use crate::catalog::{Catalog, GameRecord};
use crate::types::{ComparableGame, Price, leading_float};

// ============================================================================
// Market Average - Mean launch price of the comparables
// ============================================================================

/// Launch price from a price cell such as `$15.99`; `None` unless positive.
pub fn parse_price(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    let cell = cell.strip_prefix('$').unwrap_or(cell);
    leading_float(cell).filter(|p| *p > 0.0)
}

/// Arithmetic mean of the valid candidate prices.
///
/// Invalid prices are skipped, not counted as zero. N/A when none remain.
pub fn average_price(catalog: &Catalog, candidates: &[&GameRecord]) -> Price {
    let prices: Vec<f64> = candidates
        .iter()
        .filter_map(|record| catalog.price_of(record).and_then(parse_price))
        .collect();
    if prices.is_empty() {
        return None;
    }
    Some(prices.iter().sum::<f64>() / prices.len() as f64)
}

/// Priced candidates in catalog order, at most `limit` of them.
pub fn comparables(catalog: &Catalog, candidates: &[&GameRecord], limit: usize) -> Vec<ComparableGame> {
    candidates
        .iter()
        .filter_map(|record| {
            let price = catalog.price_of(record).and_then(parse_price)?;
            Some(ComparableGame {
                name: catalog.name_of(record).unwrap_or("").to_string(),
                genre: catalog.genre_of(record).unwrap_or("").to_string(),
                price,
            })
        })
        .take(limit)
        .collect()
}
