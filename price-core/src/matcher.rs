//! Comparable-game selection.
//!
//! Genre and scope matching are exact against catalog labels. In multiplayer
//! mode every genre contributes at most `genre_cap` titles.

use std::collections::HashMap;

use crate::catalog::{Catalog, GameRecord};
use crate::types::{MULTIPLAYER_SCOPE_LABEL, SelectionCriteria, genre_label};

/// Filter the catalog down to the comparables for `criteria`.
///
/// Only the first `max_tags` tags are used. Records keep catalog order.
pub fn match_comparables<'a>(
    catalog: &'a Catalog,
    criteria: &SelectionCriteria,
    max_tags: usize,
    genre_cap: usize,
) -> Vec<&'a GameRecord> {
    let labels: Vec<&str> = criteria
        .tags
        .iter()
        .take(max_tags)
        .filter_map(|tag| genre_label(tag))
        .collect();
    if labels.is_empty() {
        return Vec::new();
    }

    let required_scope = if criteria.is_multiplayer {
        Some(MULTIPLAYER_SCOPE_LABEL)
    } else {
        criteria.scope.label()
    };

    let candidates = catalog.records.iter().filter(|record| {
        let genre_ok = catalog
            .genre_of(*record)
            .is_some_and(|genre| labels.contains(&genre));
        let scope_ok = match required_scope {
            Some(label) => catalog.scope_of(*record) == Some(label),
            None => true,
        };
        genre_ok && scope_ok
    });

    if !criteria.is_multiplayer {
        return candidates.collect();
    }

    let mut per_genre: HashMap<&str, usize> = HashMap::new();
    candidates
        .filter(|record| {
            let genre = catalog.genre_of(*record).unwrap_or("");
            let seen = per_genre.entry(genre).or_insert(0);
            *seen += 1;
            *seen <= genre_cap
        })
        .collect()
}
