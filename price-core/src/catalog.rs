use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::csv::RawRow;

// ============================================================================
// Game Record - One catalog row keyed by header text
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameRecord {
    fields: HashMap<String, String>,
}

impl GameRecord {
    /// Value under `header`, or `""` when the header is unknown.
    pub fn get(&self, header: &str) -> &str {
        self.fields.get(header).map(String::as_str).unwrap_or("")
    }

    /// Value for a resolved role; `None` when the role is unresolved.
    pub fn role(&self, column: Option<&str>) -> Option<&str> {
        column.map(|c| self.get(c))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ============================================================================
// Column Roles - Which header plays which part
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ColumnRoles {
    pub name: Option<String>,
    pub genre: Option<String>,
    pub scope: Option<String>,
    pub price: Option<String>,
}

const NAME_ALIASES: &[&str] = &["GAME NAME", "Game Name", "Name", "Title"];
const GENRE_ALIASES: &[&str] = &["Genre/Theme", "Genre", "Theme", "Category"];
const SCOPE_ALIASES: &[&str] = &["SCOPE/Avg. Playtime", "Scope", "Playtime", "Duration"];
const PRICE_ALIASES: &[&str] = &["Launch Price(Adj.)", "Price", "Launch Price", "Cost"];

/// First alias (in priority order) that overlaps any header.
///
/// Overlap is case-insensitive containment in either direction.
fn find_column(headers: &[String], aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| {
        let alias = alias.to_lowercase();
        headers
            .iter()
            .filter(|h| !h.is_empty())
            .find(|h| {
                let h = h.to_lowercase();
                h.contains(&alias) || alias.contains(&h)
            })
            .cloned()
    })
}

/// Identify the name/genre/scope/price columns of a catalog.
pub fn resolve_columns(headers: &[String]) -> ColumnRoles {
    ColumnRoles {
        name: find_column(headers, NAME_ALIASES),
        genre: find_column(headers, GENRE_ALIASES),
        scope: find_column(headers, SCOPE_ALIASES),
        price: find_column(headers, PRICE_ALIASES),
    }
}

// ============================================================================
// Catalog - Normalized records plus their column roles
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Distinct trimmed headers in column order.
    pub headers: Vec<String>,
    pub records: Vec<GameRecord>,
    pub roles: ColumnRoles,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn genre_of<'a>(&self, record: &'a GameRecord) -> Option<&'a str> {
        record.role(self.roles.genre.as_deref())
    }

    pub fn scope_of<'a>(&self, record: &'a GameRecord) -> Option<&'a str> {
        record.role(self.roles.scope.as_deref())
    }

    pub fn price_of<'a>(&self, record: &'a GameRecord) -> Option<&'a str> {
        record.role(self.roles.price.as_deref())
    }

    pub fn name_of<'a>(&self, record: &'a GameRecord) -> Option<&'a str> {
        record.role(self.roles.name.as_deref())
    }

    /// Per-genre and per-scope record counts, for the genre and scope pickers.
    pub fn summary(&self) -> CatalogSummary {
        let mut genres: BTreeMap<String, usize> = BTreeMap::new();
        let mut scopes: BTreeMap<String, usize> = BTreeMap::new();
        for record in &self.records {
            if let Some(genre) = self.genre_of(record).filter(|g| !g.is_empty()) {
                *genres.entry(genre.to_string()).or_insert(0) += 1;
            }
            if let Some(scope) = self.scope_of(record).filter(|s| !s.is_empty()) {
                *scopes.entry(scope.to_string()).or_insert(0) += 1;
            }
        }
        CatalogSummary {
            games: self.records.len(),
            genres,
            scopes,
            roles: self.roles.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct CatalogSummary {
    pub games: usize,
    pub genres: BTreeMap<String, usize>,
    pub scopes: BTreeMap<String, usize>,
    pub roles: ColumnRoles,
}

/// Build a catalog from parsed rows; `rows[0]` is the header.
///
/// Short rows are padded with empty strings and cells past the header width
/// are ignored. Repeated header names keep the value of their last column.
pub fn normalize(rows: Vec<RawRow>) -> Catalog {
    let mut rows = rows.into_iter();
    let Some(header_row) = rows.next() else {
        return Catalog::default();
    };
    let header_row: Vec<String> = header_row.iter().map(|h| h.trim().to_string()).collect();

    let records = rows
        .map(|row| {
            let fields = header_row
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    let value = row.get(i).map(|c| c.trim()).unwrap_or("");
                    (h.clone(), value.to_string())
                })
                .collect();
            GameRecord { fields }
        })
        .collect();

    let mut headers: Vec<String> = Vec::with_capacity(header_row.len());
    for h in header_row {
        if !headers.contains(&h) {
            headers.push(h);
        }
    }

    let roles = resolve_columns(&headers);
    Catalog {
        headers,
        records,
        roles,
    }
}

/// Parse and normalize CSV text in one step.
pub fn from_csv(text: &str) -> Catalog {
    normalize(crate::csv::parse(text))
}

/// Built-in catalog used when the remote sheet cannot be fetched.
pub const SAMPLE_CSV: &str = "\
GAME NAME,Genre/Theme,SCOPE/Avg. Playtime,Launch Price(Adj.)
Game1,Action,Compact 0-5h,15.99
Game2,Action,Compact 0-5h,18.99
Game3,Action,Compact 0-5h,12.99
Game4,Action,Compact 0-5h,22.99
Game5,Action,Compact 0-5h,16.99
Game6,Action,Standard 5-15h,29.99
Game7,Action,Standard 5-15h,34.99
Game8,Action,Standard 5-15h,27.99
Game9,Action,Standard 5-15h,31.99
Game10,Action,Standard 5-15h,25.99
Game11,Action,High 15h+,49.99
Game12,Action,High 15h+,59.99
Game13,Action,High 15h+,44.99
Game14,Action,High 15h+,54.99
Game15,Action,High 15h+,39.99
Game16,Action,Unscoped/Multiplayer,24.99
Game17,Action,Unscoped/Multiplayer,19.99
Game18,RPG,Compact 0-5h,19.99
Game19,RPG,Compact 0-5h,24.99
Game20,RPG,Compact 0-5h,17.99";

pub fn sample() -> Catalog {
    from_csv(SAMPLE_CSV)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_exact_sheet_headers() {
        let roles = resolve_columns(&headers(&["Launch Price(Adj.)", "Genre/Theme"]));
        assert_eq!(roles.price.as_deref(), Some("Launch Price(Adj.)"));
        assert_eq!(roles.genre.as_deref(), Some("Genre/Theme"));
        assert_eq!(roles.name, None);
        assert_eq!(roles.scope, None);
    }

    #[test]
    fn resolves_loose_headers() {
        let roles = resolve_columns(&headers(&["title", "category", "avg playtime", "usd cost"]));
        assert_eq!(roles.name.as_deref(), Some("title"));
        assert_eq!(roles.genre.as_deref(), Some("category"));
        assert_eq!(roles.scope.as_deref(), Some("avg playtime"));
        assert_eq!(roles.price.as_deref(), Some("usd cost"));
    }

    #[test]
    fn earlier_alias_wins_over_column_order() {
        // "Genre" outranks "Category" even though the category column comes first.
        let roles = resolve_columns(&headers(&["Category", "Genre"]));
        assert_eq!(roles.genre.as_deref(), Some("Genre"));

        // Within one alias, the first overlapping column wins.
        let roles = resolve_columns(&headers(&["Theme", "Genre"]));
        assert_eq!(roles.genre.as_deref(), Some("Theme"));
    }

    #[test]
    fn header_contained_in_alias_matches() {
        let roles = resolve_columns(&headers(&["scope"]));
        assert_eq!(roles.scope.as_deref(), Some("scope"));
    }

    #[test]
    fn empty_header_never_matches() {
        let roles = resolve_columns(&headers(&["", "Genre"]));
        assert_eq!(roles.genre.as_deref(), Some("Genre"));
        assert_eq!(roles.price, None);
    }

    #[test]
    fn short_rows_are_padded() {
        let catalog = from_csv("Name,Genre,Price\nGame1,Action\nGame2,RPG,9.99,extra");
        assert_eq!(catalog.len(), 2);
        let first = &catalog.records[0];
        assert_eq!(first.len(), 3);
        assert_eq!(first.get("Price"), "");
        assert_eq!(catalog.records[1].get("Price"), "9.99");
        assert_eq!(catalog.records[1].len(), 3);
    }

    #[test]
    fn every_record_has_header_keys() {
        let catalog = sample();
        assert_eq!(catalog.len(), 20);
        for record in &catalog.records {
            assert_eq!(record.len(), catalog.headers.len());
        }
    }

    #[test]
    fn sample_roles_and_summary() {
        let catalog = sample();
        assert_eq!(catalog.roles.name.as_deref(), Some("GAME NAME"));
        assert_eq!(catalog.roles.scope.as_deref(), Some("SCOPE/Avg. Playtime"));
        let summary = catalog.summary();
        assert_eq!(summary.games, 20);
        assert_eq!(summary.genres["Action"], 17);
        assert_eq!(summary.genres["RPG"], 3);
        assert_eq!(summary.scopes["Unscoped/Multiplayer"], 2);
    }

    #[test]
    fn empty_rows_give_empty_catalog() {
        let catalog = normalize(Vec::new());
        assert!(catalog.is_empty());
        assert_eq!(catalog.roles, ColumnRoles::default());
    }

    #[test]
    fn unresolved_role_reads_as_none() {
        let catalog = from_csv("Name,Price\nGame1,5");
        assert_eq!(catalog.genre_of(&catalog.records[0]), None);
        assert_eq!(catalog.price_of(&catalog.records[0]), Some("5"));
    }
}
