use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::catalog::{self, Catalog};

// ============================================================================
// Fetch Outcome - What the host's HTTP request produced
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Response { status: u16, body: String },
    NetworkError(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("catalog request failed with HTTP {0}")]
    HttpStatus(u16),
    #[error("catalog request failed: {0}")]
    Network(String),
    #[error("catalog contains no games")]
    EmptyCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[serde(rename_all = "lowercase")]
#[tsify(into_wasm_abi)]
pub enum CatalogSource {
    Remote,
    Sample,
}

impl CatalogSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogSource::Remote => "remote",
            CatalogSource::Sample => "sample",
        }
    }
}

/// Parse a successful response into a catalog.
pub fn catalog_from_outcome(outcome: FetchOutcome) -> Result<Catalog, LoadError> {
    match outcome {
        FetchOutcome::Response { status, body } if (200..300).contains(&status) => {
            let catalog = catalog::from_csv(&body);
            if catalog.is_empty() {
                Err(LoadError::EmptyCatalog)
            } else {
                Ok(catalog)
            }
        }
        FetchOutcome::Response { status, .. } => Err(LoadError::HttpStatus(status)),
        FetchOutcome::NetworkError(msg) => Err(LoadError::Network(msg)),
    }
}

// ============================================================================
// Catalog Loader - Not ready until a fetch outcome arrives
// ============================================================================

#[derive(Debug, Clone, Default)]
pub enum CatalogLoader {
    #[default]
    Pending,
    Ready {
        catalog: Catalog,
        source: CatalogSource,
    },
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::Pending
    }

    /// The catalog, once loading has finished.
    pub fn catalog(&self) -> Option<&Catalog> {
        match self {
            CatalogLoader::Pending => None,
            CatalogLoader::Ready { catalog, .. } => Some(catalog),
        }
    }

    pub fn source(&self) -> Option<CatalogSource> {
        match self {
            CatalogLoader::Pending => None,
            CatalogLoader::Ready { source, .. } => Some(*source),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, CatalogLoader::Ready { .. })
    }

    /// Install the catalog from a fetch outcome, replacing any previous one.
    ///
    /// When the fetch failed and `sample_fallback` is set, the built-in
    /// sample catalog is installed instead and the error is only logged.
    /// Without fallback the error is returned and the loader is left as is.
    pub fn complete(&mut self, outcome: FetchOutcome, sample_fallback: bool) -> Result<CatalogSource, LoadError> {
        let (catalog, source) = match catalog_from_outcome(outcome) {
            Ok(catalog) => (catalog, CatalogSource::Remote),
            Err(err) if sample_fallback => {
                #[cfg(feature = "audit")]
                tracing::warn!(target: "catalog_load", error = %err, "falling back to sample catalog");
                let _ = err; // Only read by the audit log
                (catalog::sample(), CatalogSource::Sample)
            }
            Err(err) => return Err(err),
        };

        #[cfg(feature = "audit")]
        tracing::info!(
            target: "catalog_load",
            source = source.as_str(),
            games = catalog.len() as u64,
            name_column = catalog.roles.name.as_deref().unwrap_or(""),
            genre_column = catalog.roles.genre.as_deref().unwrap_or(""),
            scope_column = catalog.roles.scope.as_deref().unwrap_or(""),
            price_column = catalog.roles.price.as_deref().unwrap_or(""),
        );

        *self = CatalogLoader::Ready { catalog, source };
        Ok(source)
    }

    /// Install the sample catalog directly.
    pub fn load_sample(&mut self) {
        *self = CatalogLoader::Ready {
            catalog: catalog::sample(),
            source: CatalogSource::Sample,
        };
    }
}
