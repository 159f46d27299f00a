//! Holds the current catalog snapshot.
//!
//! Readers take an `Arc<Catalog>` snapshot and keep using it for as long as
//! they need; a reload builds a complete new catalog and swaps the pointer, so
//! a snapshot already handed out is never mutated.

use crate::catalog::model::Catalog;
use crate::catalog::source::CatalogSource;
use crate::error::CatalogError;
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default)]
/// Shared, read-only catalog with atomic replacement.
pub struct CatalogStore {
    current: ArcSwapOption<Catalog>,
    source: Option<CatalogSource>,
}

impl CatalogStore {
    /// A store with nothing loaded yet; readiness checks report it as not ready.
    pub fn empty(source: Option<CatalogSource>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            source,
        }
    }

    /// Wrap an already built catalog (tests and one-shot tools).
    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(catalog),
            source: None,
        }
    }

    /// Load from `source`, failing when the initial load fails.
    pub fn open(source: CatalogSource) -> Result<Self, CatalogError> {
        let catalog = source.load()?;
        Ok(Self {
            current: ArcSwapOption::from_pointee(catalog),
            source: Some(source),
        })
    }

    pub fn source(&self) -> Option<&CatalogSource> {
        self.source.as_ref()
    }

    /// Current catalog, if one has been loaded.
    pub fn snapshot(&self) -> Option<Arc<Catalog>> {
        self.current.load_full()
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }

    /// Swap in a new catalog wholesale.
    pub fn replace(&self, catalog: Catalog) {
        self.current.store(Some(Arc::new(catalog)));
    }

    /// Re-read the configured source.
    ///
    /// On failure the previous catalog stays in place and the error is returned
    /// to the caller. A store without a source has nothing to reload and keeps
    /// its current contents.
    pub fn reload(&self) -> Result<Option<Arc<Catalog>>, CatalogError> {
        let Some(source) = &self.source else {
            return Ok(self.snapshot());
        };
        match source.load() {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                self.current.store(Some(Arc::clone(&catalog)));
                info!(
                    repos = catalog.repos.len(),
                    actions = catalog.actions.len(),
                    "catalog reloaded"
                );
                Ok(Some(catalog))
            }
            Err(err) => {
                warn!("catalog reload failed, keeping previous catalog: {err}");
                Err(err)
            }
        }
    }
}
