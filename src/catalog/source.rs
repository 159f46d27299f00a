//! Reads the two catalog documents from disk.
//!
//! Loading is all-or-nothing: an unreadable file, malformed YAML, a schema
//! violation, or a shape mismatch fails the whole load and no partial catalog
//! is produced.

use crate::catalog::model::{ActionsFile, Catalog, RepoList};
use crate::config::IndexConfig;
use crate::error::CatalogError;
use crate::schema::{DocumentKind, DocumentSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where the catalog documents live.
pub struct CatalogSource {
    pub repos: PathBuf,
    pub actions: PathBuf,
}

impl CatalogSource {
    pub fn new(repos: impl Into<PathBuf>, actions: impl Into<PathBuf>) -> Self {
        Self {
            repos: repos.into(),
            actions: actions.into(),
        }
    }

    /// Resolve document paths from the config, relative to `root`.
    pub fn from_config(root: &Path, config: &IndexConfig) -> Self {
        Self::new(
            root.join(&config.catalog.repos),
            root.join(&config.catalog.actions),
        )
    }

    /// Parse and schema-check both documents into a `Catalog`.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        let repos: RepoList = load_document(&self.repos, DocumentKind::Repos)?;
        let actions: ActionsFile = load_document(&self.actions, DocumentKind::Actions)?;
        let catalog = Catalog::from_documents(repos, actions);
        debug!(
            repos = catalog.repos.len(),
            capabilities = catalog.capabilities.len(),
            actions = catalog.actions.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn load_document<T: DeserializeOwned>(path: &Path, kind: DocumentKind) -> Result<T, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&raw).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let schema = DocumentSchema::compile(kind)?;
    let violations = schema.violations(&value);
    if !violations.is_empty() {
        return Err(CatalogError::Schema {
            path: path.to_path_buf(),
            violations,
        });
    }

    serde_json::from_value(value).map_err(|source| CatalogError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
