//! Shared library for the global capability index.
//!
//! The crate loads a declarative catalog of repositories, capabilities and
//! HTTP actions (`repos.yml` + `actions.yml`), answers filtered queries over
//! it, checks cross-references, and derives an OpenAPI document, a service
//! dependency graph and a capability -> serving repos index. `index-cli` and
//! `index-server` are thin adapters over the functions re-exported here.

use std::env;
use std::path::{Path, PathBuf};

pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod graph;
pub mod openapi;
pub mod render;
pub mod schema;
pub mod server;
pub mod validation;

pub use artifacts::{
    WrittenCapabilityIndex, WrittenGraphs, WrittenOpenApi, write_capability_index, write_graphs,
    write_openapi,
};
pub use catalog::{
    Action, ActionId, Capability, CapabilityId, Catalog, CatalogIndex, CatalogSource,
    CatalogStore, RepoId, RepoMeta, Tier,
};
pub use config::{IndexConfig, discover_root};
pub use error::{CatalogError, EntityKind};
pub use filter::{
    ActionFilter, CapabilityFilter, RepoFilter, filter_actions, filter_capabilities, filter_repos,
};
pub use graph::{
    CapabilityIndexMap, EdgeKind, GraphFormat, ServiceGraph, capability_index_to_json,
    generate_capability_index, generate_service_graph, graph_to_dot, graph_to_json,
    graph_to_mermaid,
};
pub use openapi::{OpenApiDocument, generate_openapi, generate_openapi_with};
pub use validation::{
    ActionsValidation, CatalogValidation, RepoValidation, validate_actions, validate_all,
    validate_repos,
};

/// A resolved catalog root and the settings read from it.
#[derive(Clone, Debug)]
pub struct IndexRoot {
    pub root: PathBuf,
    pub config: IndexConfig,
}

impl IndexRoot {
    /// Resolve the root from an explicit hint or the working directory, then
    /// read `index.toml` if present.
    pub fn discover(hint: Option<&Path>) -> Result<Self, CatalogError> {
        let cwd = env::current_dir().map_err(|source| CatalogError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        Self::open(discover_root(hint, &cwd))
    }

    pub fn open(root: PathBuf) -> Result<Self, CatalogError> {
        let config = IndexConfig::load(&root)?;
        Ok(Self { root, config })
    }

    pub fn source(&self) -> CatalogSource {
        CatalogSource::from_config(&self.root, &self.config)
    }

    /// Load the catalog once; any load error is fatal to the caller.
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        self.source().load()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.generate.output_dir)
    }
}
