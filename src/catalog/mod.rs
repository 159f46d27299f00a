//! Catalog wiring.
//!
//! This module wraps `repos.yml` and `actions.yml`: typed entries in `model`,
//! identifiers and label enums in `identity`, disk loading in `source`, the
//! shared snapshot in `store`, and `CatalogIndex` for reference resolution.

pub mod identity;
pub mod index;
pub mod model;
pub mod source;
pub mod store;

pub use identity::{ActionId, CapabilityId, HttpMethod, RepoId, Tier};
pub use index::CatalogIndex;
pub use model::{
    Action, ActionHttp, ActionsFile, Capability, Catalog, Datastore, Dependencies, Entrypoint,
    RepoList, RepoMeta,
};
pub use source::CatalogSource;
pub use store::CatalogStore;
