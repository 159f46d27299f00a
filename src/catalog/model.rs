//! Deserializable representation of `repos.yml` and `actions.yml`.
//!
//! The types mirror the two catalog documents so adapters and tests can work
//! with typed entries instead of ad-hoc YAML maps. Fields the validator checks
//! (ids, names, stage, tier, status, http method/path) are parsed leniently and
//! default to empty so a missing value surfaces as a diagnostic rather than a
//! parse failure.

use crate::catalog::identity::{ActionId, CapabilityId, RepoId, Tier};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Contents of `repos.yml`.
pub struct RepoList {
    #[serde(default)]
    pub repos: Vec<RepoMeta>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// A deployable service or codebase and its classification metadata.
pub struct RepoMeta {
    #[serde(default)]
    pub id: RepoId,
    #[serde(default)]
    pub name: String,
    /// Location of the source repository (URL or `org/name`).
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub stage: Option<i64>,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub tier: Option<Tier>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entrypoints: Vec<Entrypoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datastores: Vec<Datastore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Dependencies>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Way into a repository's running service (HTTP API, queue consumer, ...).
pub struct Entrypoint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Datastore {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Declared dependencies: `internal` names other repo ids, `external` is free-form.
pub struct Dependencies {
    #[serde(default)]
    pub internal: Vec<RepoId>,
    #[serde(default)]
    pub external: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// Contents of `actions.yml`.
pub struct ActionsFile {
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// A named unit of functionality implemented by one or more actions.
pub struct Capability {
    #[serde(default)]
    pub id: CapabilityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Auth requirement label (`none`, `api_key`, `oauth2`, ...).
    #[serde(default)]
    pub auth: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
/// An HTTP-reachable operation tied to one capability and one repository.
pub struct Action {
    #[serde(default)]
    pub id: ActionId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub capability_id: CapabilityId,
    /// Owning repository, by id or by name.
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub http: ActionHttp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionHttp {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
}

impl Action {
    /// Display title: the name, or the id when no name was declared.
    pub fn title(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }
}

impl RepoMeta {
    /// Label used in reports and graphs: the name, falling back to the id.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    pub fn internal_dependencies(&self) -> &[RepoId] {
        self.dependencies
            .as_ref()
            .map(|deps| deps.internal.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
/// The whole in-memory catalog.
///
/// Built once by the loader and never mutated afterwards; a reload produces a
/// new value that replaces this one wholesale.
pub struct Catalog {
    pub repos: Vec<RepoMeta>,
    pub capabilities: Vec<Capability>,
    pub actions: Vec<Action>,
}

impl Catalog {
    pub fn from_documents(repos: RepoList, actions: ActionsFile) -> Self {
        Self {
            repos: repos.repos,
            capabilities: actions.capabilities,
            actions: actions.actions,
        }
    }

    /// Resolve a repository by id first, then by name.
    pub fn repo(&self, id_or_name: &str) -> Option<&RepoMeta> {
        self.repos
            .iter()
            .find(|repo| repo.id.as_str() == id_or_name)
            .or_else(|| self.repos.iter().find(|repo| repo.name == id_or_name))
    }

    pub fn capability(&self, id: &str) -> Option<&Capability> {
        self.capabilities.iter().find(|cap| cap.id.as_str() == id)
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.id.as_str() == id)
    }
}
