//! Indexed view of a loaded catalog.
//!
//! The validator and the graph synthesizer both resolve many references per
//! pass; the index builds the id → entity maps once so each reference is a
//! map lookup rather than a scan of the lists. When ids repeat, the first
//! entry in catalog order wins, matching `Catalog::repo` and friends.

use crate::catalog::model::{Action, Capability, Catalog, RepoMeta};
use std::collections::BTreeMap;

#[derive(Debug)]
/// Borrowed lookup tables over a `Catalog`.
pub struct CatalogIndex<'a> {
    repos_by_id: BTreeMap<&'a str, &'a RepoMeta>,
    repos_by_name: BTreeMap<&'a str, &'a RepoMeta>,
    capabilities: BTreeMap<&'a str, &'a Capability>,
    actions: BTreeMap<&'a str, &'a Action>,
}

impl<'a> CatalogIndex<'a> {
    pub fn build(catalog: &'a Catalog) -> Self {
        let mut repos_by_id = BTreeMap::new();
        let mut repos_by_name = BTreeMap::new();
        for repo in &catalog.repos {
            repos_by_id.entry(repo.id.as_str()).or_insert(repo);
            if !repo.name.is_empty() {
                repos_by_name.entry(repo.name.as_str()).or_insert(repo);
            }
        }

        let mut capabilities = BTreeMap::new();
        for cap in &catalog.capabilities {
            capabilities.entry(cap.id.as_str()).or_insert(cap);
        }

        let mut actions = BTreeMap::new();
        for action in &catalog.actions {
            actions.entry(action.id.as_str()).or_insert(action);
        }

        Self {
            repos_by_id,
            repos_by_name,
            capabilities,
            actions,
        }
    }

    /// Resolve a repository by id, falling back to its name.
    pub fn repo(&self, id_or_name: &str) -> Option<&'a RepoMeta> {
        self.repos_by_id
            .get(id_or_name)
            .or_else(|| self.repos_by_name.get(id_or_name))
            .copied()
    }

    /// Resolve a repository strictly by id (dependency lists cite ids only).
    pub fn repo_by_id(&self, id: &str) -> Option<&'a RepoMeta> {
        self.repos_by_id.get(id).copied()
    }

    pub fn capability(&self, id: &str) -> Option<&'a Capability> {
        self.capabilities.get(id).copied()
    }

    pub fn action(&self, id: &str) -> Option<&'a Action> {
        self.actions.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::identity::{CapabilityId, RepoId};

    #[test]
    fn first_entry_wins_on_duplicate_ids() {
        let catalog = Catalog {
            repos: vec![
                RepoMeta {
                    id: RepoId::from("svc"),
                    name: "first".into(),
                    ..Default::default()
                },
                RepoMeta {
                    id: RepoId::from("svc"),
                    name: "second".into(),
                    ..Default::default()
                },
            ],
            capabilities: vec![Capability {
                id: CapabilityId::from("cap"),
                ..Default::default()
            }],
            actions: Vec::new(),
        };
        let index = CatalogIndex::build(&catalog);
        assert_eq!(index.repo("svc").map(|r| r.name.as_str()), Some("first"));
        assert_eq!(index.repo("second").map(|r| r.name.as_str()), Some("second"));
        assert!(index.repo_by_id("second").is_none());
        assert!(index.capability("cap").is_some());
        assert!(index.action("cap").is_none());
    }
}
