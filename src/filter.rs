//! Declarative filters over catalog entries.
//!
//! Each entity kind has a fixed criteria struct; every field is optional and
//! present fields combine with AND. Results keep catalog order. The structs
//! deserialize from query strings, where unrecognized keys are ignored.

use crate::catalog::{Action, Capability, Catalog, RepoMeta, Tier};
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RepoFilter {
    /// Exact stage match.
    pub stage: Option<i64>,
    /// Exact domain match.
    pub domain: Option<String>,
    /// Exact tier match; `1`, `tier1` and `tier_1` name the same tier.
    pub tier: Option<Tier>,
    /// Exact status match.
    pub status: Option<String>,
    /// Membership in the repo's tag set.
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CapabilityFilter {
    /// Exact domain match; capabilities without a domain never match.
    pub domain: Option<String>,
    /// Membership in the capability's tag set.
    pub tag: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ActionFilter {
    /// Exact match against the action's `repo` field.
    pub repo: Option<String>,
    /// Exact match against `capability_id`.
    pub capability: Option<String>,
    /// Domain of the action's owning repo (resolved by id or name).
    pub domain: Option<String>,
}

impl RepoFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, repo: &RepoMeta) -> bool {
        self.stage.is_none_or(|stage| repo.stage == Some(stage))
            && self.domain.as_ref().is_none_or(|domain| &repo.domain == domain)
            && self.tier.as_ref().is_none_or(|tier| repo.tier.as_ref() == Some(tier))
            && self.status.as_ref().is_none_or(|status| &repo.status == status)
            && self.tag.as_ref().is_none_or(|tag| repo.tags.contains(tag))
    }
}

impl CapabilityFilter {
    pub fn matches(&self, capability: &Capability) -> bool {
        self.domain
            .as_ref()
            .is_none_or(|domain| capability.domain.as_ref() == Some(domain))
            && self.tag.as_ref().is_none_or(|tag| capability.tags.contains(tag))
    }
}

impl ActionFilter {
    pub fn matches(&self, action: &Action, catalog: &Catalog) -> bool {
        self.repo.as_ref().is_none_or(|repo| &action.repo == repo)
            && self
                .capability
                .as_ref()
                .is_none_or(|cap| action.capability_id.as_str() == cap)
            && self.domain.as_ref().is_none_or(|domain| {
                catalog
                    .repo(&action.repo)
                    .is_some_and(|owner| &owner.domain == domain)
            })
    }
}

pub fn filter_repos<'a>(catalog: &'a Catalog, filter: &RepoFilter) -> Vec<&'a RepoMeta> {
    catalog
        .repos
        .iter()
        .filter(|repo| filter.matches(repo))
        .collect()
}

pub fn filter_capabilities<'a>(
    catalog: &'a Catalog,
    filter: &CapabilityFilter,
) -> Vec<&'a Capability> {
    catalog
        .capabilities
        .iter()
        .filter(|cap| filter.matches(cap))
        .collect()
}

pub fn filter_actions<'a>(catalog: &'a Catalog, filter: &ActionFilter) -> Vec<&'a Action> {
    catalog
        .actions
        .iter()
        .filter(|action| filter.matches(action, catalog))
        .collect()
}
