//! Cross-referential validation of a loaded catalog.
//!
//! Type-level problems are caught by the schema check at load time. The rules
//! here look at values and references, and they never stop at the first
//! problem: each entity collects every rule it breaks so a single report shows
//! the whole picture.

use crate::catalog::identity::{RECOGNIZED_METHODS, RECOGNIZED_TIERS};
use crate::catalog::{Action, Capability, Catalog, CatalogIndex, HttpMethod, RepoMeta};
use serde::Serialize;
use std::collections::BTreeSet;

pub const MIN_STAGE: i64 = 0;
pub const MAX_STAGE: i64 = 10;

pub const RECOGNIZED_STATUSES: &[&str] = &[
    "active",
    "experimental",
    "beta",
    "stable",
    "maintenance",
    "deprecated",
    "archived",
    "planned",
];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoValidation {
    pub total_repos: usize,
    pub valid_repos: usize,
    pub invalid_repos: Vec<InvalidRepo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvalidRepo {
    pub name: String,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// Tally for one entity kind (capabilities or actions).
pub struct EntityValidation {
    pub total: usize,
    pub valid: usize,
    pub invalid: Vec<InvalidEntity>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvalidEntity {
    pub id: String,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionsValidation {
    pub capabilities: EntityValidation,
    pub actions: EntityValidation,
    pub valid: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogValidation {
    pub repos: RepoValidation,
    pub actions: ActionsValidation,
    pub valid: bool,
}

impl RepoValidation {
    pub fn is_valid(&self) -> bool {
        self.invalid_repos.is_empty()
    }
}

impl EntityValidation {
    fn from_results(results: Vec<(String, Vec<String>)>) -> Self {
        let total = results.len();
        let invalid: Vec<InvalidEntity> = results
            .into_iter()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(id, errors)| InvalidEntity { id, errors })
            .collect();
        Self {
            total,
            valid: total - invalid.len(),
            invalid,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }
}

pub fn validate_repos(catalog: &Catalog) -> RepoValidation {
    let index = CatalogIndex::build(catalog);
    let mut seen = BTreeSet::new();
    let mut invalid_repos = Vec::new();

    for (position, repo) in catalog.repos.iter().enumerate() {
        let mut errors = repo_errors(repo, &index);
        if !repo.id.is_blank() && !seen.insert(repo.id.as_str()) {
            errors.push(format!("duplicate repo id '{}'", repo.id));
        }
        if !errors.is_empty() {
            invalid_repos.push(InvalidRepo {
                name: display_key(repo.label(), "repos", position),
                errors,
            });
        }
    }

    RepoValidation {
        total_repos: catalog.repos.len(),
        valid_repos: catalog.repos.len() - invalid_repos.len(),
        invalid_repos,
    }
}

pub fn validate_actions(catalog: &Catalog) -> ActionsValidation {
    let index = CatalogIndex::build(catalog);

    let mut seen = BTreeSet::new();
    let capability_results = catalog
        .capabilities
        .iter()
        .enumerate()
        .map(|(position, cap)| {
            let mut errors = capability_errors(cap);
            if !cap.id.is_blank() && !seen.insert(cap.id.as_str()) {
                errors.push(format!("duplicate capability id '{}'", cap.id));
            }
            (display_key(cap.id.as_str(), "capabilities", position), errors)
        })
        .collect();

    let mut seen = BTreeSet::new();
    let action_results = catalog
        .actions
        .iter()
        .enumerate()
        .map(|(position, action)| {
            let mut errors = action_errors(action, &index);
            if !action.id.is_blank() && !seen.insert(action.id.as_str()) {
                errors.push(format!("duplicate action id '{}'", action.id));
            }
            (display_key(action.id.as_str(), "actions", position), errors)
        })
        .collect();

    let capabilities = EntityValidation::from_results(capability_results);
    let actions = EntityValidation::from_results(action_results);
    let valid = capabilities.is_valid() && actions.is_valid();
    ActionsValidation {
        capabilities,
        actions,
        valid,
    }
}

pub fn validate_all(catalog: &Catalog) -> CatalogValidation {
    let repos = validate_repos(catalog);
    let actions = validate_actions(catalog);
    let valid = repos.is_valid() && actions.valid;
    CatalogValidation {
        repos,
        actions,
        valid,
    }
}

fn display_key(preferred: &str, list: &str, position: usize) -> String {
    if preferred.trim().is_empty() {
        format!("{list}[{position}]")
    } else {
        preferred.to_string()
    }
}

fn repo_errors(repo: &RepoMeta, index: &CatalogIndex<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if repo.id.is_blank() {
        errors.push("id is required".to_string());
    }

    match repo.stage {
        None => errors.push("stage is required".to_string()),
        Some(stage) if !(MIN_STAGE..=MAX_STAGE).contains(&stage) => errors.push(format!(
            "stage {stage} is outside the range {MIN_STAGE}-{MAX_STAGE}"
        )),
        Some(_) => {}
    }

    // Tier is optional; a declared tier must be one we know.
    if let Some(tier) = &repo.tier {
        if !tier.is_recognized() {
            errors.push(format!(
                "tier '{tier}' is not one of {}",
                RECOGNIZED_TIERS.join(", ")
            ));
        }
    }

    if repo.status.trim().is_empty() {
        errors.push("status is required".to_string());
    } else if !RECOGNIZED_STATUSES.contains(&repo.status.as_str()) {
        errors.push(format!(
            "status '{}' is not one of {}",
            repo.status,
            RECOGNIZED_STATUSES.join(", ")
        ));
    }

    for dependency in repo.internal_dependencies() {
        if index.repo_by_id(dependency.as_str()).is_none() {
            errors.push(format!(
                "dependencies.internal references unknown repo '{dependency}'"
            ));
        }
    }

    errors
}

fn capability_errors(cap: &Capability) -> Vec<String> {
    let mut errors = Vec::new();
    for (field, value) in [
        ("id", cap.id.as_str()),
        ("name", cap.name.as_str()),
        ("description", cap.description.as_str()),
        ("auth", cap.auth.as_str()),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("{field} is required"));
        }
    }
    errors
}

fn action_errors(action: &Action, index: &CatalogIndex<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if action.id.is_blank() {
        errors.push("id is required".to_string());
    }

    let method = action.http.method.trim();
    if method.is_empty() {
        errors.push("http.method is required".to_string());
    } else if HttpMethod::parse(method).is_none() {
        errors.push(format!(
            "http.method '{method}' is not one of {}",
            RECOGNIZED_METHODS.join(", ")
        ));
    }

    let path = action.http.path.trim();
    if path.is_empty() {
        errors.push("http.path is required".to_string());
    } else if !path.starts_with('/') {
        errors.push(format!("http.path '{path}' must start with '/'"));
    }

    if action.capability_id.is_blank() {
        errors.push("capability_id is required".to_string());
    } else if index.capability(action.capability_id.as_str()).is_none() {
        errors.push(format!(
            "capability_id '{}' does not exist",
            action.capability_id
        ));
    }

    if action.repo.trim().is_empty() {
        errors.push("repo is required".to_string());
    } else if index.repo(&action.repo).is_none() {
        errors.push(format!("repo '{}' does not exist", action.repo));
    }

    errors
}
