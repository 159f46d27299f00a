//! Service dependency graph synthesis and its text encodings.
//!
//! Nodes are the repos selected by a `RepoFilter`. Edges come from declared
//! internal dependencies and from capabilities served by more than one repo.
//! Edges whose endpoints fall outside the node set are dropped without
//! comment, so a filtered graph never points at nodes it does not show.
//!
//! The capability index lives here too: it is the same action -> repo
//! resolution, flattened to capability id -> serving repos.

use crate::catalog::{CapabilityId, Catalog, CatalogIndex, RepoId};
use crate::error::CatalogError;
use crate::filter::{RepoFilter, filter_repos};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ServiceGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub stage: Option<i64>,
    pub domain: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    DependsOn,
    ExposesAction,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::DependsOn => "depends_on",
            EdgeKind::ExposesAction => "exposes_action",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text encodings a graph can be rendered to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Json,
    Mermaid,
    Dot,
}

impl GraphFormat {
    pub fn render(&self, graph: &ServiceGraph) -> Result<String, CatalogError> {
        match self {
            GraphFormat::Json => graph_to_json(graph),
            GraphFormat::Mermaid => Ok(graph_to_mermaid(graph)),
            GraphFormat::Dot => Ok(graph_to_dot(graph)),
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            GraphFormat::Json => "json",
            GraphFormat::Mermaid => "mmd",
            GraphFormat::Dot => "dot",
        }
    }
}

pub fn generate_service_graph(catalog: &Catalog, filter: &RepoFilter) -> ServiceGraph {
    let index = CatalogIndex::build(catalog);
    let repos = filter_repos(catalog, filter);

    // Repeated ids keep their first entry, as lookups do.
    let mut node_ids: BTreeSet<&str> = BTreeSet::new();
    let mut kept = Vec::new();
    let mut nodes = Vec::new();
    for repo in repos {
        if !node_ids.insert(repo.id.as_str()) {
            debug!(id = %repo.id, "skipped duplicate graph node");
            continue;
        }
        kept.push(repo);
        nodes.push(GraphNode {
            id: repo.id.to_string(),
            label: repo.label().to_string(),
            stage: repo.stage,
            domain: repo.domain.clone(),
        });
    }

    let mut candidates = Vec::new();
    for repo in &kept {
        for target in repo.internal_dependencies() {
            candidates.push(GraphEdge {
                from: repo.id.to_string(),
                to: target.to_string(),
                kind: EdgeKind::DependsOn,
            });
        }
    }

    // The first action of a capability names its owning repo; later actions
    // served elsewhere are drawn as owner -> serving repo.
    let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
    for action in &catalog.actions {
        let Some(serving) = index.repo(&action.repo) else {
            continue;
        };
        let serving = serving.id.as_str();
        let owner = *owners
            .entry(action.capability_id.as_str())
            .or_insert(serving);
        if owner != serving {
            candidates.push(GraphEdge {
                from: owner.to_string(),
                to: serving.to_string(),
                kind: EdgeKind::ExposesAction,
            });
        }
    }

    let mut seen = BTreeSet::new();
    let mut edges = Vec::new();
    for edge in candidates {
        if !node_ids.contains(edge.from.as_str()) || !node_ids.contains(edge.to.as_str()) {
            debug!(from = %edge.from, to = %edge.to, kind = %edge.kind, "pruned edge");
            continue;
        }
        if seen.insert((edge.from.clone(), edge.to.clone(), edge.kind)) {
            edges.push(edge);
        }
    }

    ServiceGraph { nodes, edges }
}

pub fn graph_to_json(graph: &ServiceGraph) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(graph).map_err(|err| CatalogError::Serialize {
        what: "service graph",
        message: err.to_string(),
    })
}

/// Mermaid node ids are synthetic (`n0`, `n1`, ... in node order) so that
/// repo ids with punctuation or reserved words like `end` never collide or
/// break the flowchart. The repo id is shown in the node text.
pub fn graph_to_mermaid(graph: &ServiceGraph) -> String {
    let mut out = String::from("flowchart LR\n");
    let mut ids: BTreeMap<&str, String> = BTreeMap::new();
    for node in &graph.nodes {
        let key = format!("n{}", ids.len());
        let text = if node.label == node.id {
            node.id.clone()
        } else {
            format!("{} ({})", node.label, node.id)
        };
        let _ = writeln!(out, "    {key}[\"{}\"]", text.replace('"', "#quot;"));
        ids.insert(node.id.as_str(), key);
    }
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (ids.get(edge.from.as_str()), ids.get(edge.to.as_str()))
        else {
            continue;
        };
        let arrow = match edge.kind {
            EdgeKind::DependsOn => "-->",
            EdgeKind::ExposesAction => "-->|exposes_action|",
        };
        let _ = writeln!(out, "    {from} {arrow} {to}");
    }
    out
}

pub fn graph_to_dot(graph: &ServiceGraph) -> String {
    let mut out = String::from("digraph services {\n    rankdir=LR;\n");
    for node in &graph.nodes {
        let _ = writeln!(
            out,
            "    \"{}\" [label=\"{}\"];",
            dot_escape(&node.id),
            dot_escape(&node.label)
        );
    }
    for edge in &graph.edges {
        let style = match edge.kind {
            EdgeKind::DependsOn => "",
            EdgeKind::ExposesAction => " [style=dashed]",
        };
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\"{style};",
            dot_escape(&edge.from),
            dot_escape(&edge.to)
        );
    }
    out.push_str("}\n");
    out
}

/// Capability id -> ids of the repos serving it through at least one action.
pub type CapabilityIndexMap = BTreeMap<CapabilityId, Vec<RepoId>>;

/// Map every declared capability to the repos that serve it.
///
/// Serving repos are listed once each, in the order their first action
/// appears. Action repos resolve by id, then by name. Actions naming an
/// unknown capability or repo are left out; a declared capability with no
/// resolvable action maps to an empty list.
pub fn generate_capability_index(catalog: &Catalog) -> CapabilityIndexMap {
    let index = CatalogIndex::build(catalog);
    let mut map: CapabilityIndexMap = catalog
        .capabilities
        .iter()
        .map(|cap| (cap.id.clone(), Vec::new()))
        .collect();

    for action in &catalog.actions {
        let Some(serving) = map.get_mut(&action.capability_id) else {
            debug!(action = %action.id, capability = %action.capability_id, "capability not declared");
            continue;
        };
        let Some(repo) = index.repo(&action.repo) else {
            debug!(action = %action.id, repo = %action.repo, "repo not found");
            continue;
        };
        if !serving.contains(&repo.id) {
            serving.push(repo.id.clone());
        }
    }
    map
}

pub fn capability_index_to_json(map: &CapabilityIndexMap) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(map).map_err(|err| CatalogError::Serialize {
        what: "capability index",
        message: err.to_string(),
    })
}

fn dot_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
