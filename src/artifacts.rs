//! Writes generated artifacts under the configured output directory.

use crate::catalog::Catalog;
use crate::config::IndexConfig;
use crate::error::CatalogError;
use crate::filter::RepoFilter;
use crate::graph::{
    CapabilityIndexMap, GraphFormat, ServiceGraph, capability_index_to_json,
    generate_capability_index, generate_service_graph,
};
use crate::openapi::{OpenApiDocument, generate_openapi_with};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const GRAPH_FILE_STEM: &str = "service-graph";
pub const CAPABILITY_INDEX_FILE: &str = "capability-index.json";

#[derive(Debug)]
pub struct WrittenOpenApi {
    pub path: PathBuf,
    pub document: OpenApiDocument,
}

#[derive(Debug)]
pub struct WrittenCapabilityIndex {
    pub path: PathBuf,
    pub index: CapabilityIndexMap,
}

#[derive(Debug)]
pub struct WrittenGraphs {
    pub graph: ServiceGraph,
    pub json: PathBuf,
    pub mermaid: PathBuf,
    pub dot: PathBuf,
}

/// Synthesize the OpenAPI document and write it as pretty JSON.
///
/// `file_name` overrides the configured file name; it is resolved inside the
/// output directory.
pub fn write_openapi(
    catalog: &Catalog,
    config: &IndexConfig,
    output_dir: &Path,
    file_name: Option<&str>,
) -> Result<WrittenOpenApi, CatalogError> {
    let document = generate_openapi_with(catalog, &config.openapi);
    let rendered =
        serde_json::to_string_pretty(&document).map_err(|err| CatalogError::Serialize {
            what: "OpenAPI document",
            message: err.to_string(),
        })?;
    let path = output_dir.join(file_name.unwrap_or(config.generate.openapi_file.as_str()));
    write_file(&path, &rendered)?;
    Ok(WrittenOpenApi { path, document })
}

/// Synthesize the service graph and write all three encodings.
pub fn write_graphs(
    catalog: &Catalog,
    filter: &RepoFilter,
    output_dir: &Path,
) -> Result<WrittenGraphs, CatalogError> {
    let graph = generate_service_graph(catalog, filter);
    let write = |format: GraphFormat| -> Result<PathBuf, CatalogError> {
        let path = output_dir.join(format!("{GRAPH_FILE_STEM}.{}", format.file_extension()));
        write_file(&path, &format.render(&graph)?)?;
        Ok(path)
    };
    let json = write(GraphFormat::Json)?;
    let mermaid = write(GraphFormat::Mermaid)?;
    let dot = write(GraphFormat::Dot)?;
    Ok(WrittenGraphs {
        graph,
        json,
        mermaid,
        dot,
    })
}

pub fn write_capability_index(
    catalog: &Catalog,
    output_dir: &Path,
) -> Result<WrittenCapabilityIndex, CatalogError> {
    let index = generate_capability_index(catalog);
    let path = output_dir.join(CAPABILITY_INDEX_FILE);
    write_file(&path, &capability_index_to_json(&index)?)?;
    Ok(WrittenCapabilityIndex { path, index })
}

fn write_file(path: &Path, contents: &str) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CatalogError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        Action, ActionId, Capability, CapabilityId, Dependencies, RepoId, RepoMeta,
    };
    use tempfile::TempDir;

    #[test]
    fn graphs_land_next_to_each_other() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("generated");
        let catalog = Catalog {
            repos: vec![
                RepoMeta {
                    id: RepoId::from("a"),
                    dependencies: Some(Dependencies {
                        internal: vec![RepoId::from("b")],
                        external: Vec::new(),
                    }),
                    ..Default::default()
                },
                RepoMeta {
                    id: RepoId::from("b"),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let written = write_graphs(&catalog, &RepoFilter::default(), &out).unwrap();
        assert_eq!(written.json, out.join("service-graph.json"));
        assert!(fs::read_to_string(&written.mermaid).unwrap().contains("n0 --> n1"));
        assert!(fs::read_to_string(&written.dot).unwrap().contains("\"a\" -> \"b\""));
        assert_eq!(written.graph.edges.len(), 1);
    }

    #[test]
    fn capability_index_is_written_as_json() {
        let temp = TempDir::new().unwrap();
        let catalog = Catalog {
            repos: vec![RepoMeta {
                id: RepoId::from("svc1"),
                ..Default::default()
            }],
            capabilities: vec![Capability {
                id: CapabilityId::from("cap1"),
                ..Default::default()
            }],
            actions: vec![Action {
                id: ActionId::from("act1"),
                capability_id: CapabilityId::from("cap1"),
                repo: "svc1".into(),
                ..Default::default()
            }],
        };
        let written = write_capability_index(&catalog, temp.path()).unwrap();
        assert_eq!(written.path, temp.path().join("capability-index.json"));
        let body: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&written.path).unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "cap1": ["svc1"] }));
    }

    #[test]
    fn openapi_file_name_can_be_overridden() {
        let temp = TempDir::new().unwrap();
        let config = IndexConfig::default();
        let default = write_openapi(&Catalog::default(), &config, temp.path(), None).unwrap();
        assert_eq!(default.path, temp.path().join("openapi-actions.json"));

        let custom =
            write_openapi(&Catalog::default(), &config, temp.path(), Some("api.json")).unwrap();
        let body: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&custom.path).unwrap()).unwrap();
        assert_eq!(body["openapi"], "3.1.0");
        assert_eq!(body["info"]["title"], "Global Index Actions");
    }
}
