//! Catalog root discovery and the optional `index.toml` settings file.
//!
//! Every key has a default, so a root containing just `repos.yml` and
//! `actions.yml` needs no configuration at all. Command-line flags and
//! environment variables are layered on top by the binaries.

use crate::error::CatalogError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "index.toml";
pub const DEFAULT_REPOS_FILE: &str = "repos.yml";
pub const DEFAULT_ACTIONS_FILE: &str = "actions.yml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    pub catalog: CatalogSection,
    pub generate: GenerateSection,
    pub openapi: OpenApiSection,
    pub server: ServerSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Catalog document locations, relative to the root unless absolute.
pub struct CatalogSection {
    pub repos: PathBuf,
    pub actions: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            repos: PathBuf::from(DEFAULT_REPOS_FILE),
            actions: PathBuf::from(DEFAULT_ACTIONS_FILE),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateSection {
    pub output_dir: PathBuf,
    pub openapi_file: String,
}

impl Default for GenerateSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            openapi_file: "openapi-actions.json".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenApiSection {
    pub title: String,
    pub version: String,
}

impl Default for OpenApiSection {
    fn default() -> Self {
        Self {
            title: "Global Index Actions".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: u16,
    /// Seconds between catalog reloads; absent disables reloading.
    pub reload_interval_secs: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: 3001,
            reload_interval_secs: None,
        }
    }
}

impl IndexConfig {
    /// Read `<root>/index.toml`, returning defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self, CatalogError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| CatalogError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|err| CatalogError::Config {
            path,
            message: err.to_string(),
        })
    }
}

/// Returns true when `candidate` looks like a catalog root.
fn is_catalog_root(candidate: &Path) -> bool {
    candidate.join(DEFAULT_REPOS_FILE).is_file() || candidate.join(CONFIG_FILE).is_file()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_catalog_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the catalog root.
///
/// An explicit hint (`--root` or `INDEX_ROOT`) always wins, even when it does
/// not look like a root yet, so the loader can report exactly which file is
/// missing. Otherwise the nearest ancestor of `start` holding `repos.yml` or
/// `index.toml` is used, and `start` itself as the last resort.
pub fn discover_root(hint: Option<&Path>, start: &Path) -> PathBuf {
    if let Some(hint) = hint {
        return hint.to_path_buf();
    }
    search_upwards(start).unwrap_or_else(|| start.to_path_buf())
}
