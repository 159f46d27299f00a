//! Error taxonomy for catalog loading, lookup and artifact output.
//!
//! Validation diagnostics are not errors: they are collected into reports by
//! `validation`. Everything here stops the operation that raised it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{} failed schema validation:\n{}", path.display(), violations.join("\n"))]
    Schema {
        path: PathBuf,
        violations: Vec<String>,
    },

    #[error("failed to compile {document} schema: {message}")]
    SchemaCompile {
        document: &'static str,
        message: String,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {message}")]
    Serialize { what: &'static str, message: String },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntityKind {
    Repository,
    Capability,
    Action,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Repository => "Repository",
            EntityKind::Capability => "Capability",
            EntityKind::Action => "Action",
        })
    }
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for the load-time failures that make the catalog unusable.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            CatalogError::Read { .. }
                | CatalogError::Parse { .. }
                | CatalogError::Schema { .. }
                | CatalogError::SchemaCompile { .. }
                | CatalogError::Decode { .. }
                | CatalogError::Config { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_id() {
        let err = CatalogError::not_found(EntityKind::Capability, "cap-x");
        assert_eq!(err.to_string(), "Capability 'cap-x' not found");
        assert!(!err.is_load_error());
    }

    #[test]
    fn schema_error_lists_every_violation() {
        let err = CatalogError::Schema {
            path: PathBuf::from("repos.yml"),
            violations: vec!["/repos/0/stage: bad".into(), "/repos/1/id: bad".into()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/repos/0/stage"));
        assert!(rendered.contains("/repos/1/id"));
        assert!(err.is_load_error());
    }
}
