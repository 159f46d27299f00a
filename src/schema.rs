//! JSON Schema checks for the two catalog documents.
//!
//! The schemas under `schema/` are embedded at build time and describe the
//! documents at the type level only: field types, list shapes, and the
//! top-level keys. Value rules (non-empty ids, stage range, known tiers,
//! references) belong to `validation`, which reports them per entity.

use crate::error::CatalogError;
use jsonschema::JSONSchema;
use serde_json::Value;

const REPOS_SCHEMA: &str = include_str!("../schema/repos.schema.json");
const ACTIONS_SCHEMA: &str = include_str!("../schema/actions.schema.json");

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DocumentKind {
    /// `repos.yml`: `{repos: [...]}`.
    Repos,
    /// `actions.yml`: `{capabilities: [...], actions: [...]}`.
    Actions,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Repos => "repos",
            DocumentKind::Actions => "actions",
        }
    }

    fn schema_source(&self) -> &'static str {
        match self {
            DocumentKind::Repos => REPOS_SCHEMA,
            DocumentKind::Actions => ACTIONS_SCHEMA,
        }
    }
}

/// Compiled validator for one catalog document kind.
pub struct DocumentSchema {
    kind: DocumentKind,
    compiled: JSONSchema,
}

impl DocumentSchema {
    pub fn compile(kind: DocumentKind) -> Result<Self, CatalogError> {
        let raw: Value =
            serde_json::from_str(kind.schema_source()).map_err(|err| CatalogError::SchemaCompile {
                document: kind.label(),
                message: err.to_string(),
            })?;
        let compiled = JSONSchema::compile(&raw).map_err(|err| CatalogError::SchemaCompile {
            document: kind.label(),
            message: err.to_string(),
        })?;
        Ok(Self { kind, compiled })
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Every schema violation in `document`, each prefixed with its instance path.
    pub fn violations(&self, document: &Value) -> Vec<String> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let location = err.instance_path.to_string();
                    if location.is_empty() {
                        format!("(root): {err}")
                    } else {
                        format!("{location}: {err}")
                    }
                })
                .collect(),
        }
    }
}
