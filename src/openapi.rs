//! OpenAPI 3.1 synthesis from the action list.
//!
//! Every action with a usable method and path becomes one operation. Schema
//! names referenced by actions are emitted as `$ref`s with placeholder bodies
//! under `components.schemas`; the catalog does not own the schema contents.

use crate::catalog::{Action, Catalog, CatalogIndex, HttpMethod};
use crate::config::OpenApiSection;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

pub const OPENAPI_VERSION: &str = "3.1.0";
const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub paths: BTreeMap<String, PathItem>,
    pub components: Components,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations of one path, keyed by lower-cased method.
pub type PathItem = BTreeMap<String, Operation>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, Response>,
    #[serde(rename = "x-capability")]
    pub capability: String,
    #[serde(rename = "x-repo")]
    pub repo: String,
    #[serde(rename = "x-service", skip_serializing_if = "String::is_empty")]
    pub service: String,
    #[serde(rename = "x-auth", skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RequestBody {
    pub required: bool,
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaType {
    pub schema: SchemaRef,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Components {
    pub schemas: BTreeMap<String, Value>,
}

impl OpenApiDocument {
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths.get(path)?.get(&method.to_ascii_lowercase())
    }
}

impl SchemaRef {
    fn component(name: &str) -> Self {
        Self {
            reference: format!("#/components/schemas/{name}"),
        }
    }
}

fn json_content(name: &str) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(
        JSON_MEDIA_TYPE.to_string(),
        MediaType {
            schema: SchemaRef::component(name),
        },
    )])
}

/// Synthesize with the default document title and version.
pub fn generate_openapi(catalog: &Catalog) -> OpenApiDocument {
    generate_openapi_with(catalog, &OpenApiSection::default())
}

pub fn generate_openapi_with(catalog: &Catalog, info: &OpenApiSection) -> OpenApiDocument {
    let index = CatalogIndex::build(catalog);
    let mut paths: BTreeMap<String, PathItem> = BTreeMap::new();
    let mut schema_names = BTreeSet::new();
    let mut tags: Vec<Tag> = Vec::new();

    for action in &catalog.actions {
        let Some(method) = HttpMethod::parse(&action.http.method) else {
            debug!(action = %action.id, method = %action.http.method, "skipping action without a usable method");
            continue;
        };
        let path = action.http.path.trim();
        if path.is_empty() {
            debug!(action = %action.id, "skipping action without a path");
            continue;
        }

        let capability = index.capability(action.capability_id.as_str());
        let tag_name = action.capability_id.to_string();
        if !tag_name.is_empty() && !tags.iter().any(|tag| tag.name == tag_name) {
            tags.push(Tag {
                name: tag_name,
                description: capability.map(|cap| cap.name.clone()).filter(|n| !n.is_empty()),
            });
        }

        schema_names.extend(action.request_schema.iter().cloned());
        schema_names.extend(action.response_schema.iter().cloned());

        let operation = build_operation(
            action,
            capability.map(|cap| cap.description.as_str()),
            capability.map(|cap| cap.auth.as_str()),
        );
        let previous = paths
            .entry(path.to_string())
            .or_default()
            .insert(method.openapi_key().to_string(), operation);
        if let Some(previous) = previous {
            debug!(
                path,
                method = method.openapi_key(),
                replaced = %previous.operation_id,
                by = %action.id,
                "operation collision, later action wins"
            );
        }
    }

    OpenApiDocument {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: info.title.clone(),
            version: info.version.clone(),
        },
        tags,
        paths,
        components: Components {
            schemas: schema_names
                .into_iter()
                .map(|name| (name, json!({ "type": "object" })))
                .collect(),
        },
    }
}

fn build_operation(
    action: &Action,
    capability_description: Option<&str>,
    capability_auth: Option<&str>,
) -> Operation {
    let description = action
        .description
        .clone()
        .or_else(|| capability_description.map(str::to_string))
        .filter(|text| !text.trim().is_empty());
    let auth = action
        .auth
        .clone()
        .or_else(|| capability_auth.map(str::to_string))
        .filter(|label| !label.trim().is_empty());

    let request_body = action.request_schema.as_deref().map(|name| RequestBody {
        required: true,
        content: json_content(name),
    });
    let ok = Response {
        description: "Successful response".to_string(),
        content: action.response_schema.as_deref().map(json_content),
    };

    Operation {
        operation_id: action.id.to_string(),
        summary: action.title().to_string(),
        description,
        tags: vec![action.capability_id.to_string()],
        request_body,
        responses: BTreeMap::from([("200".to_string(), ok)]),
        capability: action.capability_id.to_string(),
        repo: action.repo.clone(),
        service: action.service.clone(),
        auth,
    }
}
