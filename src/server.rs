//! Read-only HTTP surface over a shared `CatalogStore`.
//!
//! Every request takes its own snapshot of the current catalog, so a reload
//! that lands mid-request never changes what that request sees.

use crate::catalog::{Catalog, CatalogStore};
use crate::config::OpenApiSection;
use crate::error::{CatalogError, EntityKind};
use crate::filter::{ActionFilter, CapabilityFilter, RepoFilter, filter_actions, filter_capabilities, filter_repos};
use crate::graph::{GraphFormat, generate_capability_index, generate_service_graph};
use crate::openapi::generate_openapi_with;
use crate::validation::validate_all;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Clone, Debug)]
pub struct AppState {
    store: Arc<CatalogStore>,
    openapi: OpenApiSection,
}

impl AppState {
    pub fn new(store: Arc<CatalogStore>, openapi: OpenApiSection) -> Self {
        Self { store, openapi }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    fn catalog(&self) -> Result<Arc<Catalog>, ApiError> {
        self.store.snapshot().ok_or(ApiError::NotLoaded)
    }
}

#[derive(Debug)]
pub enum ApiError {
    NotLoaded,
    NotFound { kind: EntityKind, id: String },
    Internal(String),
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { kind, id } => ApiError::NotFound { kind, id },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Internal(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "catalog not loaded" })),
            )
                .into_response(),
            ApiError::NotFound { kind, id } => {
                let message = CatalogError::not_found(kind, id.clone()).to_string();
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": message, "id": id })),
                )
                    .into_response()
            }
            ApiError::Internal(message) => {
                debug!("request failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }
        }
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/repos", get(list_repos))
        .route("/repos/{id}", get(show_repo))
        .route("/capabilities", get(list_capabilities))
        .route("/capabilities/{id}", get(show_capability))
        .route("/actions", get(list_actions))
        .route("/actions/{id}", get(show_action))
        .route("/openapi.json", get(openapi))
        .route("/graph", get(graph))
        .route("/capability-index", get(capability_index))
        .route("/validate", get(validate))
        .with_state(state)
}

/// Re-read the store's source every `interval`; failures keep the previous
/// catalog.
///
/// Reloading reads files and compiles schemas, so it runs on the blocking
/// pool rather than on a runtime worker.
pub fn spawn_reload_loop(store: Arc<CatalogStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("starting catalog reload loop every {interval:?}");
        loop {
            tokio::time::sleep(interval).await;
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.reload()).await {
                Ok(Ok(_)) => {}
                // The store has already logged the load error.
                Ok(Err(_)) => {}
                Err(err) => warn!("catalog reload task failed: {err}"),
            }
        }
    })
}

async fn healthz(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.catalog()?;
    Ok(Json(json!({ "status": "ok" })))
}

async fn readyz(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let catalog = state.catalog()?;
    Ok(Json(json!({
        "status": "ready",
        "repos": catalog.repos.len(),
        "capabilities": catalog.capabilities.len(),
        "actions": catalog.actions.len(),
    })))
}

async fn list_repos(
    State(state): State<AppState>,
    filter: Result<Query<RepoFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(filter) = filter?;
    let catalog = state.catalog()?;
    Ok(Json(filter_repos(&catalog, &filter)).into_response())
}

async fn show_repo(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    let repo = catalog
        .repo(&id)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Repository, id.as_str()))?;
    Ok(Json(repo).into_response())
}

async fn list_capabilities(
    State(state): State<AppState>,
    filter: Result<Query<CapabilityFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(filter) = filter?;
    let catalog = state.catalog()?;
    Ok(Json(filter_capabilities(&catalog, &filter)).into_response())
}

async fn show_capability(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    let capability = catalog
        .capability(&id)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Capability, id.as_str()))?;
    Ok(Json(capability).into_response())
}

async fn list_actions(
    State(state): State<AppState>,
    filter: Result<Query<ActionFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(filter) = filter?;
    let catalog = state.catalog()?;
    Ok(Json(filter_actions(&catalog, &filter)).into_response())
}

async fn show_action(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    let action = catalog
        .action(&id)
        .ok_or_else(|| CatalogError::not_found(EntityKind::Action, id.as_str()))?;
    Ok(Json(action).into_response())
}

async fn openapi(State(state): State<AppState>) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    Ok(Json(generate_openapi_with(&catalog, &state.openapi)).into_response())
}

#[derive(Debug, Default, Deserialize)]
struct GraphQuery {
    #[serde(default)]
    format: GraphFormat,
}

// Format and repo filters are read as two separate queries over the same
// string; unknown keys are ignored by both.
async fn graph(
    State(state): State<AppState>,
    format: Result<Query<GraphQuery>, QueryRejection>,
    filter: Result<Query<RepoFilter>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(GraphQuery { format }) = format?;
    let Query(filter) = filter?;
    let catalog = state.catalog()?;
    let graph = generate_service_graph(&catalog, &filter);
    let body = format.render(&graph)?;
    let content_type = match format {
        GraphFormat::Json => "application/json",
        GraphFormat::Mermaid | GraphFormat::Dot => "text/plain; charset=utf-8",
    };
    Ok(([(header::CONTENT_TYPE, content_type)], body).into_response())
}

async fn capability_index(State(state): State<AppState>) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    Ok(Json(generate_capability_index(&catalog)).into_response())
}

async fn validate(State(state): State<AppState>) -> ApiResult<Response> {
    let catalog = state.catalog()?;
    let report = validate_all(&catalog);
    let status = if report.valid {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok((status, Json(report)).into_response())
}
