// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! REST surface of the explore gateway.
//!
//! The authenticated user travels in the `userId` header, set by the
//! upstream gateway. Element ids in query strings are comma-separated.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::authorization::DirectoryAuthorizationGate;
use crate::application::element_saga::{BulkDeletionReport, ElementService, StandardElementService};
use crate::application::metadata_aggregator::{MetadataAggregator, MetadataQuery};
use crate::domain::element::{Element, ElementCreation, ElementId, ElementPatch, ElementType};
use crate::domain::error::ExploreError;
use crate::infrastructure::backends::Backends;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::http::USER_ID_HEADER;

#[derive(Clone)]
pub struct AppState {
    pub elements: Arc<dyn ElementService>,
    pub aggregator: Arc<MetadataAggregator>,
}

impl AppState {
    /// Wire the application services on top of the configured backends
    pub fn from_backends(backends: &Backends, event_bus: Arc<EventBus>) -> Self {
        let gate = Arc::new(DirectoryAuthorizationGate::new(backends.directory.clone()));
        let elements = StandardElementService::new(
            backends.directory.clone(),
            backends.registry.clone(),
            gate,
            backends.user_admin.clone(),
            event_bus,
        );
        Self {
            elements: Arc::new(elements),
            aggregator: Arc::new(MetadataAggregator::new(
                backends.directory.clone(),
                backends.registry.clone(),
            )),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/v1/explore/elements",
            post(create_element_handler).delete(delete_elements_handler),
        )
        .route("/v1/explore/elements/metadata", get(list_metadata_handler))
        .route(
            "/v1/explore/elements/{id}",
            put(update_element_handler).delete(delete_element_handler),
        )
        .route("/v1/explore/elements/{id}/duplicate", post(duplicate_element_handler))
        .route("/v1/explore/elements/{id}/new-script", post(create_script_handler))
        .route("/v1/explore/elements/{id}/content", put(update_content_handler))
        .route(
            "/v1/explore/elements/{id}/replace-with-script",
            put(replace_with_script_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Explore(ExploreError),
    BadRequest(String),
}

impl From<ExploreError> for ApiError {
    fn from(err: ExploreError) -> Self {
        ApiError::Explore(err)
    }
}

pub fn status_for(err: &ExploreError) -> StatusCode {
    match err {
        ExploreError::PermissionDenied { .. } | ExploreError::MaxElementsExceeded { .. } => {
            StatusCode::FORBIDDEN
        }
        ExploreError::NotFound(_) => StatusCode::NOT_FOUND,
        ExploreError::UnknownElementType(_)
        | ExploreError::IncorrectPayload(_)
        | ExploreError::UnsupportedOperation(_) => StatusCode::BAD_REQUEST,
        ExploreError::ImportFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ExploreError::Remote(remote) => match remote.status {
            None => StatusCode::SERVICE_UNAVAILABLE,
            Some(status) if remote.is_client_error() => {
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Some(_) => StatusCode::BAD_GATEWAY,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Explore(err) => (
                status_for(&err),
                ErrorResponse {
                    error: err.kind().to_string(),
                    message: err.to_string(),
                },
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "BAD_REQUEST".to_string(),
                    message,
                },
            ),
        };
        if status.is_server_error() {
            error!(status = %status, kind = %body.error, "Request failed: {}", body.message);
        }
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// User id from the `userId` header
pub struct AuthenticatedUser(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(|user| AuthenticatedUser(user.to_string()))
            .ok_or_else(|| ApiError::BadRequest(format!("missing {} header", USER_ID_HEADER)))
    }
}

fn split_list<T: FromStr>(raw: &str, what: &str) -> Result<Vec<T>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid {}: {}", what, item)))
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Json<Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn create_element_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<ElementCreation>,
) -> Result<(StatusCode, Json<Element>), ApiError> {
    let element = state.elements.create_element(request, &user).await?;
    Ok((StatusCode::CREATED, Json(element)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DuplicateParams {
    parent_directory_uuid: Option<ElementId>,
}

async fn duplicate_element_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
    Query(params): Query<DuplicateParams>,
) -> Result<(StatusCode, Json<Element>), ApiError> {
    let element = state
        .elements
        .duplicate_element(id, params.parent_directory_uuid, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(element)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewScriptParams {
    name: String,
    parent_directory_uuid: ElementId,
}

async fn create_script_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
    Query(params): Query<NewScriptParams>,
) -> Result<(StatusCode, Json<Element>), ApiError> {
    let element = state
        .elements
        .create_script_from(id, params.name, params.parent_directory_uuid, &user)
        .await?;
    Ok((StatusCode::CREATED, Json(element)))
}

async fn update_element_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
    Json(patch): Json<ElementPatch>,
) -> Result<StatusCode, ApiError> {
    state.elements.update_element(id, patch, &user).await?;
    Ok(StatusCode::OK)
}

async fn update_content_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
    Json(payload): Json<Value>,
) -> Result<StatusCode, ApiError> {
    state.elements.update_element_content(id, payload, &user).await?;
    Ok(StatusCode::OK)
}

async fn replace_with_script_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
) -> Result<StatusCode, ApiError> {
    state.elements.replace_with_script(id, &user).await?;
    Ok(StatusCode::OK)
}

async fn delete_element_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<ElementId>,
) -> Result<StatusCode, ApiError> {
    state.elements.delete_element(id, &user).await?;
    Ok(StatusCode::OK)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkDeleteParams {
    ids: String,
    parent_directory_uuid: Option<ElementId>,
}

async fn delete_elements_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(params): Query<BulkDeleteParams>,
) -> Result<Json<BulkDeletionReport>, ApiError> {
    let ids = split_list(&params.ids, "element id")?;
    let report = state
        .elements
        .delete_elements(ids, params.parent_directory_uuid, &user)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetadataParams {
    ids: String,
    element_types: Option<String>,
    equipment_types: Option<String>,
}

async fn list_metadata_handler(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(params): Query<MetadataParams>,
) -> Result<Json<Vec<Element>>, ApiError> {
    let element_types = params
        .element_types
        .as_deref()
        .map(|raw| split_list::<ElementType>(raw, "element type"))
        .transpose()?;
    let equipment_types = params
        .equipment_types
        .as_deref()
        .map(|raw| split_list::<String>(raw, "equipment type"))
        .transpose()?;

    let query = MetadataQuery {
        ids: split_list(&params.ids, "element id")?,
        element_types,
        equipment_types,
    };
    Ok(Json(state.aggregator.list(&query).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::RemoteError;
    use crate::domain::permission::PermissionType;
    use crate::domain::type_registry::TypeRegistry;
    use crate::infrastructure::in_memory::{InMemoryContentService, InMemoryDirectory};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct TestApp {
        directory: Arc<InMemoryDirectory>,
        filters: Arc<InMemoryContentService>,
        router: Router,
    }

    fn test_app() -> TestApp {
        let directory = Arc::new(InMemoryDirectory::new());
        let filters = Arc::new(InMemoryContentService::new("filter-server"));
        let registry = TypeRegistry::builder()
            .register(ElementType::Filter, filters.clone(), true)
            .build()
            .unwrap();
        let backends = Backends {
            directory: directory.clone(),
            user_admin: None,
            registry: Arc::new(registry),
        };
        let state = AppState::from_backends(&backends, Arc::new(EventBus::with_default_capacity()));
        TestApp {
            directory,
            filters,
            router: app(state),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn create_request(parent: ElementId, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/explore/elements")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let body = serde_json::json!({
            "type": "FILTER",
            "name": "lines",
            "parentDirectoryUuid": parent.to_string(),
            "payload": {"equipmentType": "LINE"}
        });
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_missing_user_header() {
        let app = test_app();
        let response = app
            .router
            .oneshot(create_request(ElementId::new(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(app.filters.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_element() {
        let app = test_app();
        let response = app
            .router
            .oneshot(create_request(ElementId::new(), Some("u1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = json_body(response).await;
        let id = ElementId::from_string(body["elementUuid"].as_str().unwrap()).unwrap();
        assert_eq!(body["type"], "FILTER");
        assert!(app.filters.contains(id));
        assert!(app.directory.contains(id));
    }

    #[tokio::test]
    async fn test_permission_denied_is_forbidden() {
        let app = test_app();
        app.directory.deny_permission(PermissionType::Write, "read only directory");

        let response = app
            .router
            .oneshot(create_request(ElementId::new(), Some("u1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = json_body(response).await;
        assert_eq!(body["error"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_bulk_delete_reports_outcomes() {
        let app = test_app();
        let ok = ElementId::new();
        let ko = ElementId::new();
        for id in [ok, ko] {
            app.directory
                .insert(Element::new(id, "f", ElementType::Filter.into(), "u1", None), None);
            app.filters.insert(id, Value::Null);
        }
        app.filters.fail_delete_of(ko);

        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/explore/elements?ids={},{}", ok, ko))
            .header(USER_ID_HEADER, "u1")
            .body(Body::empty())
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let outcomes = body["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].get("error").is_none());
        assert!(outcomes[1]["error"].is_string());
    }

    #[tokio::test]
    async fn test_metadata_listing() {
        let app = test_app();
        let id = ElementId::new();
        app.directory
            .insert(Element::new(id, "f", ElementType::Filter.into(), "u1", None), None);
        let mut metadata = serde_json::Map::new();
        metadata.insert("equipmentType".into(), Value::String("LINE".into()));
        app.filters.set_metadata(id, metadata);

        let request = Request::builder()
            .uri(format!("/v1/explore/elements/metadata?ids={}&elementTypes=FILTER", id))
            .header(USER_ID_HEADER, "u1")
            .body(Body::empty())
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body[0]["specificMetadata"]["equipmentType"], "LINE");
    }

    #[tokio::test]
    async fn test_invalid_id_list() {
        let app = test_app();
        let request = Request::builder()
            .uri("/v1/explore/elements/metadata?ids=not-a-uuid")
            .header(USER_ID_HEADER, "u1")
            .body(Body::empty())
            .unwrap();
        let response = app.router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_remote_status_mapping() {
        let conflict = ExploreError::from(RemoteError::new("filter-server", Some(409), "conflict"));
        assert_eq!(status_for(&conflict), StatusCode::CONFLICT);

        let crash = ExploreError::from(RemoteError::new("filter-server", Some(500), "boom"));
        assert_eq!(status_for(&crash), StatusCode::BAD_GATEWAY);

        let garbled = ExploreError::from(RemoteError::new("filter-server", Some(200), "unreadable response body"));
        assert_eq!(status_for(&garbled), StatusCode::BAD_GATEWAY);

        let down = ExploreError::from(RemoteError::unreachable("filter-server", "refused"));
        assert_eq!(status_for(&down), StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(
            status_for(&ExploreError::MaxElementsExceeded { limit: 1 }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_for(&ExploreError::ImportFailed("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
