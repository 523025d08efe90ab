// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, error mapping and router construction.
//!
//! This module is `pub` so that integration tests can build a test router
//! directly without starting the full binary.

use crate::error::DiscoveryError;
use crate::models::event::MediaEvent;
use crate::models::media::{MediaRecord, MediaStatus, MediaType};
use crate::models::response::{
    ErrorResponse, EventAcceptedResponse, HealthResponse, ReindexReport, ReindexResponse,
};
use crate::models::search::{
    SearchHit, SearchRequest, SearchResponse, SearchableDocument, SuggestRequest,
    SuggestResponse, Suggestion,
};
use crate::models::version::VersionResponse;
use crate::services::event_worker::EventPublisher;
use crate::services::search_service::SearchService;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use std::error::Error as _;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `DISCOVERY_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("DISCOVERY_VERSION");

pub const SERVICE_NAME: &str = "media-discovery";

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub search_service: Arc<SearchService>,
    /// Intake for CMS media events, drained by the event worker
    pub publisher: EventPublisher,
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

pub fn status_for(err: &DiscoveryError) -> StatusCode {
    match err {
        DiscoveryError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        DiscoveryError::SearchBackendUnavailable { .. }
        | DiscoveryError::EventQueueFull
        | DiscoveryError::EventQueueClosed => StatusCode::SERVICE_UNAVAILABLE,
        DiscoveryError::ReindexAborted { .. } | DiscoveryError::ReindexTimedOut { .. } => {
            StatusCode::BAD_GATEWAY
        }
        DiscoveryError::PartialIndexInconsistency { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        DiscoveryError::ReindexInProgress => StatusCode::CONFLICT,
    }
}

/// Convert a service error into an HTTP error response
pub fn api_error(err: DiscoveryError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "request failed");
    }

    let field = match &err {
        DiscoveryError::InvalidQuery { field, .. } => Some((*field).to_string()),
        _ => None,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.code().to_string(),
            message: err.to_string(),
            field,
            details: err.source().map(|source| source.to_string()),
        }),
    )
}

fn reindex_task_error(err: tokio::task::JoinError) -> ApiError {
    tracing::error!(error = %err, "reindex task did not complete");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "INTERNAL_ERROR".to_string(),
            message: "reindex task did not complete".to_string(),
            field: None,
            details: Some(err.to_string()),
        }),
    )
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "system"
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/version",
    responses((status = 200, description = "Build version and active backend", body = VersionResponse)),
    tag = "system"
)]
pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        search_backend: state.search_service.backend_name().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SearchRequest),
    responses(
        (status = 200, description = "Ranked search results", body = SearchResponse),
        (status = 400, description = "Missing query or unknown type", body = ErrorResponse),
        (status = 503, description = "Search backend unavailable", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    state.search_service.search(request).await.map(Json).map_err(api_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/search/suggest",
    params(SuggestRequest),
    responses(
        (status = 200, description = "Title suggestions", body = SuggestResponse),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 503, description = "Search backend unavailable", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn suggest_handler(
    State(state): State<AppState>,
    Query(request): Query<SuggestRequest>,
) -> Result<Json<SuggestResponse>, ApiError> {
    state.search_service.suggest(request).await.map(Json).map_err(api_error)
}

#[utoipa::path(
    post,
    path = "/api/v1/search/reindex",
    responses(
        (status = 200, description = "Index rebuilt from the CMS", body = ReindexResponse),
        (status = 409, description = "A reindex is already running", body = ErrorResponse),
        (status = 500, description = "Index left empty, run reindex again", body = ErrorResponse),
        (status = 502, description = "CMS scan failed, index unchanged", body = ErrorResponse),
        (status = 503, description = "Search backend unavailable", body = ErrorResponse)
    ),
    tag = "search"
)]
pub async fn reindex_handler(
    State(state): State<AppState>,
) -> Result<Json<ReindexResponse>, ApiError> {
    // Run detached so a dropped request cannot stop a bulk replace halfway
    let service = Arc::clone(&state.search_service);
    let report = tokio::spawn(async move { service.reindex().await })
        .await
        .map_err(reindex_task_error)?
        .map_err(api_error)?;

    Ok(Json(ReindexResponse {
        success: true,
        message: format!("Indexed {} documents", report.indexed),
        report,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/search/events",
    request_body = MediaEvent,
    responses(
        (status = 202, description = "Event queued for indexing", body = EventAcceptedResponse),
        (status = 503, description = "Event queue full or closed", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn publish_event_handler(
    State(state): State<AppState>,
    Json(event): Json<MediaEvent>,
) -> Result<(StatusCode, Json<EventAcceptedResponse>), ApiError> {
    let accepted = EventAcceptedResponse {
        accepted: true,
        media_id: event.media_id().to_string(),
        event_type: event.kind().to_string(),
    };

    state.publisher.publish(event).map_err(api_error)?;

    Ok((StatusCode::ACCEPTED, Json(accepted)))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    info(title = "media-discovery", description = "Full-text search over CMS media metadata"),
    paths(
        health_handler,
        version_handler,
        search_handler,
        suggest_handler,
        reindex_handler,
        publish_event_handler
    ),
    components(schemas(
        SearchableDocument,
        SearchHit,
        SearchResponse,
        Suggestion,
        SuggestResponse,
        ReindexReport,
        ReindexResponse,
        MediaEvent,
        MediaRecord,
        MediaType,
        MediaStatus,
        EventAcceptedResponse,
        HealthResponse,
        VersionResponse,
        ErrorResponse
    )),
    tags(
        (name = "search", description = "Search, suggestions and index rebuilds"),
        (name = "events", description = "Media lifecycle event intake"),
        (name = "system", description = "Health and version")
    )
)]
pub struct ApiDoc;

/// Build the Axum application router, with Swagger UI at `/swagger-ui`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/api/v1/search", get(search_handler))
        .route("/api/v1/search/suggest", get(suggest_handler))
        .route("/api/v1/search/reindex", post(reindex_handler))
        .route("/api/v1/search/events", post(publish_event_handler))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
