// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

mod common;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use common::{media, InMemoryBackend};
use media_discovery::error::{DiscoveryError, MetadataError};
use media_discovery::models::media::{MediaPage, MediaRecord, MediaStatus, MediaType};
use media_discovery::services::backend::SearchBackend;
use media_discovery::services::metadata_client::{CmsClient, MetadataSource};
use media_discovery::services::reindex::{ReindexOptions, ReindexOrchestrator};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Deserialize)]
struct PageQuery {
    limit: usize,
    offset: usize,
}

async fn list_media(
    State(records): State<Arc<Vec<MediaRecord>>>,
    Query(page): Query<PageQuery>,
) -> Json<MediaPage> {
    Json(MediaPage {
        items: records.iter().skip(page.offset).take(page.limit).cloned().collect(),
        total: records.len() as u64,
        limit: Some(page.limit as u32),
        offset: Some(page.offset as u64),
    })
}

/// Serve `router` on an ephemeral port and return its base URL
async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn cms(records: Vec<MediaRecord>) -> String {
    let router = Router::new()
        .route("/api/v1/media", get(list_media))
        .with_state(Arc::new(records));
    spawn(router).await
}

fn client(base_url: &str) -> CmsClient {
    CmsClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn records(count: i64) -> Vec<MediaRecord> {
    (0..count)
        .map(|i| media(&format!("m-{i}"), &format!("Show {i}"), MediaType::Video, MediaStatus::Ready, i))
        .collect()
}

#[tokio::test]
async fn test_list_media_reads_page() {
    let base = cms(records(5)).await;

    let page = client(&base).list_media(2, 1).await.unwrap();

    assert_eq!(page.total, 5);
    let ids: Vec<&str> = page.items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["m-1", "m-2"]);
}

#[tokio::test]
async fn test_error_status_reported_with_body() {
    let router = Router::new().route(
        "/api/v1/media",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database is down") }),
    );
    let base = spawn(router).await;

    let err = client(&base).list_media(100, 0).await.unwrap_err();

    match err {
        MetadataError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database is down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// Records uploaded without tags come back with "tags": null
const NULL_TAGS_PAGE: &str = r#"{
    "items": [{
        "id": "m-untagged", "title": "Untagged Episode", "description": "", "file_path": "media/e.mp3",
        "file_size": 2048, "duration": 60, "format": "mp3", "type": "podcast", "status": "ready",
        "tags": null, "created_at": "2025-01-15T10:00:00Z", "updated_at": "2025-01-15T10:00:00Z"
    }],
    "total": 1, "limit": 100, "offset": 0
}"#;

#[tokio::test]
async fn test_null_tags_from_cms_are_indexed() {
    let router = Router::new().route("/api/v1/media", get(|| async { NULL_TAGS_PAGE }));
    let base = spawn(router).await;
    let backend = Arc::new(InMemoryBackend::new());

    let page = client(&base).list_media(100, 0).await.unwrap();
    assert!(page.items[0].tags.is_empty());

    let orchestrator = ReindexOrchestrator::new(
        Arc::new(client(&base)),
        backend.clone(),
        ReindexOptions::default(),
    );
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.indexed, 1);
    assert_eq!(backend.ids(), vec!["m-untagged".to_string()]);
}

#[tokio::test]
async fn test_null_items_is_empty_catalogue() {
    let router = Router::new().route(
        "/api/v1/media",
        get(|| async { r#"{"items": null, "total": 0, "limit": 100, "offset": 0}"# }),
    );
    let base = spawn(router).await;

    let page = client(&base).list_media(100, 0).await.unwrap();

    assert!(page.items.is_empty());
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_malformed_page_is_decode_error() {
    let router = Router::new().route("/api/v1/media", get(|| async { "{\"items\": 42}" }));
    let base = spawn(router).await;

    let err = client(&base).list_media(100, 0).await.unwrap_err();

    assert!(matches!(err, MetadataError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_cms_is_transport_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}")).list_media(100, 0).await.unwrap_err();

    assert!(matches!(err, MetadataError::Transport(_)));
}

#[tokio::test]
async fn test_reindex_over_http() {
    let base = cms(records(230)).await;
    let backend = Arc::new(InMemoryBackend::new());
    let orchestrator = ReindexOrchestrator::new(
        Arc::new(client(&base)),
        backend.clone(),
        ReindexOptions {
            batch_size: 100,
            ..ReindexOptions::default()
        },
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.indexed, 230);
    assert_eq!(report.pages, 3);
    assert_eq!(backend.document_count().await.unwrap(), 230);
}

#[tokio::test]
async fn test_reindex_aborts_on_cms_failure() {
    let router = Router::new().route(
        "/api/v1/media",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream") }),
    );
    let base = spawn(router).await;
    let backend = Arc::new(InMemoryBackend::with_documents(vec![common::document("keep", "Keep")]));
    let orchestrator = ReindexOrchestrator::new(
        Arc::new(client(&base)),
        backend.clone(),
        ReindexOptions::default(),
    );

    let err = orchestrator.run().await.unwrap_err();

    assert!(matches!(
        err,
        DiscoveryError::ReindexAborted {
            offset: 0,
            source: MetadataError::Status { status: 502, .. }
        }
    ));
    assert_eq!(backend.ids(), vec!["keep".to_string()]);
}
