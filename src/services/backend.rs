// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Search backend contract and startup selection.
//!
//! Every store that can hold the search index implements [`SearchBackend`].
//! The facade, synchronizer and reindex orchestrator only ever see
//! `Arc<dyn SearchBackend>`; which implementation sits behind it is decided
//! once at startup by [`connect_backend`].

use crate::error::BackendError;
use crate::models::search::{SearchPage, SearchParams, SearchableDocument, SuggestParams, Suggestion};
use crate::models::settings::{SearchBackendKind, Settings};
use crate::services::meilisearch::{MeilisearchBackend, MeilisearchConfig};
use crate::services::postgres::PostgresSearchBackend;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use std::sync::Arc;

/// Uniform contract over the stores that can back the search index
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short backend identity used in logs and error context
    fn name(&self) -> &'static str;

    /// Ranked search. An empty query matches every document.
    async fn search(&self, params: &SearchParams) -> Result<SearchPage, BackendError>;

    /// Title suggestions for a partial query
    async fn suggest(&self, params: &SuggestParams) -> Result<Vec<Suggestion>, BackendError>;

    /// Insert or replace one document, keyed by id
    async fn upsert(&self, document: &SearchableDocument) -> Result<(), BackendError>;

    /// Remove one document. Removing an absent id succeeds.
    async fn delete(&self, id: &str) -> Result<(), BackendError>;

    /// Replace the whole document set with `documents`
    async fn bulk_replace(&self, documents: &[SearchableDocument]) -> Result<(), BackendError>;

    /// Number of documents currently in the index
    async fn document_count(&self) -> Result<u64, BackendError>;

    /// Create tables or index settings the backend needs
    async fn prepare(&self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Release pooled connections
    async fn shutdown(&self) {}
}

/// Build the backend selected in `settings`. Callers run `prepare` before
/// serving traffic.
pub async fn connect_backend(settings: &Settings) -> anyhow::Result<Arc<dyn SearchBackend>> {
    tracing::info!(backend = %settings.search_backend, "connecting search backend");

    let backend: Arc<dyn SearchBackend> = match settings.search_backend {
        SearchBackendKind::Postgres => {
            let url = settings
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("DATABASE_URL must be set for the postgres backend"))?;
            let backend = PostgresSearchBackend::connect(url, settings.database_max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            Arc::new(backend)
        }
        SearchBackendKind::Meilisearch => {
            let host = settings
                .meilisearch_host
                .as_deref()
                .ok_or_else(|| anyhow!("MEILISEARCH_HOST must be set for the meilisearch backend"))?;
            let config = MeilisearchConfig {
                host: host.to_string(),
                api_key: settings.meilisearch_api_key.clone(),
                index_name: settings.meilisearch_index.clone(),
                task_timeout: settings.meilisearch_task_timeout(),
            };
            Arc::new(MeilisearchBackend::new(config).context("failed to create Meilisearch client")?)
        }
    };

    tracing::info!(backend = backend.name(), "search backend connected");
    Ok(backend)
}
