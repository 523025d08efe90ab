// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Entry point for search, suggestions and reindexing.
//!
//! Requests are validated and normalised here; the backend behind the
//! service is never inspected. Upper page-size bounds belong to the adapters.

use crate::error::DiscoveryError;
use crate::models::media::MediaType;
use crate::models::response::ReindexReport;
use crate::models::search::{
    SearchParams, SearchRequest, SearchResponse, SuggestParams, SuggestRequest, SuggestResponse,
    DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGEST_LIMIT,
};
use crate::services::backend::SearchBackend;
use crate::services::logging::truncate_for_log;
use crate::services::reindex::ReindexOrchestrator;
use std::sync::Arc;

pub struct SearchService {
    backend: Arc<dyn SearchBackend>,
    reindexer: ReindexOrchestrator,
}

impl SearchService {
    pub fn new(backend: Arc<dyn SearchBackend>, reindexer: ReindexOrchestrator) -> Self {
        Self { backend, reindexer }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, DiscoveryError> {
        let params = normalize_search(&request)?;

        let page = self
            .backend
            .search(&params)
            .await
            .map_err(|e| DiscoveryError::backend(self.backend.name(), "search", e))?;

        tracing::debug!(
            query = %truncate_for_log(&params.query),
            hits = page.hits.len(),
            total = page.total,
            "search served"
        );

        Ok(SearchResponse {
            results: page.hits,
            total: page.total,
            query: params.query,
            limit: params.limit,
            offset: params.offset,
        })
    }

    pub async fn suggest(&self, request: SuggestRequest) -> Result<SuggestResponse, DiscoveryError> {
        let params = normalize_suggest(&request)?;

        let suggestions = self
            .backend
            .suggest(&params)
            .await
            .map_err(|e| DiscoveryError::backend(self.backend.name(), "suggest", e))?;

        Ok(SuggestResponse {
            suggestions,
            query: params.query,
        })
    }

    pub async fn reindex(&self) -> Result<ReindexReport, DiscoveryError> {
        self.reindexer.run().await
    }

    pub async fn document_count(&self) -> Result<u64, DiscoveryError> {
        self.backend
            .document_count()
            .await
            .map_err(|e| DiscoveryError::backend(self.backend.name(), "document_count", e))
    }
}

/// Validate a client search request and apply defaults
pub fn normalize_search(request: &SearchRequest) -> Result<SearchParams, DiscoveryError> {
    let query = required_query(&request.query)?;

    let media_type = match request.media_type.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(MediaType::parse(value).ok_or_else(|| {
            DiscoveryError::invalid("type", format!("unknown media type '{value}', expected video or podcast"))
        })?),
    };

    Ok(SearchParams {
        query,
        media_type,
        limit: limit_or_default(request.limit, DEFAULT_SEARCH_LIMIT),
        offset: request
            .offset
            .and_then(|offset| u64::try_from(offset).ok())
            .unwrap_or(0),
    })
}

/// Validate a client suggestion request and apply defaults
pub fn normalize_suggest(request: &SuggestRequest) -> Result<SuggestParams, DiscoveryError> {
    Ok(SuggestParams {
        query: required_query(&request.query)?,
        limit: limit_or_default(request.limit, DEFAULT_SUGGEST_LIMIT),
    })
}

fn required_query(query: &str) -> Result<String, DiscoveryError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(DiscoveryError::invalid("query", "query is required"));
    }
    Ok(query.to_string())
}

fn limit_or_default(limit: Option<i64>, default: u32) -> u32 {
    match limit {
        Some(limit) if limit > 0 => u32::try_from(limit).unwrap_or(u32::MAX),
        _ => default,
    }
}
