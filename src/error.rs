// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types for search, indexing and reindexing.

use thiserror::Error;

/// Failure inside a search backend adapter
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("search engine error: {0}")]
    Engine(#[from] meilisearch_sdk::errors::Error),

    /// The engine accepted a task but reported it as failed
    #[error("search engine task {task_uid} failed: {message}")]
    TaskFailed { task_uid: u32, message: String },

    /// A stored row or document could not be mapped back to a document
    #[error("invalid stored document {id}: {reason}")]
    InvalidDocument { id: String, reason: String },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Bulk replace removed, or may have removed, the old document set without writing the new one
    #[error("index cleared but new documents were not written: {source}")]
    PartialReplace {
        #[source]
        source: Box<BackendError>,
    },

    /// Returned by test doubles and adapters that lose their connection
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    /// The backend refused this input; sending it again fails the same way
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            BackendError::TaskFailed { .. }
                | BackendError::InvalidDocument { .. }
                | BackendError::Encode(_)
        )
    }
}

/// Failure reading pages from the CMS metadata API
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid metadata service URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("metadata request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("metadata service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed metadata page: {0}")]
    Decode(String),
}

/// Errors surfaced by the search service to its callers
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Request failed validation; never retried
    #[error("invalid {field}: {message}")]
    InvalidQuery {
        field: &'static str,
        message: String,
    },

    /// Backend call failed; the caller may retry the whole operation
    #[error("search backend {backend} unavailable during {operation}: {source}")]
    SearchBackendUnavailable {
        backend: &'static str,
        operation: &'static str,
        #[source]
        source: BackendError,
    },

    /// Paged scan failed; nothing was written to the index
    #[error("reindex aborted at offset {offset}: {source}")]
    ReindexAborted {
        offset: u64,
        #[source]
        source: MetadataError,
    },

    /// Paged scan ran past its deadline; nothing was written to the index
    #[error("reindex aborted at offset {offset}: scan exceeded {timeout_secs}s deadline")]
    ReindexTimedOut { offset: u64, timeout_secs: u64 },

    /// Index was emptied and not refilled; a new reindex is required
    #[error("search index on {backend} is empty after a failed bulk replace, run reindex again: {source}")]
    PartialIndexInconsistency {
        backend: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("a reindex is already running")]
    ReindexInProgress,

    #[error("media event queue is full")]
    EventQueueFull,

    #[error("media event queue is closed")]
    EventQueueClosed,
}

impl DiscoveryError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        DiscoveryError::InvalidQuery {
            field,
            message: message.into(),
        }
    }

    /// Wrap an adapter failure with the operation and backend it happened on.
    /// A partial bulk replace is reported as an index inconsistency.
    pub fn backend(backend: &'static str, operation: &'static str, source: BackendError) -> Self {
        match source {
            BackendError::PartialReplace { source } => DiscoveryError::PartialIndexInconsistency {
                backend,
                source: *source,
            },
            source => DiscoveryError::SearchBackendUnavailable {
                backend,
                operation,
                source,
            },
        }
    }

    /// Machine-readable code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            DiscoveryError::InvalidQuery { .. } => "INVALID_QUERY",
            DiscoveryError::SearchBackendUnavailable { .. } => "SEARCH_BACKEND_UNAVAILABLE",
            DiscoveryError::ReindexAborted { .. } | DiscoveryError::ReindexTimedOut { .. } => {
                "REINDEX_ABORTED"
            }
            DiscoveryError::PartialIndexInconsistency { .. } => "PARTIAL_INDEX_INCONSISTENCY",
            DiscoveryError::ReindexInProgress => "REINDEX_IN_PROGRESS",
            DiscoveryError::EventQueueFull | DiscoveryError::EventQueueClosed => {
                "EVENT_QUEUE_UNAVAILABLE"
            }
        }
    }

    /// Whether redelivering the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DiscoveryError::InvalidQuery { .. } => false,
            DiscoveryError::SearchBackendUnavailable { source, .. } => !source.is_permanent(),
            _ => true,
        }
    }
}
