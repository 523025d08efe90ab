// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. `INVALID_QUERY`
    pub error: String,
    pub message: String,
    /// Request field that failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Underlying cause, for diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Outcome of a full index rebuild
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReindexReport {
    /// Records read from the CMS across all pages
    pub fetched: u64,
    /// Documents written by the bulk replace
    pub indexed: u64,
    /// Records left out because they were not ready or were repeated across pages
    pub skipped: u64,
    pub pages: u32,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReindexResponse {
    pub success: bool,
    pub message: String,
    pub report: ReindexReport,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventAcceptedResponse {
    pub accepted: bool,
    pub media_id: String,
    pub event_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}
