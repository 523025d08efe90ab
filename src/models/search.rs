// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::media::{MediaRecord, MediaStatus, MediaType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Page size used when the client does not ask for one
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// Upper bound backends apply to a search page
pub const MAX_SEARCH_LIMIT: u32 = 100;
/// Suggestions returned when the client does not ask for a count
pub const DEFAULT_SUGGEST_LIMIT: u32 = 10;
/// Upper bound backends apply to a suggestion list
pub const MAX_SUGGEST_LIMIT: u32 = 50;

/// Searchable projection of a ready media record.
///
/// The same shape is stored as a row in the `search_index` table and as a
/// document in the search engine index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchableDocument {
    /// Same id as the source media record
    pub id: String,
    pub title: String,
    pub description: String,
    /// Title and description joined, the text the full-text matchers run on
    pub content: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub status: MediaStatus,
    /// Duration in seconds
    pub duration: i32,
    /// File size in bytes
    pub file_size: i64,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchableDocument {
    /// Project a media record into a document, or `None` when the record is
    /// not eligible for the index.
    pub fn from_record(record: &MediaRecord) -> Option<Self> {
        if !record.is_searchable() {
            return None;
        }

        Some(Self {
            id: record.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            content: combined_text(&record.title, &record.description),
            media_type: record.media_type,
            status: record.status,
            duration: record.duration,
            file_size: record.file_size,
            format: record.format.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Combined searchable text. Mirrors the `content` generated column of the
/// `search_index` table.
pub fn combined_text(title: &str, description: &str) -> String {
    format!("{} {}", title, description).trim().to_string()
}

/// Search request as received from clients, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchRequest {
    /// Search query string (required)
    #[serde(default)]
    pub query: String,
    /// Media type filter: `video` or `podcast`; empty means all types
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Maximum number of results to return (default: 20)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Offset for pagination (default: 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Validated search request handed to backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Trimmed query text. Empty only on internal browse paths.
    pub query: String,
    pub media_type: Option<MediaType>,
    pub limit: u32,
    pub offset: u64,
}

/// A ranked search hit
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchHit {
    pub document: SearchableDocument,
    /// Backend-specific relevance score, only comparable within one response
    pub score: f64,
}

/// Ranked hits plus the total number of matching documents
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total: u64,
}

/// Search response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    /// Total number of matching documents
    pub total: u64,
    pub query: String,
    pub limit: u32,
    pub offset: u64,
}

/// Suggestion request as received from clients
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestRequest {
    /// Partial query text (required)
    #[serde(default)]
    pub query: String,
    /// Maximum number of suggestions (default: 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

/// Validated suggestion request handed to backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestParams {
    pub query: String,
    pub limit: u32,
}

/// A title suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    pub text: String,
    /// Number of documents carrying this title; backend-specific
    pub count: u64,
}

/// Suggestion response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuggestResponse {
    pub suggestions: Vec<Suggestion>,
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(status: MediaStatus) -> MediaRecord {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        MediaRecord {
            id: "m-1".to_string(),
            title: "Golang Tutorial".to_string(),
            description: "Learn Go from scratch".to_string(),
            file_path: "media/m-1.mp4".to_string(),
            file_size: 2048,
            duration: 600,
            format: "mp4".to_string(),
            media_type: MediaType::Video,
            status,
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_document_from_ready_record() {
        let doc = SearchableDocument::from_record(&record(MediaStatus::Ready)).unwrap();

        assert_eq!(doc.id, "m-1");
        assert_eq!(doc.content, "Golang Tutorial Learn Go from scratch");
        assert_eq!(doc.status, MediaStatus::Ready);
        assert_eq!(doc.file_size, 2048);
    }

    #[test]
    fn test_document_not_projected_for_non_ready_record() {
        assert!(SearchableDocument::from_record(&record(MediaStatus::Uploading)).is_none());
        assert!(SearchableDocument::from_record(&record(MediaStatus::Deleted)).is_none());
    }

    #[test]
    fn test_combined_text_without_description() {
        assert_eq!(combined_text("Go Basics", ""), "Go Basics");
    }

    #[test]
    fn test_document_serializes_type_field() {
        let doc = SearchableDocument::from_record(&record(MediaStatus::Ready)).unwrap();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["type"], "video");
        assert_eq!(json["status"], "ready");
    }

    #[test]
    fn test_search_request_from_query_string_shape() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query":"go","type":"podcast","limit":5}"#).unwrap();

        assert_eq!(request.query, "go");
        assert_eq!(request.media_type.as_deref(), Some("podcast"));
        assert_eq!(request.limit, Some(5));
        assert_eq!(request.offset, None);
    }
}
