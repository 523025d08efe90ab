// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Media records as served by the CMS metadata API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Kind of media content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Podcast,
}

impl MediaType {
    /// Parse from the wire/database representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(MediaType::Video),
            "podcast" => Some(MediaType::Podcast),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Podcast => "podcast",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a media record in the CMS.
///
/// Only `Ready` records are eligible for the search index. Statuses this
/// service does not know about deserialize as `Unknown` and are never indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    Uploading,
    Ready,
    Failed,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl MediaStatus {
    /// Parse from the wire/database representation; unrecognised values map to `Unknown`
    pub fn parse(value: &str) -> Self {
        match value {
            "uploading" => MediaStatus::Uploading,
            "ready" => MediaStatus::Ready,
            "failed" => MediaStatus::Failed,
            "deleted" => MediaStatus::Deleted,
            _ => MediaStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaStatus::Uploading => "uploading",
            MediaStatus::Ready => "ready",
            MediaStatus::Failed => "failed",
            MediaStatus::Deleted => "deleted",
            MediaStatus::Unknown => "unknown",
        }
    }

    /// Whether a record in this status belongs in the search index
    pub fn is_searchable(&self) -> bool {
        matches!(self, MediaStatus::Ready)
    }
}

impl std::fmt::Display for MediaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The CMS encodes empty lists as `null`
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Authoritative media record owned by the CMS service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MediaRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_path: String,
    /// File size in bytes
    #[serde(default)]
    pub file_size: i64,
    /// Duration in seconds
    #[serde(default)]
    pub duration: i32,
    /// Container format (mp4, mp3, ...)
    #[serde(default)]
    pub format: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub status: MediaStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaRecord {
    /// Whether this record may appear in search results
    pub fn is_searchable(&self) -> bool {
        self.status.is_searchable()
    }
}

/// One page of the CMS `GET /api/v1/media` listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<MediaRecord>,
    /// Total number of records in the CMS at the time of the request
    pub total: u64,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u64>,
}
