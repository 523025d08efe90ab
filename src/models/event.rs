// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Media lifecycle events published by the CMS service.

use crate::models::media::MediaRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A change to one media record.
///
/// Wire format: `{"event_type": "created" | "updated" | "deleted", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MediaEvent {
    Created {
        media: MediaRecord,
        #[serde(default = "Utc::now")]
        occurred_at: DateTime<Utc>,
    },
    Updated {
        media: MediaRecord,
        #[serde(default = "Utc::now")]
        occurred_at: DateTime<Utc>,
    },
    Deleted {
        media_id: String,
        #[serde(default = "Utc::now")]
        occurred_at: DateTime<Utc>,
    },
}

impl MediaEvent {
    pub fn created(media: MediaRecord) -> Self {
        MediaEvent::Created {
            media,
            occurred_at: Utc::now(),
        }
    }

    pub fn updated(media: MediaRecord) -> Self {
        MediaEvent::Updated {
            media,
            occurred_at: Utc::now(),
        }
    }

    pub fn deleted(media_id: impl Into<String>) -> Self {
        MediaEvent::Deleted {
            media_id: media_id.into(),
            occurred_at: Utc::now(),
        }
    }

    /// Id of the media record the event is about
    pub fn media_id(&self) -> &str {
        match self {
            MediaEvent::Created { media, .. } | MediaEvent::Updated { media, .. } => &media.id,
            MediaEvent::Deleted { media_id, .. } => media_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MediaEvent::Created { occurred_at, .. }
            | MediaEvent::Updated { occurred_at, .. }
            | MediaEvent::Deleted { occurred_at, .. } => *occurred_at,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaEvent::Created { .. } => "created",
            MediaEvent::Updated { .. } => "updated",
            MediaEvent::Deleted { .. } => "deleted",
        }
    }
}
