// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Keeps the search index in step with CMS media events.

use crate::error::DiscoveryError;
use crate::models::event::MediaEvent;
use crate::models::search::SearchableDocument;
use crate::services::backend::SearchBackend;
use std::sync::Arc;

/// Index write an event translates to
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    Upsert(SearchableDocument),
    Delete(String),
}

impl SyncAction {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncAction::Upsert(_) => "upsert",
            SyncAction::Delete(_) => "delete",
        }
    }
}

/// Decide the index write for `event`.
///
/// A created or updated record that is ready is upserted. Any other status
/// removes the document, so a record that leaves `ready` also leaves the
/// index.
pub fn plan(event: &MediaEvent) -> SyncAction {
    match event {
        MediaEvent::Created { media, .. } | MediaEvent::Updated { media, .. } => {
            match SearchableDocument::from_record(media) {
                Some(document) => SyncAction::Upsert(document),
                None => SyncAction::Delete(media.id.clone()),
            }
        }
        MediaEvent::Deleted { media_id, .. } => SyncAction::Delete(media_id.clone()),
    }
}

/// Applies media events to the search backend, one backend call per event
#[derive(Clone)]
pub struct IndexSynchronizer {
    backend: Arc<dyn SearchBackend>,
}

impl IndexSynchronizer {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }

    /// Apply one event. Failures are logged and returned, never retried here.
    pub async fn handle(&self, event: &MediaEvent) -> Result<(), DiscoveryError> {
        let action = plan(event);
        let operation = action.kind();

        let result = match &action {
            SyncAction::Upsert(document) => self.backend.upsert(document).await,
            SyncAction::Delete(id) => self.backend.delete(id).await,
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    media_id = event.media_id(),
                    event = event.kind(),
                    operation,
                    "search index updated"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    media_id = event.media_id(),
                    event = event.kind(),
                    operation,
                    backend = self.backend.name(),
                    error = %e,
                    "failed to apply media event to search index"
                );
                Err(DiscoveryError::backend(self.backend.name(), operation, e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::media::{MediaRecord, MediaStatus, MediaType};
    use chrono::{TimeZone, Utc};

    fn record(status: MediaStatus) -> MediaRecord {
        let at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        MediaRecord {
            id: "m-7".to_string(),
            title: "Rust Ownership".to_string(),
            description: "Borrowing explained".to_string(),
            file_path: String::new(),
            file_size: 10,
            duration: 120,
            format: "mp3".to_string(),
            media_type: MediaType::Podcast,
            status,
            tags: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_ready_record_is_upserted() {
        for event in [
            MediaEvent::created(record(MediaStatus::Ready)),
            MediaEvent::updated(record(MediaStatus::Ready)),
        ] {
            match plan(&event) {
                SyncAction::Upsert(doc) => assert_eq!(doc.id, "m-7"),
                other => panic!("expected upsert, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_record_leaving_ready_is_removed() {
        let event = MediaEvent::updated(record(MediaStatus::Failed));
        assert_eq!(plan(&event), SyncAction::Delete("m-7".to_string()));

        let event = MediaEvent::created(record(MediaStatus::Uploading));
        assert_eq!(plan(&event), SyncAction::Delete("m-7".to_string()));
    }

    #[test]
    fn test_deleted_event_removes_by_id() {
        let event = MediaEvent::deleted("m-9");
        assert_eq!(plan(&event), SyncAction::Delete("m-9".to_string()));
        assert_eq!(plan(&event).kind(), "delete");
    }
}
