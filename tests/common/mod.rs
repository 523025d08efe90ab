// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Fakes shared by the integration tests: an in-memory search backend and a
//! paged metadata source.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use media_discovery::error::{BackendError, MetadataError};
use media_discovery::models::media::{MediaPage, MediaRecord, MediaStatus, MediaType};
use media_discovery::models::search::{
    SearchHit, SearchPage, SearchParams, SearchableDocument, SuggestParams, Suggestion,
};
use media_discovery::services::backend::SearchBackend;
use media_discovery::services::metadata_client::MetadataSource;
use media_discovery::services::query::{clamp_search_limit, clamp_suggest_limit};
use media_discovery::services::reindex::{ReindexOptions, ReindexOrchestrator};
use media_discovery::services::search_service::SearchService;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Media record created `seq` minutes after a fixed epoch, so ordering by
/// creation time is deterministic
pub fn media(id: &str, title: &str, media_type: MediaType, status: MediaStatus, seq: i64) -> MediaRecord {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + ChronoDuration::minutes(seq);
    MediaRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("Description of {title}"),
        file_path: format!("media/{id}"),
        file_size: 1024,
        duration: 60,
        format: "mp4".to_string(),
        media_type,
        status,
        tags: vec![],
        created_at,
        updated_at: created_at,
    }
}

pub fn ready_video(id: &str, title: &str) -> MediaRecord {
    media(id, title, MediaType::Video, MediaStatus::Ready, 0)
}

pub fn document(id: &str, title: &str) -> SearchableDocument {
    SearchableDocument::from_record(&ready_video(id, title)).unwrap()
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Search backend holding documents in a map. Matching is case-insensitive
/// on whole words of `content`; the score is the number of query words found.
#[derive(Default)]
pub struct InMemoryBackend {
    documents: Mutex<BTreeMap<String, SearchableDocument>>,
    /// Every call fails while set
    pub unavailable: AtomicBool,
    /// Number of upcoming upserts that fail
    pub failing_upserts: AtomicU32,
    /// Upserts are refused as invalid documents
    pub rejecting_upserts: AtomicBool,
    /// `bulk_replace` clears the index and then fails
    pub fail_after_clear: AtomicBool,
    /// Pause between clearing and refilling in `bulk_replace`
    pub replace_delay: Option<Duration>,
    pub upserts: AtomicUsize,
    pub deletes: AtomicUsize,
    pub bulk_replaces: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: Vec<SearchableDocument>) -> Self {
        let backend = Self::default();
        {
            let mut map = backend.documents.lock().unwrap();
            for doc in documents {
                map.insert(doc.id.clone(), doc);
            }
        }
        backend
    }

    pub fn with_replace_delay(mut self, delay: Duration) -> Self {
        self.replace_delay = Some(delay);
        self
    }

    pub fn ids(&self) -> Vec<String> {
        self.documents.lock().unwrap().keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<SearchableDocument> {
        self.documents.lock().unwrap().get(id).cloned()
    }

    fn check_available(&self) -> Result<(), BackendError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchPage, BackendError> {
        self.check_available()?;

        let terms = words(&params.query);
        let documents = self.documents.lock().unwrap();

        let mut matches: Vec<SearchHit> = documents
            .values()
            .filter(|doc| params.media_type.map_or(true, |t| doc.media_type == t))
            .filter_map(|doc| {
                if terms.is_empty() {
                    return Some(SearchHit { document: doc.clone(), score: 1.0 });
                }
                let content = words(&doc.content);
                let found = terms.iter().filter(|t| content.contains(t)).count();
                (found == terms.len()).then(|| SearchHit {
                    document: doc.clone(),
                    score: found as f64,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.document.created_at.cmp(&a.document.created_at))
        });

        let total = matches.len() as u64;
        let hits = matches
            .into_iter()
            .skip(params.offset as usize)
            .take(clamp_search_limit(params.limit) as usize)
            .collect();

        Ok(SearchPage { hits, total })
    }

    async fn suggest(&self, params: &SuggestParams) -> Result<Vec<Suggestion>, BackendError> {
        self.check_available()?;

        let needle = params.query.trim().to_lowercase();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for doc in self.documents.lock().unwrap().values() {
            if doc.title.to_lowercase().contains(&needle) {
                *counts.entry(doc.title.clone()).or_default() += 1;
            }
        }

        let mut suggestions: Vec<Suggestion> = counts
            .into_iter()
            .map(|(text, count)| Suggestion { text, count })
            .collect();
        suggestions.sort_by(|a, b| b.count.cmp(&a.count).then(a.text.cmp(&b.text)));
        suggestions.truncate(clamp_suggest_limit(params.limit) as usize);
        Ok(suggestions)
    }

    async fn upsert(&self, document: &SearchableDocument) -> Result<(), BackendError> {
        self.check_available()?;
        self.upserts.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failing_upserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(BackendError::Unavailable("upsert timed out".to_string()));
        }
        if self.rejecting_upserts.load(Ordering::SeqCst) {
            return Err(BackendError::TaskFailed {
                task_uid: 1,
                message: format!("invalid document id {}", document.id),
            });
        }

        self.documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.check_available()?;
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.documents.lock().unwrap().remove(id);
        Ok(())
    }

    async fn bulk_replace(&self, documents: &[SearchableDocument]) -> Result<(), BackendError> {
        self.check_available()?;
        self.bulk_replaces.fetch_add(1, Ordering::SeqCst);

        self.documents.lock().unwrap().clear();
        if self.fail_after_clear.load(Ordering::SeqCst) {
            return Err(BackendError::PartialReplace {
                source: Box::new(BackendError::Unavailable("insert rejected".to_string())),
            });
        }
        if let Some(delay) = self.replace_delay {
            tokio::time::sleep(delay).await;
        }

        let mut map = self.documents.lock().unwrap();
        for doc in documents {
            map.insert(doc.id.clone(), doc.clone());
        }
        Ok(())
    }

    async fn document_count(&self) -> Result<u64, BackendError> {
        self.check_available()?;
        Ok(self.documents.lock().unwrap().len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Paged metadata source
// ---------------------------------------------------------------------------

/// Serves a fixed record list page by page, like the CMS listing endpoint
#[derive(Default)]
pub struct PagedMetadataSource {
    records: Vec<MediaRecord>,
    /// Requests at this offset fail
    pub fail_at_offset: Option<u64>,
    /// Delay before every page
    pub delay: Option<Duration>,
    calls: Mutex<Vec<(u32, u64)>>,
}

impl PagedMetadataSource {
    pub fn new(records: Vec<MediaRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn failing_at(mut self, offset: u64) -> Self {
        self.fail_at_offset = Some(offset);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// `(limit, offset)` of every request so far
    pub fn calls(&self) -> Vec<(u32, u64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataSource for PagedMetadataSource {
    async fn list_media(&self, limit: u32, offset: u64) -> Result<MediaPage, MetadataError> {
        self.calls.lock().unwrap().push((limit, offset));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_at_offset == Some(offset) {
            return Err(MetadataError::Status {
                status: 503,
                body: "cms unavailable".to_string(),
            });
        }

        let items = self
            .records
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(MediaPage {
            items,
            total: self.records.len() as u64,
            limit: Some(limit),
            offset: Some(offset),
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn orchestrator(
    source: Arc<PagedMetadataSource>,
    backend: Arc<InMemoryBackend>,
    batch_size: u32,
) -> ReindexOrchestrator {
    ReindexOrchestrator::new(
        source,
        backend,
        ReindexOptions {
            batch_size,
            ..ReindexOptions::default()
        },
    )
}

/// Search service over `backend` whose reindex reads `records`
pub fn service(backend: Arc<InMemoryBackend>, records: Vec<MediaRecord>) -> SearchService {
    let source = Arc::new(PagedMetadataSource::new(records));
    SearchService::new(backend.clone(), orchestrator(source, backend, 100))
}
