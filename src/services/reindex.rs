// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Full rebuild of the search index from the CMS.
//!
//! The orchestrator pages through the CMS listing, keeps the ready records and
//! only then swaps the backend's document set in one `bulk_replace`. A scan
//! that fails, times out or is cancelled never touches the index.

use crate::error::DiscoveryError;
use crate::models::response::ReindexReport;
use crate::models::search::SearchableDocument;
use crate::services::backend::SearchBackend;
use crate::services::metadata_client::MetadataSource;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy)]
pub struct ReindexOptions {
    /// Records requested per CMS page
    pub batch_size: u32,
    /// Deadline for the whole paged scan
    pub scan_timeout: Duration,
}

impl Default for ReindexOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

/// Progress of one paged scan
#[derive(Debug, Default)]
struct Scan {
    offset: u64,
    total: Option<u64>,
    pages: u32,
    fetched: u64,
    skipped: u64,
    seen: HashSet<String>,
    documents: Vec<SearchableDocument>,
}

impl Scan {
    fn accept(&mut self, document: SearchableDocument) {
        if self.seen.insert(document.id.clone()) {
            self.documents.push(document);
        } else {
            // Offset drift under concurrent inserts can repeat a record
            self.skipped += 1;
        }
    }
}

pub struct ReindexOrchestrator {
    source: Arc<dyn MetadataSource>,
    backend: Arc<dyn SearchBackend>,
    options: ReindexOptions,
    running: Mutex<()>,
}

impl ReindexOrchestrator {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        backend: Arc<dyn SearchBackend>,
        options: ReindexOptions,
    ) -> Self {
        Self {
            source,
            backend,
            options: ReindexOptions {
                batch_size: options.batch_size.max(1),
                ..options
            },
            running: Mutex::new(()),
        }
    }

    /// Rebuild the index. Fails fast with `ReindexInProgress` when another
    /// rebuild is still running.
    pub async fn run(&self) -> Result<ReindexReport, DiscoveryError> {
        let _running = self
            .running
            .try_lock()
            .map_err(|_| DiscoveryError::ReindexInProgress)?;

        let started = Instant::now();
        tracing::info!(
            backend = self.backend.name(),
            batch_size = self.options.batch_size,
            "reindex started"
        );

        let mut scan = Scan::default();
        let scanned = tokio::time::timeout(self.options.scan_timeout, self.scan(&mut scan)).await;

        match scanned {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!(offset = scan.offset, pages = scan.pages, error = %e, "reindex aborted, index left unchanged");
                return Err(e);
            }
            Err(_) => {
                tracing::error!(
                    offset = scan.offset,
                    pages = scan.pages,
                    timeout_secs = self.options.scan_timeout.as_secs(),
                    "reindex scan timed out, index left unchanged"
                );
                return Err(DiscoveryError::ReindexTimedOut {
                    offset: scan.offset,
                    timeout_secs: self.options.scan_timeout.as_secs(),
                });
            }
        }

        self.backend
            .bulk_replace(&scan.documents)
            .await
            .map_err(|e| DiscoveryError::backend(self.backend.name(), "bulk_replace", e))?;

        let report = ReindexReport {
            fetched: scan.fetched,
            indexed: scan.documents.len() as u64,
            skipped: scan.skipped,
            pages: scan.pages,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };

        tracing::info!(
            fetched = report.fetched,
            indexed = report.indexed,
            skipped = report.skipped,
            pages = report.pages,
            duration_ms = report.duration_ms,
            "reindex completed"
        );
        Ok(report)
    }

    async fn scan(&self, scan: &mut Scan) -> Result<(), DiscoveryError> {
        let batch_size = self.options.batch_size;

        loop {
            let offset = scan.offset;
            let page = self
                .source
                .list_media(batch_size, offset)
                .await
                .map_err(|source| DiscoveryError::ReindexAborted { offset, source })?;

            scan.pages += 1;
            let total = *scan.total.get_or_insert(page.total);
            let received = page.items.len() as u64;
            scan.fetched += received;

            for record in &page.items {
                match SearchableDocument::from_record(record) {
                    Some(document) => scan.accept(document),
                    None => scan.skipped += 1,
                }
            }

            scan.offset += received;
            tracing::debug!(page = scan.pages, offset, received, total, "fetched media page");

            if received < u64::from(batch_size) || scan.offset >= total {
                return Ok(());
            }
        }
    }
}
