// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Meilisearch search backend.
//!
//! Title weighs more than description and content because of the order of
//! the searchable attributes. Ties in relevance fall back to newest first
//! through the `created_ts:desc` ranking rule.

use crate::error::BackendError;
use crate::models::search::{
    SearchHit, SearchPage, SearchParams, SearchableDocument, SuggestParams, Suggestion,
};
use crate::services::backend::SearchBackend;
use crate::services::query::{clamp_suggest_limit, EngineQuery, NEUTRAL_SCORE};
use async_trait::async_trait;
use meilisearch_sdk::client::Client;
use meilisearch_sdk::indexes::Index;
use meilisearch_sdk::search::{MatchingStrategies, SearchResults};
use meilisearch_sdk::settings::{PaginationSetting, Settings};
use meilisearch_sdk::task_info::TaskInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const BACKEND_NAME: &str = "meilisearch";

/// Searchable attributes, highest weight first
const SEARCHABLE_ATTRIBUTES: [&str; 3] = ["title", "description", "content"];
const FILTERABLE_ATTRIBUTES: [&str; 2] = ["type", "status"];
const SORTABLE_ATTRIBUTES: [&str; 1] = ["created_ts"];
const RANKING_RULES: [&str; 7] = [
    "words",
    "typo",
    "proximity",
    "attribute",
    "sort",
    "exactness",
    "created_ts:desc",
];

/// Upper bound on hits the engine counts and pages through
const MAX_TOTAL_HITS: usize = 100_000;

/// Interval between task status polls
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Connection settings for the Meilisearch backend
#[derive(Debug, Clone)]
pub struct MeilisearchConfig {
    /// `host:port` or a full URL
    pub host: String,
    pub api_key: Option<String>,
    pub index_name: String,
    /// How long to wait for an indexing task to finish
    pub task_timeout: Duration,
}

impl MeilisearchConfig {
    fn url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.clone()
        } else {
            format!("http://{}", self.host)
        }
    }
}

/// Document as stored in the engine. `created_ts` backs the recency tie-break
/// since ranking rules only sort on numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngineDocument {
    #[serde(flatten)]
    document: SearchableDocument,
    created_ts: i64,
}

impl From<&SearchableDocument> for EngineDocument {
    fn from(document: &SearchableDocument) -> Self {
        Self {
            created_ts: document.created_at.timestamp(),
            document: document.clone(),
        }
    }
}

/// Classify a failure while waiting on an enqueued clear. A clear the engine
/// rejected leaves the index intact. Any other failure leaves the outcome unknown.
fn clear_failure(error: BackendError) -> BackendError {
    match error {
        BackendError::TaskFailed { .. } => error,
        other => BackendError::PartialReplace {
            source: Box::new(other),
        },
    }
}

/// Search backend backed by a Meilisearch index
pub struct MeilisearchBackend {
    client: Client,
    config: MeilisearchConfig,
}

impl MeilisearchBackend {
    pub fn new(config: MeilisearchConfig) -> Result<Self, BackendError> {
        let url = config.url();
        let client = Client::new(&url, config.api_key.clone())?;

        tracing::info!(url = %url, index = %config.index_name, "Meilisearch client created");
        Ok(Self { client, config })
    }

    fn index(&self) -> Index {
        self.client.index(&self.config.index_name)
    }

    /// Block until the engine has applied `task`
    async fn wait(&self, task: TaskInfo) -> Result<(), BackendError> {
        let task = task
            .wait_for_completion(
                &self.client,
                Some(TASK_POLL_INTERVAL),
                Some(self.config.task_timeout),
            )
            .await?;

        if task.is_failure() {
            let task_uid = task.get_uid();
            return Err(BackendError::TaskFailed {
                task_uid,
                message: task.unwrap_failure().to_string(),
            });
        }
        Ok(())
    }

    async fn execute(&self, query: &EngineQuery) -> Result<SearchResults<EngineDocument>, BackendError> {
        let index = self.index();
        let mut search = index.search();
        search.with_query(&query.text).with_show_ranking_score(true);

        if query.paged {
            let window = query.page_window();
            search.with_page(window.page).with_hits_per_page(window.hits_per_page);
        } else {
            search.with_limit(query.limit).with_offset(query.offset);
        }

        if let Some(filter) = &query.filter {
            search.with_filter(filter);
        }
        if let Some(attributes) = query.attributes {
            search.with_attributes_to_search_on(attributes);
        }
        if query.match_all_words {
            search.with_matching_strategy(MatchingStrategies::ALL);
        }

        Ok(search.execute::<EngineDocument>().await?)
    }
}

#[async_trait]
impl SearchBackend for MeilisearchBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchPage, BackendError> {
        let query = EngineQuery::search(params);
        let results = self.execute(&query).await?;

        // Page mode counts every match up to MAX_TOTAL_HITS
        let total = results
            .total_hits
            .or(results.estimated_total_hits)
            .unwrap_or(results.hits.len()) as u64;

        let hits = results
            .hits
            .into_iter()
            .skip(query.page_window().skip)
            .take(query.limit)
            .map(|hit| SearchHit {
                score: hit.ranking_score.unwrap_or(NEUTRAL_SCORE),
                document: hit.result.document,
            })
            .collect();

        Ok(SearchPage { hits, total })
    }

    async fn suggest(&self, params: &SuggestParams) -> Result<Vec<Suggestion>, BackendError> {
        let wanted = clamp_suggest_limit(params.limit) as usize;
        let results = self.execute(&EngineQuery::suggest(params)).await?;

        let mut seen = HashSet::new();
        Ok(results
            .hits
            .into_iter()
            .map(|hit| hit.result.document.title)
            .filter(|title| seen.insert(title.clone()))
            .take(wanted)
            .map(|text| Suggestion { text, count: 1 })
            .collect())
    }

    async fn upsert(&self, document: &SearchableDocument) -> Result<(), BackendError> {
        let task = self
            .index()
            .add_or_replace(&[EngineDocument::from(document)], Some("id"))
            .await?;
        self.wait(task).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        // Deleting an unknown id is a successful no-op task
        let task = self.index().delete_document(id).await?;
        self.wait(task).await
    }

    async fn bulk_replace(&self, documents: &[SearchableDocument]) -> Result<(), BackendError> {
        let index = self.index();

        // Once the clear is enqueued the engine may apply it whatever happens here
        let task = index.delete_all_documents().await?;
        self.wait(task).await.map_err(|e| {
            let e = clear_failure(e);
            if matches!(e, BackendError::PartialReplace { .. }) {
                tracing::error!(
                    index = %self.config.index_name,
                    error = %e,
                    "index clear did not settle; contents may already be gone"
                );
            }
            e
        })?;

        if documents.is_empty() {
            return Ok(());
        }

        let batch: Vec<EngineDocument> = documents.iter().map(EngineDocument::from).collect();
        let written = match index.add_or_replace(&batch, Some("id")).await {
            Ok(task) => self.wait(task).await,
            Err(e) => Err(e.into()),
        };

        written.map_err(|e| {
            tracing::error!(
                index = %self.config.index_name,
                documents = documents.len(),
                error = %e,
                "index cleared but replacement documents were not written"
            );
            BackendError::PartialReplace {
                source: Box::new(e),
            }
        })?;

        tracing::info!(documents = documents.len(), "replaced Meilisearch index contents");
        Ok(())
    }

    async fn document_count(&self) -> Result<u64, BackendError> {
        let stats = self.index().get_stats().await?;
        Ok(stats.number_of_documents as u64)
    }

    async fn prepare(&self) -> Result<(), BackendError> {
        if self.client.get_index(&self.config.index_name).await.is_err() {
            let task = self
                .client
                .create_index(&self.config.index_name, Some("id"))
                .await?;
            self.wait(task).await?;
        }

        let settings = Settings::new()
            .with_searchable_attributes(SEARCHABLE_ATTRIBUTES)
            .with_filterable_attributes(FILTERABLE_ATTRIBUTES)
            .with_sortable_attributes(SORTABLE_ATTRIBUTES)
            .with_ranking_rules(RANKING_RULES)
            .with_pagination(PaginationSetting {
                max_total_hits: MAX_TOTAL_HITS,
            });

        let task = self.index().set_settings(&settings).await?;
        self.wait(task).await?;

        tracing::info!(index = %self.config.index_name, "Meilisearch index settings applied");
        Ok(())
    }
}
