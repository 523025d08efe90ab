// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! PostgreSQL full-text search backend.
//!
//! Documents live in the `search_index` table (see `migrations/`). The
//! `content` column is generated from title and description, so every write
//! recomputes the searchable text without the adapter having to send it.

use crate::error::BackendError;
use crate::models::media::{MediaStatus, MediaType};
use crate::models::search::{
    SearchHit, SearchPage, SearchParams, SearchableDocument, SuggestParams, Suggestion,
};
use crate::services::backend::SearchBackend;
use crate::services::query::{TextQuery, TitleSuggestQuery, NEUTRAL_SCORE};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{FromRow, QueryBuilder};
use std::time::Duration;

/// Rows per multi-row INSERT during a bulk replace. Ten binds per row keeps
/// each statement well under the PostgreSQL bind parameter limit.
const BULK_INSERT_CHUNK: usize = 500;

const BACKEND_NAME: &str = "postgres";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    title: String,
    description: String,
    content: String,
    media_type: String,
    status: String,
    duration: i32,
    file_size: i64,
    format: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RankedRow {
    #[sqlx(flatten)]
    document: DocumentRow,
    rank: Option<f64>,
}

impl TryFrom<DocumentRow> for SearchableDocument {
    type Error = BackendError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let media_type =
            MediaType::parse(&row.media_type).ok_or_else(|| BackendError::InvalidDocument {
                id: row.id.clone(),
                reason: format!("unknown media type '{}'", row.media_type),
            })?;

        Ok(SearchableDocument {
            id: row.id,
            title: row.title,
            description: row.description,
            content: row.content,
            media_type,
            status: MediaStatus::parse(&row.status),
            duration: row.duration,
            file_size: row.file_size,
            format: row.format,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Search backend over PostgreSQL text search
#[derive(Clone)]
pub struct PostgresSearchBackend {
    pool: PgPool,
}

impl PostgresSearchBackend {
    /// Open a connection pool to `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, BackendError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchBackend for PostgresSearchBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn search(&self, params: &SearchParams) -> Result<SearchPage, BackendError> {
        let query = TextQuery::from_params(params);

        let total: i64 = query
            .count_query()
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<RankedRow> = query
            .page_query()
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        let hits = rows
            .into_iter()
            .map(|row| {
                Ok(SearchHit {
                    score: row.rank.unwrap_or(NEUTRAL_SCORE),
                    document: SearchableDocument::try_from(row.document)?,
                })
            })
            .collect::<Result<Vec<_>, BackendError>>()?;

        Ok(SearchPage {
            hits,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    async fn suggest(&self, params: &SuggestParams) -> Result<Vec<Suggestion>, BackendError> {
        let query = TitleSuggestQuery::from_params(params);

        let rows: Vec<(String, i64)> = query
            .query()
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(text, count)| Suggestion {
                text,
                count: u64::try_from(count).unwrap_or(0),
            })
            .collect())
    }

    async fn upsert(&self, document: &SearchableDocument) -> Result<(), BackendError> {
        sqlx::query(
            "INSERT INTO search_index
                 (id, title, description, media_type, status, duration, file_size, format,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO UPDATE SET
                 title = EXCLUDED.title,
                 description = EXCLUDED.description,
                 media_type = EXCLUDED.media_type,
                 status = EXCLUDED.status,
                 duration = EXCLUDED.duration,
                 file_size = EXCLUDED.file_size,
                 format = EXCLUDED.format,
                 created_at = EXCLUDED.created_at,
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(document.id.as_str())
        .bind(document.title.as_str())
        .bind(document.description.as_str())
        .bind(document.media_type.as_str())
        .bind(document.status.as_str())
        .bind(document.duration)
        .bind(document.file_size)
        .bind(document.format.as_str())
        .bind(document.created_at)
        .bind(document.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        let result = sqlx::query("DELETE FROM search_index WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(id, rows = result.rows_affected(), "deleted from search_index");
        Ok(())
    }

    async fn bulk_replace(&self, documents: &[SearchableDocument]) -> Result<(), BackendError> {
        // Dropping the transaction on any error rolls the whole replace back
        let mut tx = self.pool.begin().await?;

        sqlx::query("TRUNCATE search_index").execute(&mut *tx).await?;

        for chunk in documents.chunks(BULK_INSERT_CHUNK) {
            let mut builder = QueryBuilder::new(
                "INSERT INTO search_index (id, title, description, media_type, status, \
                 duration, file_size, format, created_at, updated_at) ",
            );
            builder.push_values(chunk, |mut row, doc| {
                row.push_bind(doc.id.as_str())
                    .push_bind(doc.title.as_str())
                    .push_bind(doc.description.as_str())
                    .push_bind(doc.media_type.as_str())
                    .push_bind(doc.status.as_str())
                    .push_bind(doc.duration)
                    .push_bind(doc.file_size)
                    .push_bind(doc.format.as_str())
                    .push_bind(doc.created_at)
                    .push_bind(doc.updated_at);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(documents = documents.len(), "replaced search_index contents");
        Ok(())
    }

    async fn document_count(&self) -> Result<u64, BackendError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_index")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn prepare(&self) -> Result<(), BackendError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("search_index migrations applied");
        Ok(())
    }

    async fn shutdown(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}
