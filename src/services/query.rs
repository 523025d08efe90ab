// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Translation of validated search and suggestion requests into the query
//! each backend understands.
//!
//! * PostgreSQL: parameterised full-text SQL built with [`sqlx::QueryBuilder`].
//! * Meilisearch: an [`EngineQuery`] that the adapter applies to the SDK's
//!   search builder.
//!
//! Both translations clamp page sizes, so a backend never does more work than
//! `MAX_SEARCH_LIMIT` / `MAX_SUGGEST_LIMIT` allow regardless of what the
//! caller asked for.

use crate::models::media::MediaType;
use crate::models::search::{SearchParams, SuggestParams, MAX_SEARCH_LIMIT, MAX_SUGGEST_LIMIT};
use sqlx::{Postgres, QueryBuilder};

/// Text search configuration used for `to_tsvector` / `plainto_tsquery`
pub const TEXT_SEARCH_CONFIG: &str = "english";

/// Score reported when a backend has no native relevance value for a hit
pub const NEUTRAL_SCORE: f64 = 1.0;

/// Hits requested per wanted suggestion, so de-duplication by title can
/// still fill the list
pub const SUGGEST_OVERFETCH: usize = 5;

/// Columns selected for every document read from `search_index`
pub const DOCUMENT_COLUMNS: &str = "id, title, description, content, media_type, status, \
     duration, file_size, format, created_at, updated_at";

/// Page size a backend will actually serve
pub fn clamp_search_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SEARCH_LIMIT)
}

pub fn clamp_suggest_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_SUGGEST_LIMIT)
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Full-text query over the `search_index` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    /// `None` matches every row
    pub terms: Option<String>,
    pub media_type: Option<MediaType>,
    pub limit: i64,
    pub offset: i64,
}

impl TextQuery {
    pub fn from_params(params: &SearchParams) -> Self {
        let terms = Some(params.query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        Self {
            terms,
            media_type: params.media_type,
            limit: i64::from(clamp_search_limit(params.limit)),
            offset: i64::try_from(params.offset).unwrap_or(i64::MAX),
        }
    }

    /// Ranked page of matching documents
    pub fn page_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::new(format!("SELECT {DOCUMENT_COLUMNS}, "));

        match &self.terms {
            Some(terms) => {
                builder
                    .push(format!(
                        "ts_rank(to_tsvector('{TEXT_SEARCH_CONFIG}', content), \
                         plainto_tsquery('{TEXT_SEARCH_CONFIG}', "
                    ))
                    .push_bind(terms.as_str())
                    .push("))::float8 AS rank");
            }
            None => {
                builder.push("NULL::float8 AS rank");
            }
        }

        builder.push(" FROM search_index");
        self.push_predicate(&mut builder);

        if self.terms.is_some() {
            builder.push(" ORDER BY rank DESC, created_at DESC");
        } else {
            builder.push(" ORDER BY created_at DESC");
        }

        builder.push(" LIMIT ").push_bind(self.limit);
        builder.push(" OFFSET ").push_bind(self.offset);
        builder
    }

    /// Count over the same predicate as [`Self::page_query`], without ranking
    pub fn count_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM search_index");
        self.push_predicate(&mut builder);
        builder
    }

    fn push_predicate<'a>(&'a self, builder: &mut QueryBuilder<'a, Postgres>) {
        builder.push(" WHERE TRUE");

        if let Some(terms) = &self.terms {
            builder
                .push(format!(
                    " AND to_tsvector('{TEXT_SEARCH_CONFIG}', content) @@ \
                     plainto_tsquery('{TEXT_SEARCH_CONFIG}', "
                ))
                .push_bind(terms.as_str())
                .push(")");
        }

        if let Some(media_type) = self.media_type {
            builder
                .push(" AND media_type = ")
                .push_bind(media_type.as_str());
        }
    }
}

/// Case-insensitive substring match on titles, grouped by title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleSuggestQuery {
    pub pattern: String,
    pub limit: i64,
}

impl TitleSuggestQuery {
    pub fn from_params(params: &SuggestParams) -> Self {
        Self {
            pattern: format!("%{}%", escape_like(params.query.trim())),
            limit: i64::from(clamp_suggest_limit(params.limit)),
        }
    }

    pub fn query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::new(
            "SELECT title, COUNT(*) AS count FROM search_index WHERE title ILIKE ",
        );
        builder
            .push_bind(self.pattern.as_str())
            .push(" GROUP BY title ORDER BY count DESC, title ASC LIMIT ")
            .push_bind(self.limit);
        builder
    }
}

/// Escape `LIKE` wildcards so user input only ever matches literally
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Meilisearch
// ---------------------------------------------------------------------------

/// Attributes a suggestion query is restricted to
pub const SUGGEST_ATTRIBUTES: &[&str] = &["title"];

/// Search request for the search engine, independent of the SDK builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineQuery {
    pub text: String,
    /// Filter expression, e.g. `type = "video"`
    pub filter: Option<String>,
    pub limit: usize,
    pub offset: usize,
    /// Restrict matching to these attributes; `None` searches all searchable ones
    pub attributes: Option<&'static [&'static str]>,
    /// Require every query word to match
    pub match_all_words: bool,
    /// Fetch through page mode, which reports an exhaustive hit count
    pub paged: bool,
}

/// Page-mode request covering `offset..offset + limit` of an [`EngineQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number
    pub page: usize,
    pub hits_per_page: usize,
    /// Hits to drop from the front of the returned page
    pub skip: usize,
}

impl EngineQuery {
    /// Multi-field relevance search over title, description and content
    pub fn search(params: &SearchParams) -> Self {
        Self {
            text: params.query.trim().to_string(),
            filter: params.media_type.map(type_filter),
            limit: clamp_search_limit(params.limit) as usize,
            offset: usize::try_from(params.offset).unwrap_or(usize::MAX),
            attributes: None,
            match_all_words: false,
            paged: true,
        }
    }

    /// Prefix match on titles. Over-fetches so duplicates can be dropped.
    pub fn suggest(params: &SuggestParams) -> Self {
        let wanted = clamp_suggest_limit(params.limit) as usize;
        Self {
            text: params.query.trim().to_string(),
            filter: None,
            limit: (wanted * SUGGEST_OVERFETCH).min(MAX_SEARCH_LIMIT as usize * 2),
            offset: 0,
            attributes: Some(SUGGEST_ATTRIBUTES),
            match_all_words: true,
            paged: false,
        }
    }

    /// Pages only start at multiples of their size, so an unaligned offset
    /// widens the first page and skips locally
    pub fn page_window(&self) -> PageWindow {
        let limit = self.limit.max(1);
        if self.offset % limit == 0 {
            PageWindow {
                page: self.offset / limit + 1,
                hits_per_page: limit,
                skip: 0,
            }
        } else {
            PageWindow {
                page: 1,
                hits_per_page: self.offset.saturating_add(limit),
                skip: self.offset,
            }
        }
    }
}

/// Exact-match filter on the document type
pub fn type_filter(media_type: MediaType) -> String {
    format!("type = \"{}\"", media_type.as_str())
}
