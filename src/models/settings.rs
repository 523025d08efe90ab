// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Runtime settings, read from command-line flags with environment fallbacks.

use clap::{Args, ValueEnum};
use std::net::SocketAddr;
use std::time::Duration;

/// Which store backs the search index
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchBackendKind {
    /// PostgreSQL full-text search over the `search_index` table
    Postgres,
    /// Dedicated Meilisearch index
    Meilisearch,
}

impl SearchBackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackendKind::Postgres => "postgres",
            SearchBackendKind::Meilisearch => "meilisearch",
        }
    }
}

impl std::fmt::Display for SearchBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Address the HTTP API binds to
    #[arg(long, env = "DISCOVERY_BIND_ADDR", default_value = "0.0.0.0:8081")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "SEARCH_BACKEND", value_enum, default_value_t = SearchBackendKind::Postgres)]
    pub search_backend: SearchBackendKind,

    /// PostgreSQL connection string, required for the postgres backend
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    /// Meilisearch host, required for the meilisearch backend
    #[arg(long, env = "MEILISEARCH_HOST")]
    pub meilisearch_host: Option<String>,

    #[arg(long, env = "MEILISEARCH_API_KEY", hide_env_values = true)]
    pub meilisearch_api_key: Option<String>,

    #[arg(long, env = "MEILISEARCH_INDEX", default_value = "media")]
    pub meilisearch_index: String,

    /// How long to wait for a Meilisearch task to finish
    #[arg(long, env = "MEILISEARCH_TASK_TIMEOUT_SECS", default_value_t = 30)]
    pub meilisearch_task_timeout_secs: u64,

    /// Base URL of the CMS service that owns the media metadata
    #[arg(long, env = "CMS_BASE_URL", default_value = "http://localhost:8080")]
    pub cms_base_url: String,

    #[arg(long, env = "CMS_TIMEOUT_SECS", default_value_t = 30)]
    pub cms_timeout_secs: u64,

    /// Records requested per CMS page during a reindex
    #[arg(long, env = "REINDEX_BATCH_SIZE", default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=1000))]
    pub reindex_batch_size: u32,

    /// Deadline for the paged scan of a reindex
    #[arg(long, env = "REINDEX_TIMEOUT_SECS", default_value_t = 600)]
    pub reindex_timeout_secs: u64,

    /// Capacity of the in-process media event queue
    #[arg(long, env = "EVENT_QUEUE_CAPACITY", default_value_t = 1024)]
    pub event_queue_capacity: usize,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Settings {
    pub fn meilisearch_task_timeout(&self) -> Duration {
        Duration::from_secs(self.meilisearch_task_timeout_secs)
    }

    pub fn cms_timeout(&self) -> Duration {
        Duration::from_secs(self.cms_timeout_secs)
    }

    pub fn reindex_timeout(&self) -> Duration {
        Duration::from_secs(self.reindex_timeout_secs)
    }
}
