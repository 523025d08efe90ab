// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Client for the CMS media listing, the source of truth for reindexing.

use crate::error::MetadataError;
use crate::models::media::MediaPage;
use crate::services::logging::truncate_for_log;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Paged read access to the authoritative media records
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch up to `limit` records starting at `offset`
    async fn list_media(&self, limit: u32, offset: u64) -> Result<MediaPage, MetadataError>;
}

/// HTTP client for `GET {base}/api/v1/media?limit=&offset=`
#[derive(Clone)]
pub struct CmsClient {
    http: reqwest::Client,
    media_url: Url,
}

impl CmsClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, MetadataError> {
        let media_url = Url::parse(base_url)?.join("api/v1/media")?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("media-discovery/", env!("DISCOVERY_VERSION")))
            .build()?;

        Ok(Self { http, media_url })
    }

    /// Listing URL for one page
    pub fn page_url(&self, limit: u32, offset: u64) -> Url {
        let mut url = self.media_url.clone();
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        url
    }
}

#[async_trait]
impl MetadataSource for CmsClient {
    async fn list_media(&self, limit: u32, offset: u64) -> Result<MediaPage, MetadataError> {
        let url = self.page_url(limit, offset);
        tracing::debug!(%url, "fetching media page");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| MetadataError::Decode(format!("{e} in {}", truncate_for_log(&body))))
    }
}
