//! Hosted metadata API fetcher (YouTube Data API v3 shaped).

use crate::error::{FetchError, Result};
use crate::fetcher::Fetcher;
use crate::record::{FetchedResource, MetadataRecord, parse_count};
use crate::resource::ResourceId;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

// Counters are decimal strings on the wire, occasionally numbers.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<Value>,
    like_count: Option<Value>,
    dislike_count: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

fn counter(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::String(s)) => parse_count(s),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

pub struct ApiFetcher {
    client: Client,
    api_url: String,
    base_url: Url,
    api_key: String,
    max_related: usize,
}

impl ApiFetcher {
    /// `api_url` is the API root (e.g. `https://www.googleapis.com/youtube/v3`),
    /// `base_url` the site used to build watch URLs for related videos.
    pub fn new(api_url: &Url, base_url: Url, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_url, base_url, api_key, 10)
    }

    pub fn with_timeout(
        api_url: &Url,
        base_url: Url,
        api_key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("relcrawl/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.as_str().trim_end_matches('/').to_string(),
            base_url,
            api_key: api_key.into(),
            max_related: 25,
        })
    }

    /// Upper bound on related ids requested per lookup.
    pub fn with_max_related(mut self, max_related: usize) -> Self {
        self.max_related = max_related.clamp(1, 50);
        self
    }

    async fn lookup_video(
        &self,
        id: &ResourceId,
        video_id: &str,
    ) -> std::result::Result<MetadataRecord, FetchError> {
        debug!("Looking up metadata for video {}", video_id);
        let response: VideoListResponse = self
            .client
            .get(format!("{}/videos", self.api_url))
            .query(&[
                ("part", "snippet,statistics"),
                ("id", video_id),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let item = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(format!("no video with id {}", video_id)))?;

        let stats = &item.statistics;
        Ok(MetadataRecord::new(id.clone(), item.snippet.title.trim()).with_counts(
            counter(stats.view_count.as_ref()),
            counter(stats.like_count.as_ref()),
            stats.dislike_count.as_ref().map(|v| counter(Some(v))),
        ))
    }

    async fn lookup_related(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<ResourceId>, FetchError> {
        let max_results = self.max_related.to_string();
        let response: SearchListResponse = self
            .client
            .get(format!("{}/search", self.api_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("relatedToVideoId", video_id),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .filter_map(|related| ResourceId::watch_url(&self.base_url, &related))
            .collect())
    }
}

#[async_trait]
impl Fetcher for ApiFetcher {
    async fn fetch(&self, id: &ResourceId) -> std::result::Result<FetchedResource, FetchError> {
        let video_id = id.video_id();
        let record = self.lookup_video(id, &video_id).await?;

        let related = match self.lookup_related(&video_id).await {
            Ok(related) => related,
            Err(e) => {
                warn!("Related lookup failed for {}: {}", video_id, e);
                Vec::new()
            }
        };

        Ok(FetchedResource::new(record, related))
    }

    fn canonical(&self, id: &ResourceId) -> ResourceId {
        id.rebase(&self.base_url)
    }
}
