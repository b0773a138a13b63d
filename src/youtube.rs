//! Blocking client for the two YouTube Data API v3 endpoints the tag tools
//! rely on: `search` (ids for a query) and `videos` (snippet + statistics for
//! a batch of ids).

use std::{fmt, str::FromStr};

use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{Error, Result, UnknownSearchOrder};

/// Largest `maxResults` / id batch the API accepts in one call.
pub const MAX_BATCH: usize = 50;

pub const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

const USER_AGENT: &str = concat!("tubetags/", env!("CARGO_PKG_VERSION"));

/// Sort criterion understood by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchOrder {
    #[default]
    Relevance,
    Date,
    Rating,
    Title,
    ViewCount,
    VideoCount,
}

impl SearchOrder {
    pub const ALL: [SearchOrder; 6] = [
        SearchOrder::Relevance,
        SearchOrder::Date,
        SearchOrder::Rating,
        SearchOrder::Title,
        SearchOrder::ViewCount,
        SearchOrder::VideoCount,
    ];

    /// Value sent as the `order` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchOrder::Relevance => "relevance",
            SearchOrder::Date => "date",
            SearchOrder::Rating => "rating",
            SearchOrder::Title => "title",
            SearchOrder::ViewCount => "viewCount",
            SearchOrder::VideoCount => "videoCount",
        }
    }
}

impl fmt::Display for SearchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchOrder {
    type Err = UnknownSearchOrder;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        SearchOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == value)
            .ok_or_else(|| UnknownSearchOrder(value.to_string()))
    }
}

/// Per-video metadata extracted from a `videos` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoRecord {
    pub id: Option<String>,
    pub title: Option<String>,
    pub channel_title: Option<String>,
    pub view_count: u64,
    pub tags: Vec<String>,
}

impl VideoRecord {
    pub fn watch_url(&self) -> Option<String> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("{WATCH_URL_PREFIX}{id}"))
    }
}

/// The two calls every query cycle is made of. [`YouTubeClient`] talks to the
/// real API; tests substitute an in-memory implementation.
pub trait VideoApi {
    fn search(&self, query: &str, max_results: usize, order: SearchOrder) -> Result<Vec<String>>;

    fn fetch_details(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<SearchItemId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: Option<String>,
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: Option<String>,
    channel_title: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Counts arrive as decimal strings; kept as raw JSON so a malformed value
/// degrades to zero instead of failing the whole batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<Value>,
}

impl SearchResponse {
    fn into_video_ids(self) -> Vec<String> {
        self.items
            .into_iter()
            .filter_map(|item| item.id.and_then(|id| id.video_id))
            .collect()
    }
}

impl From<VideoItem> for VideoRecord {
    fn from(item: VideoItem) -> Self {
        let (title, channel_title, tags) = match item.snippet {
            Some(snippet) => (
                snippet.title,
                snippet.channel_title,
                snippet.tags.unwrap_or_default(),
            ),
            None => (None, None, Vec::new()),
        };
        let view_count = item
            .statistics
            .and_then(|stats| stats.view_count)
            .map(|value| parse_count(&value))
            .unwrap_or(0);

        VideoRecord {
            id: item.id,
            title,
            channel_title,
            view_count,
            tags,
        }
    }
}

fn parse_count(value: &Value) -> u64 {
    match value {
        Value::String(text) => text.trim().parse().unwrap_or(0),
        Value::Number(number) => number.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// YouTube Data API client backed by a blocking `ureq` agent.
///
/// The key is optional so a server can start unconfigured and report the
/// problem per request; every call checks it before touching the network.
#[derive(Clone)]
pub struct YouTubeClient {
    agent: ureq::Agent,
    api_key: Option<String>,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(config: ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_key: config.api_key.filter(|key| !key.trim().is_empty()),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }

    fn call(endpoint: &'static str, request: ureq::Request) -> Result<ureq::Response> {
        match request.call() {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, _)) => Err(Error::Upstream { endpoint, status }),
            Err(ureq::Error::Transport(transport)) => Err(Error::Transport(transport)),
        }
    }
}

impl VideoApi for YouTubeClient {
    fn search(&self, query: &str, max_results: usize, order: SearchOrder) -> Result<Vec<String>> {
        let key = self.api_key()?;
        let max_results = max_results.min(MAX_BATCH);

        // The key is only ever added as a query pair so it stays out of logs.
        debug!("YouTube search: q={query:?} maxResults={max_results} order={order}");
        let request = self
            .agent
            .get(&self.endpoint("search"))
            .query("part", "snippet")
            .query("q", query)
            .query("type", "video")
            .query("maxResults", &max_results.to_string())
            .query("order", order.as_str())
            .query("key", key);

        let body: SearchResponse = Self::call("search", request)?
            .into_json()
            .map_err(Error::Decode)?;
        Ok(body.into_video_ids())
    }

    fn fetch_details(&self, video_ids: &[String]) -> Result<Vec<VideoRecord>> {
        let key = self.api_key()?;
        if video_ids.is_empty() {
            return Ok(Vec::new());
        }

        let batch = if video_ids.len() > MAX_BATCH {
            warn!(
                "dropping {} video id(s) beyond the batch limit of {MAX_BATCH}",
                video_ids.len() - MAX_BATCH
            );
            &video_ids[..MAX_BATCH]
        } else {
            video_ids
        };

        debug!("YouTube videos: {} id(s)", batch.len());
        let request = self
            .agent
            .get(&self.endpoint("videos"))
            .query("part", "snippet,statistics")
            .query("id", &batch.join(","))
            .query("maxResults", &MAX_BATCH.to_string())
            .query("key", key);

        let body: VideosResponse = Self::call("videos", request)?
            .into_json()
            .map_err(Error::Decode)?;
        Ok(body.items.into_iter().map(VideoRecord::from).collect())
    }
}
