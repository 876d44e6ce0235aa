//! Video search against the YouTube Data API, paged by continuation token.

pub mod download;

use std::thread;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::{FeatureError, Result};

/// The API never returns more than this many items per page.
pub const MAX_PAGE_SIZE: usize = 50;
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page_size: usize,
    pub page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// One page of search results per call.
pub trait SearchBackend {
    fn fetch_page(&self, request: &PageRequest) -> Result<SearchPage>;
}

/// Gather up to `max_results` watch links for `query`, following
/// continuation tokens until enough links arrive or the results run out.
pub fn collect_video_links<B>(backend: &B, query: &str, max_results: usize) -> Result<Vec<String>>
where
    B: SearchBackend + ?Sized,
{
    let mut links = Vec::new();
    let mut page_token = None;
    while links.len() < max_results {
        let request = PageRequest {
            query: query.to_string(),
            page_size: max_results.min(MAX_PAGE_SIZE),
            page_token: page_token.take(),
        };
        let page = backend.fetch_page(&request)?;
        debug!(items = page.video_ids.len(), "received search page");
        let remaining = max_results - links.len();
        links.extend(
            page.video_ids
                .iter()
                .take(remaining)
                .map(|id| format!("{}{}", WATCH_URL, id)),
        );
        match page.next_page_token {
            Some(token) if !page.video_ids.is_empty() => page_token = Some(token),
            _ => break,
        }
    }
    info!(query, links = links.len(), "collected video links");
    Ok(links)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

impl From<SearchResponse> for SearchPage {
    fn from(response: SearchResponse) -> Self {
        Self {
            video_ids: response
                .items
                .into_iter()
                .filter_map(|item| item.id.video_id)
                .collect(),
            next_page_token: response.next_page_token,
        }
    }
}

/// `SearchBackend` over HTTP, restricted to short videos.
pub struct YouTubeSearch {
    client: Client,
    config: SearchConfig,
}

impl YouTubeSearch {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| FeatureError::Search(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self { client, config })
    }

    fn send(&self, request: &PageRequest) -> std::result::Result<SearchPage, Attempt> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", request.query.clone()),
            ("type", "video".to_string()),
            ("videoDuration", "short".to_string()),
            ("maxResults", request.page_size.to_string()),
            ("key", self.config.api_key.clone()),
        ];
        if let Some(token) = &request.page_token {
            params.push(("pageToken", token.clone()));
        }

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .map_err(|err| Attempt::Retry(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<SearchResponse>()
                .map(SearchPage::from)
                .map_err(|err| Attempt::Fatal(format!("malformed search response: {}", err)));
        }
        let body = response.text().unwrap_or_default();
        let message = format!("search API returned {}: {}", status, body.trim());
        if is_retryable(status) {
            Err(Attempt::Retry(message))
        } else {
            Err(Attempt::Fatal(message))
        }
    }
}

enum Attempt {
    Retry(String),
    Fatal(String),
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

impl SearchBackend for YouTubeSearch {
    fn fetch_page(&self, request: &PageRequest) -> Result<SearchPage> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match self.send(request) {
                Ok(page) => return Ok(page),
                Err(Attempt::Fatal(message)) => return Err(FeatureError::Search(message)),
                Err(Attempt::Retry(message)) => {
                    warn!(attempt, error = %message, "search request failed");
                    last_error = message;
                    if attempt < attempts {
                        thread::sleep(self.config.retry_backoff * attempt);
                    }
                }
            }
        }
        Err(FeatureError::Search(format!(
            "giving up after {} attempts: {}",
            attempts, last_error
        )))
    }
}
