//! Subreddit `random.json` source.
//!
//! Each call picks one of the two categories at random and asks the
//! subreddit for a random post.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

use super::{ArticleSource, Category, RawRecord};
use crate::error::FetchError;

const DEFAULT_USER_AGENT: &str = concat!("isitonion/", env!("CARGO_PKG_VERSION"));

/// Fetches a random post from `{base}/{category}/random.json`.
pub struct RedditSource {
    /// Base URL, e.g. `https://www.reddit.com/r`.
    pub base: String,
    client: Client,
}

impl RedditSource {
    /// Create a new source.
    ///
    /// * `base` — subreddit root without a trailing slash requirement.
    /// * `timeout` — per-request timeout; a stalled request becomes a
    ///   [`FetchError::Network`].
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            base: base.into(),
            client,
        })
    }

    /// Endpoint for one category.
    pub fn url_for(&self, category: Category) -> String {
        format!("{}/{}/random.json", self.base.trim_end_matches('/'), category)
    }

    async fn get(&self, url: &str) -> Result<RawRecord, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        Self::decode(&body)
    }

    /// Decode a response body. Pure, so tests can skip the network.
    pub fn decode(body: &[u8]) -> Result<RawRecord, FetchError> {
        Ok(serde_json::from_slice(body)?)
    }
}

#[async_trait]
impl ArticleSource for RedditSource {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn fetch(&self) -> Result<RawRecord, FetchError> {
        let category = Category::random(&mut rand::thread_rng());
        let url = self.url_for(category);
        debug!(%url, "fetching random article");

        let result = self.get(&url).await;

        if let Err(e) = &result {
            warn!(%url, error = %e, "request could not be made");
        }
        result
    }
}
