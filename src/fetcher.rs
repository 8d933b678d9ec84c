use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::article::{source_tag, Article};
use crate::error::FetchError;

/// JSON envelope every category endpoint returns.
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    data: FeedData,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    posts: Vec<FeedPost>,
}

/// One post as the feed emits it. Optional fields default to empty strings,
/// matching how the records are persisted.
#[derive(Debug, Deserialize)]
struct FeedPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    thumbnail: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "pubDate")]
    pub_date: String,
}

pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Warta/0.1 (news article collector)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Fetch one endpoint and normalize its posts into `Article`s.
    ///
    /// Every failure mode is reported as a [`FetchError`] naming the
    /// endpoint; the caller decides whether to keep going with the rest of
    /// the source set. No persistence happens here.
    pub async fn fetch(&self, endpoint: &str) -> Result<Vec<Article>, FetchError> {
        let response = self
            .client
            .get(endpoint)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let envelope: FeedEnvelope =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let source = source_tag(endpoint);
        let scraped_at = Utc::now();
        let articles: Vec<Article> = envelope
            .data
            .posts
            .into_iter()
            .map(|post| normalize(post, &source, scraped_at))
            .collect();

        debug!("{}: {} posts from '{}'", endpoint, articles.len(), source);
        Ok(articles)
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(post: FeedPost, source: &str, scraped_at: DateTime<Utc>) -> Article {
    Article {
        title: post.title,
        url: post.link,
        thumbnail: post.thumbnail,
        description: post.description,
        published_at: post.pub_date,
        source: source.to_string(),
        scraped_at: scraped_at.to_rfc3339(),
    }
}
