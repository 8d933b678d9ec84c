use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{self, DateRange};
use crate::article::Article;
use crate::store::Store;
use crate::text::{analyze_titles, TextAnalysis};

pub struct AppState {
    pub store: Arc<Store>,
}

/// JSON presentation interface for the external UI shell.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/articles", get(articles))
        .route("/stats", get(stats))
        .route("/wordcloud", get(wordcloud))
        .route("/health", get(health))
        .with_state(state)
}

// Custom error type
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", self.0),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        AppError(err.into())
    }
}

/// Filter parameters shared by the query routes.
///
/// With no parameter at all, `/articles` returns the raw snapshot (articles
/// with unparsable dates included). Any parameter switches to the filter
/// predicate: `domains` is a comma-separated list (an explicitly empty list
/// matches nothing, an omitted one means every domain present), and omitted
/// bounds widen to the extremes.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub domains: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterQuery {
    fn is_unfiltered(&self) -> bool {
        self.domains.is_none() && self.start.is_none() && self.end.is_none()
    }

    fn domain_set(&self, articles: &[Article]) -> HashSet<String> {
        match &self.domains {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned)
                .collect(),
            None => articles.iter().map(|a| a.domain()).collect(),
        }
    }

    fn range(&self) -> DateRange {
        DateRange::new(
            self.start.unwrap_or(NaiveDate::MIN),
            self.end.unwrap_or(NaiveDate::MAX),
        )
    }

    fn apply(&self, articles: &[Article]) -> Vec<Article> {
        if self.is_unfiltered() {
            articles.to_vec()
        } else {
            analytics::filter_articles(articles, &self.domain_set(articles), self.range())
        }
    }
}

/// An article as the UI sees it: the persisted record plus the derived
/// read-time fields.
#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub source: String,
    pub published_at: String,
    pub parsed_date: Option<NaiveDate>,
    pub thumbnail: String,
    pub description: String,
    pub scraped_at: String,
}

impl From<&Article> for ArticleView {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone(),
            url: article.url.clone(),
            domain: article.domain(),
            source: article.source.clone(),
            published_at: article.published_at.clone(),
            parsed_date: article.parsed_date(),
            thumbnail: article.thumbnail.clone(),
            description: article.description.clone(),
            scraped_at: article.scraped_at.clone(),
        }
    }
}

/// The three user-visible empty states get distinct statuses and messages so
/// the UI never renders an ambiguous blank.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum ListingResponse {
    Ok {
        total: usize,
        articles: Vec<ArticleView>,
    },
    EmptyStore {
        message: &'static str,
    },
    EmptyFilter {
        message: &'static str,
    },
}

const EMPTY_STORE_MSG: &str = "No article data available in the store.";
const EMPTY_FILTER_MSG: &str = "The current filters matched no articles.";
const NO_INPUT_MSG: &str = "No titles to analyze after filtering.";

pub async fn articles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let all = state.store.read_all().await?;
    if all.is_empty() {
        return Ok(Json(ListingResponse::EmptyStore {
            message: EMPTY_STORE_MSG,
        }));
    }

    let selected = query.apply(&all);
    if selected.is_empty() {
        return Ok(Json(ListingResponse::EmptyFilter {
            message: EMPTY_FILTER_MSG,
        }));
    }

    Ok(Json(ListingResponse::Ok {
        total: selected.len(),
        articles: selected.iter().map(ArticleView::from).collect(),
    }))
}

#[derive(Debug, Serialize)]
struct DateCount {
    date: NaiveDate,
    count: u64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum StatsResponse {
    Ok {
        total: usize,
        counts_by_date: Vec<DateCount>,
        counts_by_domain: BTreeMap<String, u64>,
    },
    EmptyStore {
        message: &'static str,
    },
    EmptyFilter {
        message: &'static str,
    },
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let all = state.store.read_all().await?;
    if all.is_empty() {
        return Ok(Json(StatsResponse::EmptyStore {
            message: EMPTY_STORE_MSG,
        }));
    }

    let selected = query.apply(&all);
    if selected.is_empty() {
        return Ok(Json(StatsResponse::EmptyFilter {
            message: EMPTY_FILTER_MSG,
        }));
    }

    let counts_by_date = analytics::counts_by_date(&selected)
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect();

    Ok(Json(StatsResponse::Ok {
        total: selected.len(),
        counts_by_date,
        counts_by_domain: analytics::counts_by_domain(&selected),
    }))
}

#[derive(Debug, Serialize)]
struct TokenCount {
    token: String,
    count: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum WordCloudResponse {
    Ok {
        tokens: Vec<TokenCount>,
    },
    EmptyStore {
        message: &'static str,
    },
    EmptyFilter {
        message: &'static str,
    },
    NoInput {
        message: &'static str,
    },
}

pub async fn wordcloud(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let all = state.store.read_all().await?;
    if all.is_empty() {
        return Ok(Json(WordCloudResponse::EmptyStore {
            message: EMPTY_STORE_MSG,
        }));
    }

    let selected = query.apply(&all);
    if selected.is_empty() {
        return Ok(Json(WordCloudResponse::EmptyFilter {
            message: EMPTY_FILTER_MSG,
        }));
    }

    match analyze_titles(selected.iter().map(|a| a.title.as_str())) {
        TextAnalysis::Frequencies(frequencies) => Ok(Json(WordCloudResponse::Ok {
            tokens: frequencies
                .into_iter()
                .map(|(token, count)| TokenCount { token, count })
                .collect(),
        })),
        TextAnalysis::NoInput => Ok(Json(WordCloudResponse::NoInput {
            message: NO_INPUT_MSG,
        })),
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    async fn server_with(articles: Vec<Article>) -> TestServer {
        let store = Store::open("sqlite::memory:").await.unwrap();
        store.initialize().await.unwrap();
        store.insert_batch(&articles).await.unwrap();

        let state = Arc::new(AppState {
            store: Arc::new(store),
        });
        TestServer::new(router(state)).unwrap()
    }

    fn article(title: &str, url: &str, published_at: &str) -> Article {
        Article {
            title: title.to_string(),
            url: url.to_string(),
            thumbnail: String::new(),
            description: String::new(),
            published_at: published_at.to_string(),
            source: "antara".to_string(),
            scraped_at: "2025-05-12T10:31:00+00:00".to_string(),
        }
    }

    fn sample_articles() -> Vec<Article> {
        vec![
            article(
                "Timnas menang besar",
                "https://www.antaranews.com/berita/1",
                "2025-05-10 08:00:00",
            ),
            article(
                "Jadwal liga pekan ini",
                "https://bola.okezone.com/read/2",
                "2025-05-12 09:00:00",
            ),
            article("Tanpa tanggal", "https://bola.okezone.com/read/3", ""),
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_with(Vec::new()).await;
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[tokio::test]
    async fn test_articles_empty_store() {
        let server = server_with(Vec::new()).await;
        let body: serde_json::Value = server.get("/articles").await.json();
        assert_eq!(body["status"], "empty_store");
    }

    #[tokio::test]
    async fn test_articles_unfiltered_includes_unparsable_dates() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server.get("/articles").await.json();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["total"], 3);
        let articles = body["articles"].as_array().unwrap();
        assert!(articles
            .iter()
            .any(|a| a["parsed_date"].is_null() && a["title"] == "Tanpa tanggal"));
        assert!(articles
            .iter()
            .any(|a| a["domain"] == "www.antaranews.com"));
    }

    #[tokio::test]
    async fn test_articles_filtered_by_domain() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server
            .get("/articles")
            .add_query_param("domains", "bola.okezone.com")
            .await
            .json();

        assert_eq!(body["status"], "ok");
        // The undated okezone article drops out of the filtered view.
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_articles_filtered_by_date_range() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server
            .get("/articles")
            .add_query_param("start", "2025-05-11")
            .add_query_param("end", "2025-05-12")
            .await
            .json();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["total"], 1);
        assert_eq!(body["articles"][0]["title"], "Jadwal liga pekan ini");
    }

    #[tokio::test]
    async fn test_articles_empty_filter_result_is_distinct() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server
            .get("/articles")
            .add_query_param("domains", "tidak-ada.example.com")
            .await
            .json();

        assert_eq!(body["status"], "empty_filter");
    }

    #[tokio::test]
    async fn test_articles_explicit_empty_domain_list() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server
            .get("/articles")
            .add_query_param("domains", "")
            .await
            .json();

        assert_eq!(body["status"], "empty_filter");
    }

    #[tokio::test]
    async fn test_stats_sums() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server
            .get("/stats")
            .add_query_param("start", "2025-05-01")
            .add_query_param("end", "2025-05-31")
            .await
            .json();

        assert_eq!(body["status"], "ok");
        assert_eq!(body["total"], 2);
        assert_eq!(body["counts_by_domain"]["www.antaranews.com"], 1);
        assert_eq!(body["counts_by_domain"]["bola.okezone.com"], 1);

        let by_date = body["counts_by_date"].as_array().unwrap();
        let sum: u64 = by_date.iter().map(|e| e["count"].as_u64().unwrap()).sum();
        assert_eq!(sum, 2);
    }

    #[tokio::test]
    async fn test_wordcloud_tokens() {
        let server = server_with(sample_articles()).await;
        let body: serde_json::Value = server.get("/wordcloud").await.json();

        assert_eq!(body["status"], "ok");
        let tokens = body["tokens"].as_array().unwrap();
        assert!(tokens.iter().any(|t| t["token"] == "timnas"));
        // "ini" is a stopword and never shows up.
        assert!(tokens.iter().all(|t| t["token"] != "ini"));
    }

    #[tokio::test]
    async fn test_wordcloud_no_input_is_distinct_from_empty_filter() {
        // One article matches the filter but its title is all stopwords.
        let articles = vec![article(
            "Ini itu yang dan",
            "https://www.antaranews.com/berita/9",
            "2025-05-10 08:00:00",
        )];
        let server = server_with(articles).await;

        let body: serde_json::Value = server
            .get("/wordcloud")
            .add_query_param("domains", "www.antaranews.com")
            .await
            .json();
        assert_eq!(body["status"], "no_input");

        let body: serde_json::Value = server
            .get("/wordcloud")
            .add_query_param("domains", "tidak-ada.example.com")
            .await
            .json();
        assert_eq!(body["status"], "empty_filter");
    }
}
