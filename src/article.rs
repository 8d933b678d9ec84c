use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use url::Url;

/// Canonical article record, one row per post per endpoint.
///
/// `domain` and the parsed publication date are views derived on read, not
/// columns; see [`Article::domain`] and [`Article::parsed_date`].
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub thumbnail: String,
    pub description: String,
    /// Raw source timestamp, kept verbatim. May be empty or malformed.
    pub published_at: String,
    /// Provider tag derived from the endpoint URL, e.g. "antara".
    pub source: String,
    /// RFC 3339 insertion time, set when the post was normalized.
    pub scraped_at: String,
}

impl Article {
    /// Network host of `url`, or the literal `"Unknown"` when the URL is
    /// empty or unparsable. Recomputed on every call, never persisted.
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_owned))
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Publication date parsed out of the raw `published_at` string.
    ///
    /// The feeds emit a mix of timestamp formats, so parsing is lenient.
    /// `None` means the value was empty or unparsable; such records stay in
    /// plain listings but drop out of date-filtered views and date buckets.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.published_at.trim();
        if raw.is_empty() {
            return None;
        }
        dtparse::parse(raw).ok().map(|(dt, _offset)| dt.date())
    }
}

/// Derives the provider tag from a feed endpoint URL.
///
/// The tag is the first non-empty path segment (the endpoints are shaped
/// `https://<api-host>/<provider>/<category>/`). When the path carries no
/// segments the host stands in; when nothing is parsable the tag is
/// `"unknown"`.
pub fn source_tag(endpoint: &str) -> String {
    let Ok(parsed) = Url::parse(endpoint) else {
        return "unknown".to_string();
    };
    if let Some(segment) = parsed
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
    {
        return segment.to_string();
    }
    parsed
        .host_str()
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with(url: &str, published_at: &str) -> Article {
        Article {
            title: "Judul".to_string(),
            url: url.to_string(),
            thumbnail: String::new(),
            description: String::new(),
            published_at: published_at.to_string(),
            source: "antara".to_string(),
            scraped_at: "2025-05-12T10:30:00+00:00".to_string(),
        }
    }

    mod domain_tests {
        use super::*;

        #[test]
        fn test_domain_is_network_host() {
            let article = article_with("https://www.antaranews.com/berita/123/judul", "");
            assert_eq!(article.domain(), "www.antaranews.com");
        }

        #[test]
        fn test_domain_ignores_path_and_query() {
            let article = article_with("https://bola.okezone.com/read/2025/05?page=2", "");
            assert_eq!(article.domain(), "bola.okezone.com");
        }

        #[test]
        fn test_domain_unknown_for_empty_url() {
            let article = article_with("", "");
            assert_eq!(article.domain(), "Unknown");
        }

        #[test]
        fn test_domain_unknown_for_relative_url() {
            let article = article_with("/berita/123", "");
            assert_eq!(article.domain(), "Unknown");
        }

        #[test]
        fn test_domain_unknown_for_garbage() {
            let article = article_with("not a url at all", "");
            assert_eq!(article.domain(), "Unknown");
        }
    }

    mod parsed_date_tests {
        use super::*;

        #[test]
        fn test_parses_plain_datetime() {
            let article = article_with("https://a.com", "2025-05-12 10:30:00");
            assert_eq!(
                article.parsed_date(),
                Some(NaiveDate::from_ymd_opt(2025, 5, 12).unwrap())
            );
        }

        #[test]
        fn test_parses_rfc2822_style() {
            let article = article_with("https://a.com", "Mon, 12 May 2025 10:30:00 +0700");
            assert_eq!(
                article.parsed_date(),
                Some(NaiveDate::from_ymd_opt(2025, 5, 12).unwrap())
            );
        }

        #[test]
        fn test_none_for_empty() {
            let article = article_with("https://a.com", "");
            assert_eq!(article.parsed_date(), None);
        }

        #[test]
        fn test_none_for_whitespace() {
            let article = article_with("https://a.com", "   ");
            assert_eq!(article.parsed_date(), None);
        }

        #[test]
        fn test_none_for_malformed() {
            let article = article_with("https://a.com", "kemarin sore");
            assert_eq!(article.parsed_date(), None);
        }
    }

    mod source_tag_tests {
        use super::*;

        #[test]
        fn test_first_path_segment() {
            assert_eq!(
                source_tag("https://api-berita-indonesia.vercel.app/antara/bola/"),
                "antara"
            );
        }

        #[test]
        fn test_single_segment_path() {
            assert_eq!(source_tag("https://example.com/merdeka"), "merdeka");
        }

        #[test]
        fn test_falls_back_to_host_without_path() {
            assert_eq!(source_tag("https://example.com/"), "example.com");
        }

        #[test]
        fn test_unknown_for_unparsable() {
            assert_eq!(source_tag("not a url"), "unknown");
        }
    }
}
