use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use crate::article::Article;

/// Inclusive publication-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Widest representable range, used when a caller omits bounds.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Selects the articles whose domain is in `domains` and whose parsed
/// publication date falls within `range`.
///
/// Articles with an unparsable `published_at` can never satisfy the date
/// clause and are excluded here, whatever the range. An empty domain set or
/// an inverted range yields an empty result.
pub fn filter_articles(
    articles: &[Article],
    domains: &HashSet<String>,
    range: DateRange,
) -> Vec<Article> {
    articles
        .iter()
        .filter(|article| {
            domains.contains(&article.domain())
                && article
                    .parsed_date()
                    .map(|date| range.contains(date))
                    .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Article counts per distinct parsed date, ascending. Articles without a
/// parsed date are skipped.
pub fn counts_by_date(articles: &[Article]) -> Vec<(NaiveDate, u64)> {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for article in articles {
        if let Some(date) = article.parsed_date() {
            *counts.entry(date).or_insert(0) += 1;
        }
    }
    counts.into_iter().collect()
}

/// Article counts per domain, covering every domain present ("Unknown"
/// included).
pub fn counts_by_domain(articles: &[Article]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for article in articles {
        *counts.entry(article.domain()).or_insert(0) += 1;
    }
    counts
}
