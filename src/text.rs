use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

/// Indonesian base stopword list, one word per line.
static BASE_STOPWORDS: &str = include_str!("../resources/stopwords/stopwords-id.txt");

/// Words that clutter news-title word clouds but are missing from the base
/// list: loanwords and headline filler the feeds use constantly.
const EXTRA_STOPWORDS: &[&str] = &[
    "vs", "live", "update", "top", "video", "foto", "soal", "jelang", "bakal", "resmi", "terkait",
];

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    BASE_STOPWORDS
        .lines()
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .chain(EXTRA_STOPWORDS.iter().copied())
        .collect()
});

/// Result of analyzing a filtered subset's titles.
///
/// `NoInput` is a deliberate signal, not an error: the caller renders a
/// "nothing to show" message instead of an empty word cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextAnalysis {
    /// Surviving tokens weighted by recurrence, sorted by count descending,
    /// ties alphabetical.
    Frequencies(Vec<(String, usize)>),
    /// Nothing to tokenize: the subset was empty, every title was empty, or
    /// all tokens were stopwords.
    NoInput,
}

/// Lowercases the non-empty titles, splits on whitespace, and drops
/// stopwords. The surviving token order follows the title order.
pub fn tokenize<'a, I>(titles: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let joined = titles
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    joined
        .split_whitespace()
        .filter(|token| !STOPWORDS.contains(token))
        .map(str::to_owned)
        .collect()
}

/// Tokenizes the titles and folds the result into frequency pairs for
/// word-cloud rendering.
pub fn analyze_titles<'a, I>(titles: I) -> TextAnalysis
where
    I: IntoIterator<Item = &'a str>,
{
    let tokens = tokenize(titles);
    if tokens.is_empty() {
        return TextAnalysis::NoInput;
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }

    let mut frequencies: Vec<(String, usize)> = counts.into_iter().collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    TextAnalysis::Frequencies(frequencies)
}
