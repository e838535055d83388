//! Text conventions shared by the scraper, the corpus store, and the vectorizer.
//!
//! Scraped articles are cleaned once with [`clean`] before storage. Word
//! budgets count whitespace-separated [`words`]. The vectorizer lowercases and
//! keeps runs of two or more word characters via [`tokenize`]; scripts written
//! without spaces (Japanese, Chinese) therefore collapse into very long tokens
//! and identify poorly.

use std::sync::LazyLock;

use regex::Regex;

/// HTML tags, numeric citation markers like `[12]`, and common punctuation.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[^>]+>|\[\d+\]|[,.'"()])"#).expect("markup pattern is valid")
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"));

/// Strip markup tags, citation markers, and punctuation from article text.
pub fn clean(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

/// Whitespace-separated words, as counted against a word budget.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Lowercased vectorizer tokens: runs of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// File-name-safe slug of an article title: its alphanumeric characters.
pub fn slugify(title: &str) -> String {
    title.chars().filter(|c| c.is_alphanumeric()).collect()
}
