//! The two operations the acquirer needs from a content source.

use async_trait::async_trait;

use crate::ScrapeError;

/// An article as returned by the source, before cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    pub title: String,
    pub extract: String,
}

/// A queryable source of encyclopedia articles, one edition per language.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Ids of `count` pseudo-random main-namespace articles.
    async fn fetch_random_article_ids(
        &self,
        language: &str,
        count: usize,
    ) -> Result<Vec<u64>, ScrapeError>;

    /// Title and extracted text of one article.
    ///
    /// `Ok(None)` means the article exists but has no usable text; callers
    /// skip it.
    async fn fetch_article_body(
        &self,
        language: &str,
        id: u64,
    ) -> Result<Option<RawArticle>, ScrapeError>;
}
