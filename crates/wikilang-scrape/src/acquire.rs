//! Lazy stream of cleaned articles for one language.

use futures::Stream;
use futures::stream;
use tracing::warn;
use wikilang_core::text;

use crate::ScrapeError;
use crate::source::{ArticleSource, RawArticle};

/// Largest `count` requested from a source in one call; larger requests are
/// clamped to stay clear of throttling.
pub const MAX_PER_CALL: usize = 100;

/// A scraped article with markup, citations, and punctuation removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub text: String,
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Self {
            text: text::clean(&raw.extract),
            title: raw.title,
        }
    }
}

enum Cursor {
    Start,
    Ids(std::vec::IntoIter<u64>),
    Done,
}

/// Up to `count` random articles of `language`, fetched one at a time as the
/// stream is polled.
///
/// Nothing is requested until the first poll, and each article costs one
/// more request, so a consumer that stops early makes fewer calls. Articles
/// without text are logged and skipped. The first transport or decoding
/// error is yielded and ends the stream.
pub fn fetch_articles<'a, S>(
    source: &'a S,
    language: &'a str,
    count: usize,
) -> impl Stream<Item = Result<Article, ScrapeError>> + 'a
where
    S: ArticleSource + ?Sized,
{
    let count = if count > MAX_PER_CALL {
        warn!(language, count, max = MAX_PER_CALL, "clamping article request");
        MAX_PER_CALL
    } else {
        count
    };

    stream::unfold(Cursor::Start, move |cursor| async move {
        let mut ids = match cursor {
            Cursor::Done => return None,
            Cursor::Ids(ids) => ids,
            Cursor::Start => match source.fetch_random_article_ids(language, count).await {
                Ok(ids) => ids.into_iter(),
                Err(e) => return Some((Err(e), Cursor::Done)),
            },
        };
        while let Some(id) = ids.next() {
            match source.fetch_article_body(language, id).await {
                Ok(Some(raw)) => return Some((Ok(Article::from(raw)), Cursor::Ids(ids))),
                Ok(None) => warn!(language, id, "article has no extract; skipping"),
                Err(e) => return Some((Err(e), Cursor::Done)),
            }
        }
        None
    })
}
