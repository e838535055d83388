//! MediaWiki action API client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::source::{ArticleSource, RawArticle};
use crate::ScrapeError;

/// API endpoint template; `{lang}` is replaced by the language code.
pub const WIKIPEDIA_API: &str = "https://{lang}.wikipedia.org/w/api.php";

const USER_AGENT: &str = concat!("wikilang/", env!("CARGO_PKG_VERSION"));

/// Article namespace; excludes talk, category, and user pages.
const MAIN_NAMESPACE: &str = "0";

/// HTTP client for one Wikipedia edition per language.
pub struct WikiClient {
    client: reqwest::Client,
    api_url: String,
}

// ── Response envelopes ──

#[derive(Deserialize)]
struct RandomResponse {
    query: RandomQuery,
}

#[derive(Deserialize)]
struct RandomQuery {
    random: Vec<RandomPage>,
}

#[derive(Deserialize)]
struct RandomPage {
    id: u64,
}

#[derive(Deserialize)]
struct ExtractResponse {
    query: ExtractQuery,
}

#[derive(Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, ExtractPage>,
}

#[derive(Deserialize)]
struct ExtractPage {
    title: Option<String>,
    extract: Option<String>,
}

fn parse_random_ids(body: &str) -> Result<Vec<u64>, ScrapeError> {
    let resp: RandomResponse = serde_json::from_str(body)?;
    Ok(resp.query.random.into_iter().map(|p| p.id).collect())
}

/// The page for `id`, or the only page when a redirect renumbered it.
fn parse_extract(body: &str, id: u64) -> Result<Option<RawArticle>, ScrapeError> {
    let mut resp: ExtractResponse = serde_json::from_str(body)?;
    let page = match resp.query.pages.remove(&id.to_string()) {
        Some(page) => Some(page),
        None if resp.query.pages.len() == 1 => resp.query.pages.into_values().next(),
        None => None,
    };
    Ok(page.and_then(|p| match (p.title, p.extract) {
        (Some(title), Some(extract)) => Some(RawArticle { title, extract }),
        _ => None,
    }))
}

impl WikiClient {
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_api_url(WIKIPEDIA_API)
    }

    /// Client for a mirror or test server. `api_url` may contain `{lang}`.
    pub fn with_api_url(api_url: impl Into<String>) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    fn endpoint(&self, language: &str) -> String {
        self.api_url.replace("{lang}", language)
    }

    async fn get(&self, language: &str, params: &[(&str, &str)]) -> Result<String, ScrapeError> {
        let url = self.endpoint(language);
        debug!(url = %url, ?params, "querying wiki api");
        let resp = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("action", "query")])
            .query(params)
            .send()
            .await?;
        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ScrapeError::RateLimited {
                host: resp.url().host_str().unwrap_or_default().to_string(),
            });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ScrapeError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.text().await?)
    }
}

#[async_trait]
impl ArticleSource for WikiClient {
    async fn fetch_random_article_ids(
        &self,
        language: &str,
        count: usize,
    ) -> Result<Vec<u64>, ScrapeError> {
        let limit = count.to_string();
        let body = self
            .get(
                language,
                &[
                    ("list", "random"),
                    ("rnlimit", limit.as_str()),
                    ("rnnamespace", MAIN_NAMESPACE),
                ],
            )
            .await?;
        let ids = parse_random_ids(&body)?;
        info!(language, count = ids.len(), "fetched random article ids");
        Ok(ids)
    }

    async fn fetch_article_body(
        &self,
        language: &str,
        id: u64,
    ) -> Result<Option<RawArticle>, ScrapeError> {
        let page_id = id.to_string();
        let body = self
            .get(
                language,
                &[
                    ("prop", "extracts"),
                    ("pageids", page_id.as_str()),
                    ("redirects", "true"),
                ],
            )
            .await?;
        parse_extract(&body, id)
    }
}
