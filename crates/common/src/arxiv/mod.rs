//! arXiv export API client
//!
//! Provides:
//! - Query-by-id and query-by-category lookups against the export API
//! - Atom feed parsing into domain models
//! - A raw-response cache keyed by request URL
//! - Retry-wrapped, timeout-bounded requests
//!
//! The export API is slow and rate-limited, so every successful payload is
//! cached for the metadata TTL tier and every request runs through the
//! shared retry policy. Single-element payloads deserialize as one-element
//! lists, so callers never see a scalar where a list is expected.

use crate::cache::MemoryCache;
use crate::config::ArxivConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::models::{Paper, PaperStub};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Abstraction over the external metadata source
///
/// The discovery layer depends on this trait so traversal and resolution
/// logic can be exercised against fixtures.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// All entries the source returns for an identifier (usually 0 or 1)
    async fn query_by_id(&self, id: &str) -> Result<Vec<Paper>>;

    /// Up to `max_results` papers filed under `category`
    async fn query_by_category(&self, category: &str, max_results: usize)
        -> Result<Vec<PaperStub>>;
}

// ============================================================================
// Atom Feed Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    /// Canonical abs URL; doubles as the link field
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(rename = "author", default)]
    authors: Vec<FeedAuthor>,
    #[serde(rename = "category", default)]
    categories: Vec<FeedCategory>,
}

#[derive(Debug, Deserialize)]
struct FeedAuthor {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeedCategory {
    #[serde(rename = "@term")]
    term: String,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the arXiv export API
pub struct ArxivClient {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    responses: Arc<MemoryCache<String>>,
}

impl ArxivClient {
    /// Create a client from configuration
    ///
    /// `responses` is the URL-keyed raw-payload cache; it is injected so the
    /// binary owns its lifetime alongside the other cache tiers.
    pub fn new(
        config: &ArxivConfig,
        retry: RetryPolicy,
        responses: Arc<MemoryCache<String>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            retry,
            responses,
        })
    }

    /// Fetch a URL, serving repeats from the response cache
    async fn fetch_with_cache(&self, url: &str) -> Result<String> {
        if let Some(body) = self.responses.get(url) {
            metrics::record_cache_hit("arxiv_responses");
            debug!(url, "arXiv response served from cache");
            return Ok(body);
        }
        metrics::record_cache_miss("arxiv_responses");

        let body = self
            .retry
            .run(|| async move {
                metrics::record_source_request();
                let response = self.client.get(url).send().await?;
                let response = response.error_for_status()?;
                Ok(response.text().await?)
            })
            .await?;

        self.responses.set(url, body.clone());
        Ok(body)
    }
}

#[async_trait]
impl MetadataSource for ArxivClient {
    async fn query_by_id(&self, id: &str) -> Result<Vec<Paper>> {
        let url = format!("{}?id_list={}", self.base_url, urlencoding::encode(id));
        let xml = self.fetch_with_cache(&url).await?;
        let feed = parse_feed(&xml)?;
        Ok(feed.entries.into_iter().map(entry_to_paper).collect())
    }

    async fn query_by_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<PaperStub>> {
        let url = format!(
            "{}?search_query=cat:{}&max_results={}",
            self.base_url,
            urlencoding::encode(category),
            max_results
        );
        let xml = self.fetch_with_cache(&url).await?;
        let feed = parse_feed(&xml)?;
        Ok(feed.entries.into_iter().map(entry_to_stub).collect())
    }
}

// ============================================================================
// Parsing
// ============================================================================

fn parse_feed(xml: &str) -> Result<Feed> {
    quick_xml::de::from_str(xml).map_err(|e| AppError::FeedParse {
        message: e.to_string(),
    })
}

fn entry_to_paper(entry: FeedEntry) -> Paper {
    let id = arxiv_id_from_url(&entry.id);
    let title = collapse_whitespace(&entry.title);
    let abstract_text = collapse_whitespace(&entry.summary);
    let authors = entry.authors.into_iter().map(|a| a.name).collect();
    let categories = entry.categories.into_iter().map(|c| c.term).collect();

    Paper {
        id,
        title,
        authors,
        abstract_text,
        link: entry.id,
        categories,
    }
}

fn entry_to_stub(entry: FeedEntry) -> PaperStub {
    PaperStub {
        id: arxiv_id_from_url(&entry.id),
        title: collapse_whitespace(&entry.title),
        authors: entry.authors.into_iter().map(|a| a.name).collect(),
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
    }
}

/// Extract the arXiv id from an abs URL, e.g.
/// "http://arxiv.org/abs/2401.12345v1" -> "2401.12345v1"
fn arxiv_id_from_url(url: &str) -> String {
    url.split("/abs/")
        .nth(1)
        .map(str::to_string)
        .unwrap_or_else(|| url.to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_TWO_ENTRIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2401.11111v1</id>
    <title>Graph  Neural
      Networks</title>
    <summary>  We propose
      a method   for graphs.  </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <category term="cs.LG"/>
    <category term="stat.ML"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.22222v2</id>
    <title>Sparse Attention</title>
    <summary>Attention can be sparse.</summary>
    <author><name>Grace Hopper</name></author>
    <category term="cs.CL"/>
  </entry>
</feed>"#;

    const FEED_EMPTY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
</feed>"#;

    #[test]
    fn test_parse_feed_entries() {
        let feed = parse_feed(FEED_TWO_ENTRIES).unwrap();
        assert_eq!(feed.entries.len(), 2);
        assert_eq!(feed.entries[0].authors.len(), 2);
        assert_eq!(feed.entries[0].categories.len(), 2);
    }

    #[test]
    fn test_single_element_fields_read_as_lists() {
        let feed = parse_feed(FEED_TWO_ENTRIES).unwrap();
        let second = &feed.entries[1];
        assert_eq!(second.authors.len(), 1);
        assert_eq!(second.authors[0].name, "Grace Hopper");
        assert_eq!(second.categories.len(), 1);
        assert_eq!(second.categories[0].term, "cs.CL");
    }

    #[test]
    fn test_entry_to_paper_normalizes_whitespace() {
        let feed = parse_feed(FEED_TWO_ENTRIES).unwrap();
        let paper = entry_to_paper(feed.entries.into_iter().next().unwrap());

        assert_eq!(paper.id, "2401.11111v1");
        assert_eq!(paper.title, "Graph Neural Networks");
        assert_eq!(paper.abstract_text, "We propose a method for graphs.");
        assert_eq!(paper.link, "http://arxiv.org/abs/2401.11111v1");
        assert_eq!(paper.primary_category(), Some("cs.LG"));
    }

    #[test]
    fn test_empty_feed_parses_to_no_entries() {
        let feed = parse_feed(FEED_EMPTY).unwrap();
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_garbage_payload_is_a_parse_failure() {
        let err = parse_feed("not xml at all").unwrap_err();
        assert!(matches!(err, AppError::FeedParse { .. }));
    }

    #[test]
    fn test_arxiv_id_from_url() {
        assert_eq!(arxiv_id_from_url("http://arxiv.org/abs/2401.12345v1"), "2401.12345v1");
        // Ids without the abs marker pass through unchanged
        assert_eq!(arxiv_id_from_url("2401.12345"), "2401.12345");
    }
}
