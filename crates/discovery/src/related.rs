//! Category-filtered related-paper lookup
//!
//! The raw result set for a `(category, max_results)` pair is cached as
//! fetched; exclusion of the origin paper is applied per call, before the
//! truncation, so one cached fetch serves every caller regardless of which
//! id it excludes.

use papergraph_common::arxiv::MetadataSource;
use papergraph_common::cache::MemoryCache;
use papergraph_common::errors::Result;
use papergraph_common::metrics;
use papergraph_common::models::PaperStub;
use std::sync::Arc;

/// Default number of related papers fetched per expansion
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Finds candidate related papers by taxonomy category
pub struct RelatedPaperFinder {
    source: Arc<dyn MetadataSource>,
    cache: Arc<MemoryCache<Vec<PaperStub>>>,
}

impl RelatedPaperFinder {
    pub fn new(
        source: Arc<dyn MetadataSource>,
        cache: Arc<MemoryCache<Vec<PaperStub>>>,
    ) -> Self {
        Self { source, cache }
    }

    /// Up to `max_results` papers in `category`, never including `exclude_id`
    pub async fn fetch_related_papers(
        &self,
        category: &str,
        exclude_id: &str,
        max_results: usize,
    ) -> Result<Vec<PaperStub>> {
        let key = format!("related-{category}-{max_results}");

        let raw = match self.cache.get(&key) {
            Some(stubs) => {
                metrics::record_cache_hit("related");
                stubs
            }
            None => {
                metrics::record_cache_miss("related");
                let stubs = self.source.query_by_category(category, max_results).await?;
                self.cache.set(&key, stubs.clone());
                stubs
            }
        };

        Ok(raw
            .into_iter()
            .filter(|stub| stub.id != exclude_id)
            .take(max_results)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{paper, stub_of, FixtureSource};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn finder(source: Arc<FixtureSource>) -> RelatedPaperFinder {
        RelatedPaperFinder::new(source, Arc::new(MemoryCache::new(Duration::from_secs(3600))))
    }

    fn stubs(ids: &[&str]) -> Vec<PaperStub> {
        ids.iter()
            .map(|id| stub_of(&paper(id, &["Someone"], "", &["cs.LG"])))
            .collect()
    }

    #[tokio::test]
    async fn test_origin_is_excluded_before_truncation() {
        let source =
            Arc::new(FixtureSource::new().with_related("cs.LG", stubs(&["P0", "P1", "P2"])));
        let finder = finder(source);

        let related = finder.fetch_related_papers("cs.LG", "P0", 2).await.unwrap();

        // The slice still yields max_results papers once the origin is gone
        let ids: Vec<&str> = related.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_source() {
        let source =
            Arc::new(FixtureSource::new().with_related("cs.LG", stubs(&["P1", "P2"])));
        let finder = finder(source.clone());

        finder.fetch_related_papers("cs.LG", "P0", 8).await.unwrap();
        finder.fetch_related_papers("cs.LG", "P0", 8).await.unwrap();

        assert_eq!(source.category_queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cached_set_honors_a_different_excluded_id() {
        let source =
            Arc::new(FixtureSource::new().with_related("cs.LG", stubs(&["P1", "P2"])));
        let finder = finder(source.clone());

        let first = finder.fetch_related_papers("cs.LG", "P1", 8).await.unwrap();
        let second = finder.fetch_related_papers("cs.LG", "P2", 8).await.unwrap();

        assert_eq!(source.category_queries.load(Ordering::SeqCst), 1);
        assert_eq!(first.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["P2"]);
        assert_eq!(second.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(), vec!["P1"]);
    }

    #[tokio::test]
    async fn test_distinct_limits_use_distinct_cache_entries() {
        let source =
            Arc::new(FixtureSource::new().with_related("cs.LG", stubs(&["P1", "P2", "P3"])));
        let finder = finder(source.clone());

        finder.fetch_related_papers("cs.LG", "x", 2).await.unwrap();
        finder.fetch_related_papers("cs.LG", "x", 3).await.unwrap();

        assert_eq!(source.category_queries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_category_yields_empty_result() {
        let finder = finder(Arc::new(FixtureSource::new()));
        let related = finder.fetch_related_papers("q-bio.NC", "x", 8).await.unwrap();
        assert!(related.is_empty());
    }
}
