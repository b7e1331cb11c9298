//! Three-tier paper resolution
//!
//! A paper id resolves through the short-lived cache, then the persistent
//! store, then the external source, short-circuiting at the first hit. Only
//! a source resolution writes through to the store; a store hit populates
//! the cache but is never re-persisted.

use papergraph_common::arxiv::MetadataSource;
use papergraph_common::cache::MemoryCache;
use papergraph_common::db::PaperStore;
use papergraph_common::errors::{AppError, Result};
use papergraph_common::metrics;
use papergraph_common::models::Paper;
use std::sync::Arc;
use tracing::debug;

/// Resolves paper identifiers to full metadata records
pub struct PaperRepository {
    store: Arc<dyn PaperStore>,
    source: Arc<dyn MetadataSource>,
    cache: Arc<MemoryCache<Paper>>,
}

impl PaperRepository {
    pub fn new(
        store: Arc<dyn PaperStore>,
        source: Arc<dyn MetadataSource>,
        cache: Arc<MemoryCache<Paper>>,
    ) -> Self {
        Self {
            store,
            source,
            cache,
        }
    }

    fn cache_key(id: &str) -> String {
        format!("paper-{id}")
    }

    /// Resolve an id to its Paper, consulting cache, store, then source
    pub async fn fetch_paper_details(&self, id: &str) -> Result<Paper> {
        let key = Self::cache_key(id);

        if let Some(paper) = self.cache.get(&key) {
            metrics::record_cache_hit("papers");
            metrics::record_resolution("cache");
            return Ok(paper);
        }
        metrics::record_cache_miss("papers");

        if let Some(paper) = self.store.find_by_arxiv_id(id).await? {
            debug!(%id, "paper served from store");
            metrics::record_resolution("store");
            self.cache.set(&key, paper.clone());
            return Ok(paper);
        }

        let entries = self.source.query_by_id(id).await?;
        // The source may return several entries for one id; the first is
        // authoritative.
        let paper = entries
            .into_iter()
            .next()
            .ok_or_else(|| AppError::PaperNotFound { id: id.to_string() })?;

        self.store.insert(&paper).await?;
        self.cache.set(&key, paper.clone());
        metrics::record_resolution("source");
        debug!(%id, "paper resolved from source and persisted");

        Ok(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{paper, FixtureSource, MemoryStore};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn repository(
        store: Arc<MemoryStore>,
        source: Arc<FixtureSource>,
    ) -> PaperRepository {
        PaperRepository::new(
            store,
            source,
            Arc::new(MemoryCache::new(Duration::from_secs(3600))),
        )
    }

    #[tokio::test]
    async fn test_second_call_is_served_without_any_lookup() {
        let source = Arc::new(FixtureSource::new().with_paper(paper(
            "P1",
            &["Ada Lovelace"],
            "alpha beta",
            &["cs.LG"],
        )));
        let store = Arc::new(MemoryStore::new());
        let repo = repository(store.clone(), source.clone());

        let first = repo.fetch_paper_details("P1").await.unwrap();
        let second = repo.fetch_paper_details("P1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.id_queries.load(Ordering::SeqCst), 1);
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_source_resolution_writes_through_to_store() {
        let source = Arc::new(FixtureSource::new().with_paper(paper(
            "P1",
            &["Ada Lovelace"],
            "alpha beta",
            &["cs.LG"],
        )));
        let store = Arc::new(MemoryStore::new());
        let repo = repository(store.clone(), source.clone());

        repo.fetch_paper_details("P1").await.unwrap();

        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
        assert!(store.contains("P1"));
    }

    #[tokio::test]
    async fn test_store_hit_populates_cache_but_never_re_persists() {
        let stored = paper("P1", &["Ada Lovelace"], "alpha beta", &["cs.LG"]);
        let store = Arc::new(MemoryStore::new());
        store.preload(stored.clone());
        let source = Arc::new(FixtureSource::new());
        let repo = repository(store.clone(), source.clone());

        let first = repo.fetch_paper_details("P1").await.unwrap();
        let second = repo.fetch_paper_details("P1").await.unwrap();

        assert_eq!(first, stored);
        assert_eq!(second, stored);
        assert_eq!(source.id_queries.load(Ordering::SeqCst), 0);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
        // Second call was answered by the cache
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_entry_wins_when_source_returns_several() {
        use async_trait::async_trait;
        use papergraph_common::arxiv::MetadataSource;
        use papergraph_common::models::PaperStub;

        struct DoubledSource;

        #[async_trait]
        impl MetadataSource for DoubledSource {
            async fn query_by_id(&self, _id: &str) -> papergraph_common::errors::Result<Vec<Paper>> {
                Ok(vec![
                    paper("P1", &["Ada Lovelace"], "first entry", &["cs.LG"]),
                    paper("P1", &["Someone Else"], "second entry", &["cs.LG"]),
                ])
            }

            async fn query_by_category(
                &self,
                _category: &str,
                _max_results: usize,
            ) -> papergraph_common::errors::Result<Vec<PaperStub>> {
                Ok(vec![])
            }
        }

        let repo = PaperRepository::new(
            Arc::new(MemoryStore::new()),
            Arc::new(DoubledSource),
            Arc::new(MemoryCache::new(Duration::from_secs(3600))),
        );

        let resolved = repo.fetch_paper_details("P1").await.unwrap();
        assert_eq!(resolved.abstract_text, "first entry");
    }

    #[tokio::test]
    async fn test_unknown_id_is_a_resolution_failure() {
        let repo = repository(
            Arc::new(MemoryStore::new()),
            Arc::new(FixtureSource::new()),
        );

        let err = repo.fetch_paper_details("nope").await.unwrap_err();
        assert!(matches!(err, AppError::PaperNotFound { .. }));
    }

    #[tokio::test]
    async fn test_source_failure_surfaces_unchanged() {
        let source = Arc::new(FixtureSource::new().with_failing("P1"));
        let repo = repository(Arc::new(MemoryStore::new()), source);

        let err = repo.fetch_paper_details("P1").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }
}
