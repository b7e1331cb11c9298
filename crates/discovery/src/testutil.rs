//! Shared fixtures for the discovery tests

use async_trait::async_trait;
use papergraph_common::arxiv::MetadataSource;
use papergraph_common::db::PaperStore;
use papergraph_common::errors::{AppError, Result};
use papergraph_common::models::{Paper, PaperStub};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn paper(id: &str, authors: &[&str], abstract_text: &str, categories: &[&str]) -> Paper {
    Paper {
        id: id.to_string(),
        title: format!("Paper {id}"),
        authors: authors.iter().map(|a| a.to_string()).collect(),
        abstract_text: abstract_text.to_string(),
        link: format!("http://arxiv.org/abs/{id}"),
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}

pub fn stub_of(paper: &Paper) -> PaperStub {
    PaperStub {
        id: paper.id.clone(),
        title: paper.title.clone(),
        authors: paper.authors.clone(),
        categories: paper.categories.clone(),
    }
}

/// Canned metadata source with per-method call counters
#[derive(Default)]
pub struct FixtureSource {
    papers: HashMap<String, Paper>,
    related: HashMap<String, Vec<PaperStub>>,
    failing: HashSet<String>,
    pub id_queries: AtomicUsize,
    pub category_queries: AtomicUsize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paper(mut self, paper: Paper) -> Self {
        self.papers.insert(paper.id.clone(), paper);
        self
    }

    pub fn with_related(mut self, category: &str, stubs: Vec<PaperStub>) -> Self {
        self.related.insert(category.to_string(), stubs);
        self
    }

    /// Make `query_by_id` for this id fail like an exhausted upstream
    pub fn with_failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }
}

#[async_trait]
impl MetadataSource for FixtureSource {
    async fn query_by_id(&self, id: &str) -> Result<Vec<Paper>> {
        self.id_queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(id) {
            return Err(AppError::Upstream {
                message: format!("source unavailable for {id}"),
            });
        }
        Ok(self.papers.get(id).cloned().into_iter().collect())
    }

    async fn query_by_category(
        &self,
        category: &str,
        max_results: usize,
    ) -> Result<Vec<PaperStub>> {
        self.category_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .related
            .get(category)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(max_results)
            .collect())
    }
}

/// In-memory paper store with lookup/insert counters
#[derive(Default)]
pub struct MemoryStore {
    papers: Mutex<HashMap<String, Paper>>,
    pub lookups: AtomicUsize,
    pub inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&self, paper: Paper) {
        self.papers.lock().unwrap().insert(paper.id.clone(), paper);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.papers.lock().unwrap().contains_key(id)
    }
}

#[async_trait]
impl PaperStore for MemoryStore {
    async fn find_by_arxiv_id(&self, id: &str) -> Result<Option<Paper>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.papers.lock().unwrap().get(id).cloned())
    }

    async fn insert(&self, paper: &Paper) -> Result<()> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.papers
            .lock()
            .unwrap()
            .entry(paper.id.clone())
            .or_insert_with(|| paper.clone());
        Ok(())
    }
}
