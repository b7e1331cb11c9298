//! Bounded breadth-first network discovery
//!
//! The traversal expands level by level from the root id. Each frontier item
//! carries its depth; items past the depth bound or already claimed are
//! dropped, the rest expand concurrently under a semaphore. Claiming the id
//! is an atomic check-and-insert, so two branches can never resolve the same
//! paper twice within one call. The first failed expansion aborts the whole
//! traversal; no partial graph is returned.

use super::{Graph, GraphEdge};
use crate::papers::PaperRepository;
use crate::related::RelatedPaperFinder;
use papergraph_common::errors::{AppError, Result};
use papergraph_common::metrics;
use papergraph_common::models::Paper;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Drives the bounded recursive traversal
pub struct GraphBuilder {
    papers: Arc<PaperRepository>,
    related: Arc<RelatedPaperFinder>,
    max_in_flight: usize,
}

/// Shared state scoped to a single traversal call
struct TraversalState {
    visited: Mutex<HashSet<String>>,
    graph: Mutex<Graph>,
}

impl TraversalState {
    fn new() -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            graph: Mutex::new(Graph::default()),
        }
    }

    /// Atomic check-and-insert; true when the id had not been claimed yet
    fn claim(&self, id: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string())
    }

    fn push_node(&self, paper: Paper) {
        self.graph
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .nodes
            .push(paper);
    }

    fn push_links(&self, links: impl IntoIterator<Item = GraphEdge>) {
        self.graph
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .links
            .extend(links);
    }

    fn into_graph(self: Arc<Self>) -> Graph {
        match Arc::try_unwrap(self) {
            Ok(state) => state
                .graph
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            Err(state) => state
                .graph
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

impl GraphBuilder {
    pub fn new(
        papers: Arc<PaperRepository>,
        related: Arc<RelatedPaperFinder>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            papers,
            related,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Discover the bounded network reachable from `root_id`
    ///
    /// Nodes at `max_depth` are resolved but not expanded, so the node count
    /// is bounded by `1 + b + b^2 + ... + b^max_depth`.
    pub async fn discover(
        &self,
        root_id: &str,
        max_depth: usize,
        max_branch: usize,
    ) -> Result<Graph> {
        let started = Instant::now();
        let state = Arc::new(TraversalState::new());
        let limiter = Arc::new(Semaphore::new(self.max_in_flight));

        let mut frontier = vec![(root_id.to_string(), 0usize)];
        while !frontier.is_empty() {
            let mut expansions: JoinSet<Result<Vec<(String, usize)>>> = JoinSet::new();

            for (id, depth) in frontier.drain(..) {
                if depth > max_depth || !state.claim(&id) {
                    continue;
                }

                let papers = Arc::clone(&self.papers);
                let related = Arc::clone(&self.related);
                let state = Arc::clone(&state);
                let limiter = Arc::clone(&limiter);
                expansions.spawn(async move {
                    let _permit =
                        limiter
                            .acquire_owned()
                            .await
                            .map_err(|_| AppError::Internal {
                                message: "traversal limiter closed".to_string(),
                            })?;
                    expand(papers, related, state, id, depth, max_depth, max_branch).await
                });
            }

            let mut next = Vec::new();
            while let Some(joined) = expansions.join_next().await {
                match joined {
                    Ok(Ok(children)) => next.extend(children),
                    Ok(Err(e)) => {
                        expansions.abort_all();
                        return Err(e);
                    }
                    Err(e) => {
                        expansions.abort_all();
                        return Err(AppError::Internal {
                            message: format!("expansion task failed: {e}"),
                        });
                    }
                }
            }
            frontier = next;
        }

        let graph = state.into_graph();
        let elapsed = started.elapsed().as_secs_f64();
        metrics::record_traversal(elapsed, graph.node_count(), graph.link_count());
        info!(
            root_id,
            max_depth,
            max_branch,
            nodes = graph.node_count(),
            links = graph.link_count(),
            elapsed_secs = elapsed,
            "network discovery complete"
        );

        Ok(graph)
    }
}

/// Resolve one claimed id and report its children for the next level
async fn expand(
    papers: Arc<PaperRepository>,
    related: Arc<RelatedPaperFinder>,
    state: Arc<TraversalState>,
    id: String,
    depth: usize,
    max_depth: usize,
    max_branch: usize,
) -> Result<Vec<(String, usize)>> {
    let paper = papers.fetch_paper_details(&id).await?;
    let category = paper.primary_category().map(str::to_string);

    // The node lands in the graph before any of its outgoing edges can.
    state.push_node(paper);

    if depth >= max_depth {
        return Ok(Vec::new());
    }

    let Some(category) = category else {
        // Nothing to expand along; the branch ends at this node.
        debug!(%id, "paper has no categories, branch terminates");
        return Ok(Vec::new());
    };

    let stubs = related
        .fetch_related_papers(&category, &id, max_branch)
        .await?;

    state.push_links(stubs.iter().map(|stub| GraphEdge {
        source: id.clone(),
        target: stub.id.clone(),
    }));

    Ok(stubs.into_iter().map(|stub| (stub.id, depth + 1)).collect())
}
