//! Paper network discovery handler

use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use papergraph_common::errors::{AppError, Result};
use papergraph_common::models::Paper;
use papergraph_discovery::{Collaborator, GraphEdge};
use serde::Serialize;
use std::time::Instant;

/// Response for the network discovery endpoint
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperNetworkResponse {
    pub nodes: Vec<Paper>,
    pub links: Vec<GraphEdge>,
    pub collaborator_suggestions: Vec<Collaborator>,
}

/// Discover the bounded network around a paper and rank collaborators
pub async fn get_paper_network(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaperNetworkResponse>> {
    let id = id.trim().to_string();
    if id.is_empty() {
        return Err(AppError::Validation {
            message: "paper id must not be empty".to_string(),
            field: Some("id".to_string()),
        });
    }

    let started = Instant::now();
    let bounds = &state.config.discovery;

    // The root resolution rides the same caches the traversal fills
    let (graph, subject) = tokio::try_join!(
        state.graph.discover(&id, bounds.max_depth, bounds.max_branch),
        state.papers.fetch_paper_details(&id),
    )?;

    let related: Vec<Paper> = graph
        .nodes
        .iter()
        .filter(|node| node.id != id)
        .cloned()
        .collect();
    let collaborator_suggestions = state.similarity.rank_collaborators(&subject, &related);

    tracing::info!(
        %id,
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        collaborators = collaborator_suggestions.len(),
        latency_ms = started.elapsed().as_millis() as u64,
        "paper network assembled"
    );

    Ok(Json(PaperNetworkResponse {
        nodes: graph.nodes,
        links: graph.links,
        collaborator_suggestions,
    }))
}
