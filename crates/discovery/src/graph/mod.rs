//! Paper network graph
//!
//! The node set is unique by paper id; links are directed discovery events
//! ("target was found while expanding source") and are not deduplicated
//! against reverse edges.

mod builder;

pub use builder::GraphBuilder;

use papergraph_common::models::Paper;
use serde::{Deserialize, Serialize};

/// Directed edge recorded once per discovery event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Result of one bounded traversal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Paper>,
    pub links: Vec<GraphEdge>,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.iter().any(|paper| paper.id == id)
    }
}
