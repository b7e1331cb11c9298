//! PaperGraph Discovery Engine
//!
//! Builds a bounded network of related papers from a single arXiv
//! identifier and ranks collaborator candidates:
//! - Three-tier paper resolution (cache, store, external source)
//! - Category-filtered related-paper lookup
//! - Breadth-first bounded traversal with concurrent expansion
//! - Term-overlap similarity ranking over abstracts

pub mod graph;
pub mod papers;
pub mod related;
pub mod similarity;

#[cfg(test)]
pub(crate) mod testutil;

pub use graph::{Graph, GraphBuilder, GraphEdge};
pub use papers::PaperRepository;
pub use related::RelatedPaperFinder;
pub use similarity::{Collaborator, SimilarityEngine};
