//! Term-overlap collaborator ranking
//!
//! Each abstract is reduced to its distinct vocabulary (lowercased
//! alphanumeric tokens). The similarity of two abstracts is the size of the
//! vocabulary intersection normalized by the geometric mean of the
//! vocabulary sizes - a binary term-presence measure, not a weighted cosine.
//! Authors of related papers accumulate the similarity of every paper they
//! appear on; authors of the subject paper are never candidates.

use papergraph_common::models::Paper;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Maximum number of collaborator suggestions returned
pub const MAX_COLLABORATORS: usize = 5;

const COLLABORATOR_REASON: &str = "High similarity in research interests";

/// A ranked collaborator candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    pub name: String,
    /// Accumulated similarity, formatted to two decimal places
    pub score: String,
    pub reason: String,
}

/// Ranks non-co-author contributors of related papers
#[derive(Debug, Default)]
pub struct SimilarityEngine;

impl SimilarityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rank collaborator candidates for `subject` against `related`
    ///
    /// Ties keep their insertion order: the sort is stable and authors are
    /// first seen in related-paper order, then author-list order.
    pub fn rank_collaborators(&self, subject: &Paper, related: &[Paper]) -> Vec<Collaborator> {
        let subject_terms = term_set(&subject.abstract_text);
        let subject_authors: HashSet<&str> =
            subject.authors.iter().map(String::as_str).collect();

        let mut order: Vec<String> = Vec::new();
        let mut totals: HashMap<String, f64> = HashMap::new();

        for paper in related {
            let similarity = term_overlap(&subject_terms, &term_set(&paper.abstract_text));

            for author in &paper.authors {
                if subject_authors.contains(author.as_str()) {
                    continue;
                }
                if !totals.contains_key(author) {
                    order.push(author.clone());
                }
                *totals.entry(author.clone()).or_insert(0.0) += similarity;
            }
        }

        let mut ranked: Vec<(String, f64)> = order
            .into_iter()
            .map(|name| {
                let score = totals[&name];
                (name, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked.truncate(MAX_COLLABORATORS);

        debug!(
            subject = %subject.id,
            related = related.len(),
            candidates = ranked.len(),
            "collaborator ranking complete"
        );

        ranked
            .into_iter()
            .map(|(name, score)| Collaborator {
                name,
                score: format!("{score:.2}"),
                reason: COLLABORATOR_REASON.to_string(),
            })
            .collect()
    }
}

/// Distinct lowercased alphanumeric tokens of a text
fn term_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// |A ∩ B| / sqrt(|A| * |B|), with 0.0 for an empty vocabulary
fn term_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    shared as f64 / ((a.len() * b.len()) as f64).sqrt()
}
