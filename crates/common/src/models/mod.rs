//! Domain models shared across the PaperGraph services

use serde::{Deserialize, Serialize};

/// A fully-resolved paper record
///
/// Created on first successful resolution and immutable afterwards;
/// persisted once, cached repeatedly. Uniquely keyed by the arXiv id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// arXiv identifier (e.g. "2401.12345v1")
    pub id: String,

    /// Paper title
    pub title: String,

    /// Author names in publication order
    pub authors: Vec<String>,

    /// Abstract with internal whitespace collapsed to single spaces
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Canonical URL of the paper
    pub link: String,

    /// Taxonomy codes; the first entry is the primary category
    pub categories: Vec<String>,
}

impl Paper {
    /// The category used as the relatedness signal for expansion
    pub fn primary_category(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

/// A related-paper candidate as returned by a category query
///
/// Carries no abstract or link; those are only resolved if the stub is
/// expanded into a full node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperStub {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_paper() -> Paper {
        Paper {
            id: "2401.12345".to_string(),
            title: "Deep Learning for Citation Networks".to_string(),
            authors: vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()],
            abstract_text: "We study citation networks.".to_string(),
            link: "http://arxiv.org/abs/2401.12345".to_string(),
            categories: vec!["cs.LG".to_string(), "cs.DL".to_string()],
        }
    }

    #[test]
    fn test_primary_category() {
        let paper = sample_paper();
        assert_eq!(paper.primary_category(), Some("cs.LG"));

        let uncategorized = Paper {
            categories: vec![],
            ..paper
        };
        assert_eq!(uncategorized.primary_category(), None);
    }

    #[test]
    fn test_abstract_serializes_without_rust_name() {
        let json = serde_json::to_value(sample_paper()).unwrap();
        assert_eq!(json["abstract"], "We study citation networks.");
        assert!(json.get("abstract_text").is_none());
    }
}
