//! Mermaid flowchart generation
//!
//! Renders an outline object into `graph TD` source: a start node fanning
//! out to one node per main topic, each fanning out to its subtopics.
//! Labels are sanitized so they cannot break the Mermaid syntax.

use serde_json::{Map, Value};
use tracing::warn;

/// Render an outline into Mermaid flowchart source
pub fn flowchart_from_outline(outline: &Map<String, Value>) -> String {
    let mut code = String::from("graph TD\nstart[Start]\n");

    for (index, (topic, subtopics)) in outline.iter().enumerate() {
        let main_id = format!("main{index}");
        code.push_str(&format!("{main_id}[{}]\n", sanitize_label(topic)));
        code.push_str(&format!("start --> {main_id}\n"));

        let Value::Array(subtopics) = subtopics else {
            warn!(topic = %topic, "subtopics is not an array, skipping");
            continue;
        };

        for (sub_index, subtopic) in subtopics.iter().enumerate() {
            let sub_id = format!("sub{index}_{sub_index}");
            let label = sanitize_label(&value_to_text(subtopic));
            code.push_str(&format!("{sub_id}[{label}]\n"));
            code.push_str(&format!("{main_id} --> {sub_id}\n"));
        }
    }

    code
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Strip characters that would break Mermaid node syntax
pub fn sanitize_label(text: &str) -> String {
    text.chars()
        .filter(|c| !"{}[]()#;".contains(*c))
        .map(|c| if c == '"' { '\'' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outline(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_flowchart_structure() {
        let code = flowchart_from_outline(&outline(json!({
            "Methods": ["CNN", "RNN"],
            "Results": ["Benchmarks"],
        })));

        assert!(code.starts_with("graph TD\nstart[Start]\n"));
        assert!(code.contains("main0[Methods]"));
        assert!(code.contains("start --> main0"));
        assert!(code.contains("sub0_0[CNN]"));
        assert!(code.contains("sub0_1[RNN]"));
        assert!(code.contains("main0 --> sub0_1"));
        assert!(code.contains("main1[Results]"));
        assert!(code.contains("sub1_0[Benchmarks]"));
    }

    #[test]
    fn test_non_array_subtopics_are_skipped() {
        let code = flowchart_from_outline(&outline(json!({
            "Topic": "not a list",
        })));

        assert!(code.contains("main0[Topic]"));
        assert!(!code.contains("sub0_0"));
    }

    #[test]
    fn test_non_string_subtopics_are_rendered_as_text() {
        let code = flowchart_from_outline(&outline(json!({
            "Topic": [42],
        })));

        assert!(code.contains("sub0_0[42]"));
    }

    #[test]
    fn test_empty_outline_still_has_a_start_node() {
        let code = flowchart_from_outline(&Map::new());
        assert_eq!(code, "graph TD\nstart[Start]\n");
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("A (B) {C} [D] #E;"), "A B C D E");
        assert_eq!(sanitize_label(r#"say "hi""#), "say 'hi'");
        assert_eq!(sanitize_label("  padded  "), "padded");
    }
}
