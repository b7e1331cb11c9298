//! Chat-completion client for outline generation
//!
//! Asks the API for a JSON object mapping main topics to subtopic arrays,
//! recovers the object from the reply (models wrap JSON in prose), and
//! renders it to Mermaid source. Generated flowcharts are cached on the
//! short TTL tier because the input is client-supplied.

use crate::mermaid;
use papergraph_common::cache::MemoryCache;
use papergraph_common::config::OutlineConfig;
use papergraph_common::errors::{AppError, Result};
use papergraph_common::metrics;
use papergraph_common::retry::RetryPolicy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Client for the outline chat-completion API
pub struct OutlineClient {
    client: reqwest::Client,
    config: OutlineConfig,
    retry: RetryPolicy,
    cache: Arc<MemoryCache<String>>,
}

impl OutlineClient {
    pub fn new(
        config: OutlineConfig,
        retry: RetryPolicy,
        cache: Arc<MemoryCache<String>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config,
            retry,
            cache,
        })
    }

    /// Generate Mermaid flowchart source for the given paper content
    pub async fn generate_flowchart(&self, content: &str) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation {
                message: "No content provided".to_string(),
                field: Some("content".to_string()),
            });
        }

        let cache_key = format!("flowchart-{}", prefix_chars(content, 100));
        if let Some(code) = self.cache.get(&cache_key) {
            metrics::record_cache_hit("flowcharts");
            return Ok(code);
        }
        metrics::record_cache_miss("flowcharts");

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration {
                message: "outline API key not configured".to_string(),
            })?;

        let truncated = prefix_chars(content, self.config.max_content_chars);
        let prompt = format!(
            "Summarize the following academic paper's content and generate a structured \
             outline with main topics and subtopics. Format the outline as a JSON object \
             where keys are main topics and values are arrays of subtopics. Content: {truncated}"
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };
        let url = format!("{}/chat/completions", self.config.api_base);
        let url = url.as_str();
        let request = &request;

        let started = Instant::now();
        let response: ChatResponse = self
            .retry
            .run(|| async move {
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(api_key)
                    .json(request)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::Outline {
                        message: format!("API error {status}: {body}"),
                    });
                }

                Ok(response.json::<ChatResponse>().await?)
            })
            .await?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AppError::Outline {
                message: "completion response carried no choices".to_string(),
            })?;

        let outline = extract_json(&reply)?;
        let Value::Object(outline) = outline else {
            return Err(AppError::InvalidFormat {
                message: "outline must be a JSON object of topics to subtopic lists".to_string(),
            });
        };

        let code = mermaid::flowchart_from_outline(&outline);
        self.cache.set(&cache_key, code.clone());
        metrics::record_outline(started.elapsed().as_secs_f64());
        debug!(topics = outline.len(), "flowchart generated");

        Ok(code)
    }
}

/// First `max_chars` characters, respecting char boundaries
fn prefix_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Parse the reply as JSON, falling back to the first embedded `{...}` block
fn extract_json(content: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(value);
    }

    static OBJECT_RE: OnceLock<Regex> = OnceLock::new();
    let re = OBJECT_RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid literal regex"));

    match re.find(content) {
        Some(found) => serde_json::from_str(found.as_str()).map_err(|e| AppError::InvalidFormat {
            message: format!("embedded outline is not valid JSON: {e}"),
        }),
        None => Err(AppError::InvalidFormat {
            message: "completion reply contains no JSON object".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: Option<&str>) -> OutlineClient {
        let config = OutlineConfig {
            api_key: api_key.map(str::to_string),
            api_base: "https://api.perplexity.ai".to_string(),
            model: "llama-3.1-sonar-large-128k-online".to_string(),
            timeout_secs: 30,
            max_content_chars: 5000,
            max_tokens: 2000,
            temperature: 0.2,
        };
        OutlineClient::new(
            config,
            RetryPolicy::default(),
            Arc::new(MemoryCache::new(Duration::from_secs(300))),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected() {
        let err = client(Some("key"))
            .generate_flowchart("   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_a_configuration_error() {
        let err = client(None)
            .generate_flowchart("Some paper content")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_extract_json_parses_a_plain_object() {
        let value = extract_json(r#"{"Topic": ["a", "b"]}"#).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_extract_json_recovers_object_embedded_in_prose() {
        let reply = "Here is the outline you asked for:\n{\"Topic\": [\"a\"]}\nHope it helps!";
        let value = extract_json(reply).unwrap();
        assert_eq!(value["Topic"][0], "a");
    }

    #[test]
    fn test_extract_json_rejects_reply_without_object() {
        let err = extract_json("no json here").unwrap_err();
        assert!(matches!(err, AppError::InvalidFormat { .. }));
    }

    #[test]
    fn test_prefix_chars_respects_char_boundaries() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("ab", 10), "ab");
    }
}
