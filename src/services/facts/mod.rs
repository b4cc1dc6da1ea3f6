// Facts API client for lens blurbs
// Speaks the Cerebras Cloud SDK compatible chat-completions API.
// Single attempt per request; every failure is reported to the caller as-is.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::core::config::FactsApiConfig;
use crate::core::errors::FactsError;
use crate::core::types::FactsResult;
use crate::lens::BuiltPrompt;
use crate::sanitize::coerce_text;
use crate::utils::Metrics;

/// Facts API endpoint
const FACTS_API_URL: &str = "https://api.cerebras.ai/v1/chat/completions";

/// First `{` through last `}` across the whole response, newlines included.
static JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Facts API client
pub struct FactsClient {
    api_key: String,
    http_client: reqwest::Client,
    model: String,
    max_completion_tokens: u32,
    temperature: f32,
    metrics: Option<Metrics>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    max_completion_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

impl FactsClient {
    /// Create a new facts client
    pub fn new(config: &FactsApiConfig, metrics: Option<Metrics>) -> anyhow::Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("Facts API key is required (set CEREBRAS_API_KEY)");
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            http_client,
            model: config.model.clone(),
            max_completion_tokens: config.max_completion_tokens,
            temperature: config.temperature,
            metrics,
        })
    }

    /// Ask the model for the equation/explanation/guide blurb for one object.
    ///
    /// The reply is free text; the first JSON object found inside it is
    /// extracted and parsed. No retries: a content failure goes straight back
    /// to the caller.
    pub async fn generate_facts(
        &self,
        built: &BuiltPrompt,
        object_name: &str,
    ) -> Result<FactsResult, FactsError> {
        info!("Facts: requesting blurb for '{}'", object_name);

        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: built.system_instruction.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: built.prompt.clone(),
                },
            ],
            stream: false,
            max_completion_tokens: self.max_completion_tokens,
            temperature: self.temperature,
        };

        let start = Instant::now();

        let response = self
            .http_client
            .post(FACTS_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if let Some(ref m) = self.metrics {
                m.record_facts_call(false, start.elapsed(), 0, 0);
            }
            return Err(FactsError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let data: ChatCompletionResponse = response.json().await?;
        let elapsed = start.elapsed();

        let (input_tokens, output_tokens) = data
            .usage
            .as_ref()
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        if let Some(ref m) = self.metrics {
            m.record_facts_call(true, elapsed, input_tokens, output_tokens);
        }

        let content = data
            .choices
            .first()
            .map(|c| c.message.content.trim())
            .ok_or(FactsError::EmptyChoices)?;

        debug!(
            "Facts: {} chars of model output in {:.2}s",
            content.len(),
            elapsed.as_secs_f64()
        );

        let parsed = extract_json_object(content)?;
        Ok(facts_from_value(&parsed, object_name))
    }
}

/// Locate and parse the first JSON-shaped substring of a free-text reply.
///
/// Matches greedily from the first `{` to the last `}`. No braces at all is a
/// content error; malformed JSON between them is a parse error.
pub fn extract_json_object(text: &str) -> Result<Value, FactsError> {
    let matched = JSON_OBJECT.find(text).ok_or(FactsError::NoJsonObject)?;
    serde_json::from_str(matched.as_str()).map_err(FactsError::JsonParseFailed)
}

/// Build a `FactsResult` from the extracted object, tolerating missing or
/// non-string fields. The object name falls back to the request's.
pub fn facts_from_value(value: &Value, fallback_object: &str) -> FactsResult {
    let field = |key: &str| value.get(key).map(coerce_text).unwrap_or_default();

    let object = field("object");
    FactsResult {
        object: if object.is_empty() {
            fallback_object.to_string()
        } else {
            object
        },
        equation: field("equation"),
        explanation: field("explanation"),
        guide: value.get("guide").map(coerce_text).filter(|g| !g.is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_prose() {
        let text = "Sure! Here is the data you asked for:\n\
                    {\"object\": \"bottle\", \"equation\": \"V = pi*r^2*h\"}\n\
                    Let me know if you need anything else.";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["object"], "bottle");
        assert_eq!(value["equation"], "V = pi*r^2*h");
    }

    #[test]
    fn test_extract_json_spans_first_to_last_brace() {
        // Nested objects survive because the match is greedy.
        let text = "prefix {\"a\": {\"b\": 1}, \"c\": 2} suffix";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["a"]["b"], 1);
        assert_eq!(value["c"], 2);
    }

    #[test]
    fn test_extract_json_no_braces() {
        assert!(matches!(
            extract_json_object("the model rambled with no JSON at all"),
            Err(FactsError::NoJsonObject)
        ));
    }

    #[test]
    fn test_extract_json_malformed() {
        assert!(matches!(
            extract_json_object("{\"object\": \"bottle\", }"),
            Err(FactsError::JsonParseFailed(_))
        ));
    }

    #[test]
    fn test_facts_from_value_tolerates_shapes() {
        let value: Value = serde_json::from_str(
            r#"{"object": "cup", "equation": ["V", "=", "pi*r^2*h"], "explanation": null}"#,
        )
        .unwrap();
        let facts = facts_from_value(&value, "fallback");
        assert_eq!(facts.object, "cup");
        assert_eq!(facts.equation, "V = pi*r^2*h");
        assert_eq!(facts.explanation, "");
        assert!(facts.guide.is_none());
    }

    #[test]
    fn test_facts_from_value_object_fallback() {
        let value: Value = serde_json::from_str(r#"{"equation": "F = m*a"}"#).unwrap();
        let facts = facts_from_value(&value, "ball");
        assert_eq!(facts.object, "ball");
        assert_eq!(facts.equation, "F = m*a");
    }
}
