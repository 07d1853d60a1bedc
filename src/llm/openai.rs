use crate::config::LlmConfig;
use crate::error::{GraphRagError, Result};
use crate::graph::GraphAnalysis;
use crate::llm::prompts::{flat_prompt, graph_prompt};
use crate::llm::retry::{with_backoff, RetryPolicy};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

/// Request structure for the chat completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response structure from the chat completions API
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client
///
/// Takes a prompt built from either the flat knowledge base or a graph
/// analysis and returns generated text. Busy (503), rate-limited (429) and
/// network failures are retried with exponential backoff; every other failure
/// is returned at once.
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
    retry: RetryPolicy,
}

impl OpenAiChatClient {
    /// Create a client from the `[llm]` settings.
    pub fn new(api_key: String, settings: &LlmConfig) -> Result<Self> {
        let endpoint = settings
            .chat_completions_url()
            .map_err(|e| GraphRagError::Config(e.to_string()))?;

        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| GraphRagError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            endpoint,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            system_prompt: settings.system_prompt.clone(),
            retry: settings.retry_policy(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a prompt, retrying transient failures.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let start = std::time::Instant::now();
        let text = with_backoff(self.retry, |_| self.send_once(prompt)).await?;
        log::debug!("Chat completion took {:?}", start.elapsed());
        Ok(text)
    }

    /// Baseline answer from the flat knowledge base. Failures come back as `Error: ...`.
    pub async fn answer_flat(&self, flat_context: &str, question: &str) -> String {
        render_outcome(self.complete(&flat_prompt(flat_context, question)).await)
    }

    /// Graph-augmented answer. Failures come back as `Error: ...`.
    pub async fn answer_with_graph(&self, analysis: &GraphAnalysis, question: &str) -> String {
        render_outcome(self.complete(&graph_prompt(&analysis.render(), question)).await)
    }

    /// Make a single API request
    async fn send_once(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| GraphRagError::Transport(format!("Error making API request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(classify_status(status, &body));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| GraphRagError::Llm(format!("Failed to parse response: {}", e)))?;

        extract_text(result)
    }
}

/// Map a non-success HTTP status to the retry taxonomy.
fn classify_status(status: StatusCode, body: &str) -> GraphRagError {
    match status {
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::TOO_MANY_REQUESTS => {
            GraphRagError::ModelBusy(format!("API busy (status code {})", status.as_u16()))
        }
        _ => GraphRagError::Llm(format!(
            "API request failed with status code {}: {}",
            status.as_u16(),
            body
        )),
    }
}

fn extract_text(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .ok_or_else(|| GraphRagError::Llm("Empty response from model".to_string()))
}

fn render_outcome(outcome: Result<String>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Model call failed: {}", e);
            format!("Error: {}", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = OpenAiChatClient::new("test-key".to_string(), &LlmConfig::default()).unwrap();
        assert_eq!(client.model(), "gpt-3.5-turbo");
        assert_eq!(client.endpoint().as_str(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(client.retry, RetryPolicy::default());
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        let settings = LlmConfig {
            base_url: "::nope".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            OpenAiChatClient::new("k".to_string(), &settings),
            Err(GraphRagError::Config(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::SERVICE_UNAVAILABLE, "").is_transient());
        assert!(classify_status(StatusCode::TOO_MANY_REQUESTS, "").is_transient());
        let err = classify_status(StatusCode::UNAUTHORIZED, "bad key");
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "Language model error: API request failed with status code 401: bad key"
        );
    }

    #[test]
    fn test_extract_text() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  HER2 drives growth.\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "HER2 drives growth.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_text(empty).is_err());
    }

    #[test]
    fn test_render_outcome_as_error_string() {
        assert_eq!(render_outcome(Ok("fine".to_string())), "fine");
        let rendered = render_outcome(Err(GraphRagError::Transport("timed out".to_string())));
        assert_eq!(rendered, "Error: Transport error: timed out");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_returns_error_string() {
        let settings = LlmConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            max_attempts: 2,
            initial_backoff_ms: 1,
            timeout_secs: 2,
            ..LlmConfig::default()
        };
        let client = OpenAiChatClient::new("k".to_string(), &settings).unwrap();
        let answer = client.answer_flat("Knowledge Base:\n", "anything?").await;
        assert!(answer.starts_with("Error: "), "{}", answer);
        assert!(answer.contains("after 2 attempts"), "{}", answer);
    }
}
