use crate::types::{CuratorError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";

#[derive(Debug, Clone, Default)]
pub struct OracleUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct OracleCompletion {
    pub text: String,
    pub usage: OracleUsage,
}

/// The text-understanding service the extractor talks to. A trusted but
/// fallible collaborator: transport and protocol failures surface as
/// recoverable errors.
#[async_trait]
pub trait ExtractionOracle: Send + Sync {
    fn oracle_name(&self) -> String;

    fn model_id(&self) -> String;

    /// Submit a prompt and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<OracleCompletion>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Chat-completions backed oracle.
pub struct OpenRouterOracle {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenRouterOracle {
    /// Fails with `MissingCredential` when no key is configured; this is
    /// the one fatal error of a curation run and is raised before any
    /// fetching starts.
    pub fn new(api_key: impl Into<String>, model: Option<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CuratorError::MissingCredential);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_tokens: 3000,
            temperature: 0.2,
        })
    }
}

#[async_trait]
impl ExtractionOracle for OpenRouterOracle {
    fn oracle_name(&self) -> String {
        format!("OpenRouter ({})", self.model)
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }

    async fn complete(&self, prompt: &str) -> Result<OracleCompletion> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| CuratorError::Oracle(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CuratorError::Oracle(format!("HTTP {}", response.status())));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CuratorError::Oracle(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let usage = parsed
            .usage
            .map(|u| OracleUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!("Oracle replied with {} chars", text.len());
        Ok(OracleCompletion { text, usage })
    }
}

/// Mock oracle for development and testing.
pub struct MockOracle {
    reply: String,
    fail: bool,
    response_delay_ms: u64,
    calls: AtomicUsize,
}

impl MockOracle {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            fail: false,
            response_delay_ms: 0,
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock whose every call fails, exercising passthrough fallbacks.
    pub fn failing() -> Self {
        Self {
            reply: String::new(),
            fail: true,
            response_delay_ms: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.response_delay_ms = delay_ms;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExtractionOracle for MockOracle {
    fn oracle_name(&self) -> String {
        "Mock Oracle".to_string()
    }

    fn model_id(&self) -> String {
        "mock".to_string()
    }

    async fn complete(&self, prompt: &str) -> Result<OracleCompletion> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.response_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
        }

        if self.fail {
            return Err(CuratorError::Oracle("mock oracle unavailable".to_string()));
        }

        Ok(OracleCompletion {
            text: self.reply.clone(),
            usage: OracleUsage {
                input_tokens: (prompt.len() / 4) as u64,
                output_tokens: (self.reply.len() / 4) as u64,
            },
        })
    }
}
