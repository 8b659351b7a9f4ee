//! LLM Client: unified interface for Ollama and OpenAI-compatible backends.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use pantry_core::config::LlmConfig;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::types::{LlmRequest, LlmResponse};

/// Anything that can turn a prompt into text.
///
/// [`LlmClient`] is the production implementation; tests substitute scripted
/// generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `request`.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Model name used for logging.
    fn model_name(&self) -> &str;
}

/// Provider backend for LLM inference.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally (recommended).
    Ollama { base_url: String },
    /// OpenAI-compatible API.
    OpenAiCompatible { base_url: String, api_key: String },
    /// No LLM available: all calls return `Unavailable`.
    None,
}

impl LlmProvider {
    /// Build a provider from the `[llm]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigError`] for an unknown provider name or an
    /// OpenAI-compatible provider without an API key.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        match config.provider.as_str() {
            "ollama" => Ok(Self::Ollama { base_url }),
            "openai" => {
                if config.api_key.is_empty() {
                    return Err(LlmError::ConfigError(
                        "openai provider requires llm.api_key".into(),
                    ));
                }
                Ok(Self::OpenAiCompatible {
                    base_url,
                    api_key: config.api_key.clone(),
                })
            }
            "none" => Ok(Self::None),
            other => Err(LlmError::ConfigError(format!("unknown llm provider '{other}'"))),
        }
    }
}

/// The main LLM client that routes requests to the configured backend.
#[derive(Debug)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
    max_retries: u32,
}

impl LlmClient {
    /// Create a new LLM client.
    #[must_use]
    pub fn new(provider: LlmProvider, model: impl Into<String>, max_retries: u32) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
            max_retries,
        }
    }

    /// Create a client from the `[llm]` config section.
    ///
    /// # Errors
    ///
    /// See [`LlmProvider::from_config`].
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self::new(
            LlmProvider::from_config(config)?,
            config.model.clone(),
            config.max_retries,
        ))
    }

    /// Create a client with no LLM backend (all calls fail).
    #[must_use]
    pub fn none() -> Self {
        Self::new(LlmProvider::None, String::new(), 0)
    }

    /// Endpoint URL and JSON body for `request`, or `None` without a backend.
    fn build_call(&self, request: &LlmRequest) -> Option<(String, Value)> {
        match &self.provider {
            LlmProvider::None => None,
            LlmProvider::Ollama { base_url } => Some((
                format!("{base_url}/api/generate"),
                json!({
                    "model": self.model,
                    "prompt": request.user,
                    "stream": false,
                    "options": {
                        "temperature": request.temperature,
                        "num_predict": request.max_tokens,
                    }
                }),
            )),
            LlmProvider::OpenAiCompatible { base_url, .. } => Some((
                format!("{base_url}/v1/chat/completions"),
                json!({
                    "model": self.model,
                    "messages": [{ "role": "user", "content": request.user }],
                    "max_tokens": request.max_tokens,
                    "temperature": request.temperature,
                }),
            )),
        }
    }

    /// Pull `(text, tokens)` out of a successful response body.
    fn extract(&self, body: &Value) -> (String, u32) {
        let (text, tokens) = match self.provider {
            LlmProvider::OpenAiCompatible { .. } => (
                &body["choices"][0]["message"]["content"],
                &body["usage"]["completion_tokens"],
            ),
            _ => (&body["response"], &body["eval_count"]),
        };
        (
            text.as_str().unwrap_or_default().to_string(),
            tokens
                .as_u64()
                .and_then(|t| u32::try_from(t).ok())
                .unwrap_or(0),
        )
    }

    /// Generate a response from the LLM.
    ///
    /// Makes `1 + max_retries` attempts with a short pause between them.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Unavailable`] without a backend or when the provider
    ///   cannot be reached.
    /// - [`LlmError::Timeout`] when the call outlives `request.timeout_ms`.
    /// - [`LlmError::RequestFailed`] for a non-success HTTP status.
    /// - [`LlmError::ParseError`] for a non-JSON success body.
    ///
    /// With retries configured, a final failure is wrapped in
    /// [`LlmError::RetriesExhausted`].
    pub async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let Some((url, body)) = self.build_call(request) else {
            return Err(LlmError::Unavailable("No LLM provider configured".into()));
        };

        let mut attempt = 0;
        loop {
            match self.attempt(&url, &body, request).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %err, "LLM call failed, retrying");
                    tokio::time::sleep(Duration::from_millis(250 * u64::from(attempt))).await;
                }
                Err(err) if self.max_retries == 0 => {
                    warn!(error = %err, "LLM call failed");
                    return Err(err);
                }
                Err(err) => {
                    warn!(error = %err, "LLM call failed");
                    return Err(LlmError::RetriesExhausted {
                        attempts: self.max_retries + 1,
                        last_error: err.to_string(),
                    });
                }
            }
        }
    }

    /// One HTTP round trip.
    async fn attempt(&self, url: &str, body: &Value, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut call = self
            .http
            .post(url)
            .json(body)
            .timeout(Duration::from_millis(request.timeout_ms));
        if let LlmProvider::OpenAiCompatible { api_key, .. } = &self.provider {
            call = call.bearer_auth(api_key);
        }

        let start = Instant::now();
        let resp = call.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(request.timeout_ms)
            } else {
                LlmError::from(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {detail}")));
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let (text, tokens_generated) = self.extract(&json);

        debug!(
            model = %self.model,
            tokens = tokens_generated,
            latency_ms,
            "LLM call succeeded"
        );
        Ok(LlmResponse {
            text,
            tokens_generated,
            latency_ms,
            model: self.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        LlmClient::generate(self, request).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.into(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn provider_from_config() {
        assert!(matches!(
            LlmProvider::from_config(&config("ollama")),
            Ok(LlmProvider::Ollama { .. })
        ));
        assert!(matches!(LlmProvider::from_config(&config("none")), Ok(LlmProvider::None)));
        assert!(matches!(
            LlmProvider::from_config(&config("openai")),
            Err(LlmError::ConfigError(_))
        ));
        assert!(matches!(
            LlmProvider::from_config(&config("llamacpp")),
            Err(LlmError::ConfigError(_))
        ));

        let openai = LlmConfig {
            api_key: "sk-test".into(),
            base_url: "https://api.example.com/".into(),
            ..config("openai")
        };
        let Ok(LlmProvider::OpenAiCompatible { base_url, .. }) = LlmProvider::from_config(&openai)
        else {
            panic!("expected openai provider");
        };
        assert_eq!(base_url, "https://api.example.com");
    }

    #[test]
    fn ollama_body_shape() {
        let client = LlmClient::from_config(&config("ollama")).expect("client");
        let request = LlmRequest::new("Make soup").with_max_tokens(64);
        let (url, body) = client.build_call(&request).expect("call");
        assert_eq!(url, "http://localhost:11434/api/generate");
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "Make soup");
        assert_eq!(body["stream"], false);
        assert_eq!(body["options"]["num_predict"], 64);
    }

    #[test]
    fn openai_body_shape() {
        let client = LlmClient::new(
            LlmProvider::OpenAiCompatible {
                base_url: "http://127.0.0.1:8080".into(),
                api_key: "k".into(),
            },
            "gpt-test",
            0,
        );
        let (url, body) = client
            .build_call(&LlmRequest::new("Make soup"))
            .expect("call");
        assert_eq!(url, "http://127.0.0.1:8080/v1/chat/completions");
        assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["messages"][0]["content"], "Make soup");
    }

    #[test]
    fn extract_reads_provider_fields() {
        let ollama = LlmClient::from_config(&config("ollama")).expect("client");
        let (text, tokens) = ollama.extract(&json!({ "response": "Soup", "eval_count": 3 }));
        assert_eq!((text.as_str(), tokens), ("Soup", 3));

        let openai = LlmClient::new(
            LlmProvider::OpenAiCompatible { base_url: String::new(), api_key: "k".into() },
            "m",
            0,
        );
        let (text, tokens) = openai.extract(&json!({
            "choices": [{ "message": { "content": "Stew" } }],
            "usage": { "completion_tokens": 9 }
        }));
        assert_eq!((text.as_str(), tokens), ("Stew", 9));

        let (text, tokens) = ollama.extract(&json!({}));
        assert_eq!((text.as_str(), tokens), ("", 0));
    }

    #[tokio::test]
    async fn none_provider_is_unavailable() {
        let client = LlmClient::none();
        let err = client
            .generate(&LlmRequest::new("anything"))
            .await
            .expect_err("no backend");
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    fn unreachable(max_retries: u32) -> LlmClient {
        LlmClient::new(
            LlmProvider::Ollama { base_url: "http://127.0.0.1:9".into() },
            "llama3",
            max_retries,
        )
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let err = unreachable(0)
            .generate(&LlmRequest::new("anything").with_timeout(2000))
            .await
            .expect_err("nothing listens on the discard port");
        assert!(matches!(err, LlmError::Unavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn retries_wrap_the_last_transport_error() {
        let err = unreachable(1)
            .generate(&LlmRequest::new("anything").with_timeout(2000))
            .await
            .expect_err("nothing listens on the discard port");
        let LlmError::RetriesExhausted { attempts, last_error } = err else {
            panic!("expected RetriesExhausted, got {err:?}");
        };
        assert_eq!(attempts, 2);
        assert!(last_error.starts_with("LLM provider unavailable"));
    }
}
