//! Shared LLM client
//!
//! Wraps a `rig` OpenAI client pointed at the configured endpoint. Structured
//! answers go through rig's extractor; when the endpoint cannot serve the
//! extractor's tool call, the same request is retried as a plain prompt with
//! the schema in the preamble and the answer is parsed leniently.

use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::config::LlmConfig;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LlmError {
    #[error("Failed to create LLM client: {0}")]
    Client(String),

    #[error("LLM request failed: {0}")]
    Completion(String),

    #[error("LLM response contained no content")]
    EmptyResponse,

    #[error("LLM response was not valid JSON: {0}")]
    InvalidJson(String),
}

#[derive(Clone)]
enum Backend {
    OpenAi(openai::Client),
    #[cfg(test)]
    Scripted(std::sync::Arc<testing::ScriptedChatModel>),
}

/// Shared LLM client wrapper
#[derive(Clone)]
pub struct LlmClient {
    backend: Backend,
    model_name: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl LlmClient {
    /// Build a client for the configured OpenAI-compatible endpoint
    pub fn from_config(config: &LlmConfig, api_key: &str) -> Result<Self, LlmError> {
        let client = openai::Client::builder()
            .api_key(api_key)
            .base_url(config.api_url.trim_end_matches('/'))
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        tracing::info!(
            model = %config.model,
            api_url = %config.api_url,
            "LLM client initialized"
        );

        Ok(Self {
            backend: Backend::OpenAi(client),
            model_name: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Completion parsed into `T`
    pub async fn complete_json<T>(&self, system: &str, prompt: &str) -> Result<T, LlmError>
    where
        T: DeserializeOwned + Serialize + JsonSchema + Send + Sync + 'static,
    {
        let start_time = std::time::Instant::now();
        let prompt_length = prompt.len();

        let result = match &self.backend {
            Backend::OpenAi(client) => self.extract_or_prompt::<T>(client, system, prompt).await,
            #[cfg(test)]
            Backend::Scripted(model) => model
                .complete(&testing::ChatRequest {
                    system: json_preamble::<T>(system),
                    prompt: prompt.to_string(),
                })
                .and_then(|raw| parse_json_response::<T>(&raw)),
        };

        match &result {
            Ok(_) => tracing::debug!(
                model = %self.model_name,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                prompt_length,
                "LLM call completed"
            ),
            Err(e) => tracing::warn!(
                model = %self.model_name,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                prompt_length,
                error = %e,
                "LLM call failed"
            ),
        }
        result
    }

    async fn extract_or_prompt<T>(
        &self,
        client: &openai::Client,
        system: &str,
        prompt: &str,
    ) -> Result<T, LlmError>
    where
        T: DeserializeOwned + Serialize + JsonSchema + Send + Sync + 'static,
    {
        let extractor = client
            .extractor::<T>(&self.model_name)
            .preamble(system)
            .build();

        let extraction_error = match extractor.extract(prompt).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        tracing::debug!(
            model = %self.model_name,
            error = %extraction_error,
            "Structured extraction failed, retrying as plain prompt"
        );

        let mut agent = client
            .agent(&self.model_name)
            .preamble(&json_preamble::<T>(system))
            .temperature(f64::from(self.temperature));
        if let Some(max_tokens) = self.max_tokens {
            agent = agent.max_tokens(u64::from(max_tokens));
        }

        let raw = agent
            .build()
            .prompt(prompt)
            .await
            .map_err(|e| LlmError::Completion(e.to_string()))?;

        if raw.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        parse_json_response::<T>(&raw)
    }
}

fn json_preamble<T: JsonSchema>(system: &str) -> String {
    let schema = schemars::schema_for!(T);
    let schema = serde_json::to_string(&schema).unwrap_or_default();
    format!(
        "{}\n\nRespond with a single valid JSON object only, no prose and no Markdown. \
         The object must conform to this JSON schema:\n{}",
        system, schema
    )
}

/// Parse a model answer that may be wrapped in code fences or prose
pub fn parse_json_response<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_err) => {
            let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) else {
                return Err(LlmError::InvalidJson(first_err.to_string()));
            };
            if end <= start {
                return Err(LlmError::InvalidJson(first_err.to_string()));
            }
            serde_json::from_str(&cleaned[start..=end])
                .map_err(|e| LlmError::InvalidJson(e.to_string()))
        }
    }
}

/// Remove a surrounding ```json ... ``` fence
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
pub mod testing {
    //! Scripted model for tests

    use std::sync::Arc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ChatRequest {
        pub system: String,
        pub prompt: String,
    }

    impl ChatRequest {
        pub fn system_prompt(&self) -> &str {
            &self.system
        }

        pub fn user_prompt(&self) -> &str {
            &self.prompt
        }
    }

    type Responder = dyn Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync;

    pub struct ScriptedChatModel {
        responder: Box<Responder>,
        pub calls: std::sync::Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedChatModel {
        pub fn new(
            responder: impl Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                responder: Box::new(responder),
                calls: std::sync::Mutex::new(Vec::new()),
            })
        }

        /// A model that always fails
        pub fn unavailable() -> Arc<Self> {
            Self::new(|_| Err(LlmError::EmptyResponse))
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or_default()
        }

        pub(super) fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request.clone());
            }
            (self.responder)(request)
        }
    }

    pub fn client(model: Arc<ScriptedChatModel>) -> LlmClient {
        LlmClient {
            backend: Backend::Scripted(model),
            model_name: "scripted".to_string(),
            temperature: 0.2,
            max_tokens: None,
        }
    }
}
