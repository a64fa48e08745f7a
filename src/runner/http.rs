//! OpenAI-compatible prompt runner.
//!
//! The prompt-execution port is opaque to the pipeline; this adapter binds it
//! to a chat-completions endpoint. Credentials come from the environment, a
//! per-call deadline maps to the timeout failure kind, and usage counters are
//! read from the response with cost derived from a configured price table.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::pipeline::{
    error::{self, PromptError},
    ports::{PromptReply, PromptRequest, PromptRunnerPort},
    types::UsageStats,
};

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "MOOT_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// USD per million input tokens, for cost accounting.
    #[serde(default)]
    pub price_per_mtok_input: f64,
    /// USD per million output tokens.
    #[serde(default)]
    pub price_per_mtok_output: f64,
    /// Global kill-switch for staged execution.
    #[serde(default = "default_true")]
    pub multistage_enabled: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            price_per_mtok_input: 0.0,
            price_per_mtok_output: 0.0,
            multistage_enabled: true,
        }
    }
}

pub struct HttpPromptRunner {
    client: Client,
    config: RunnerConfig,
}

impl HttpPromptRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            client: Client::builder()
                .pool_idle_timeout(Duration::from_secs(30))
                .build()
                .expect("reqwest client must build"),
            config,
        }
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.config.api_key_env).ok().filter(|key| !key.is_empty())
    }

    fn cost_for(&self, input_tokens: u64, output_tokens: u64) -> f64 {
        input_tokens as f64 / 1_000_000.0 * self.config.price_per_mtok_input
            + output_tokens as f64 / 1_000_000.0 * self.config.price_per_mtok_output
    }
}

#[async_trait]
impl PromptRunnerPort for HttpPromptRunner {
    async fn execute(&self, req: PromptRequest) -> Result<PromptReply, PromptError> {
        let stage = req.stage.clone();
        let attach_stage = |mut err: PromptError| {
            if let Some(stage) = &stage {
                err = err.with_stage(stage.clone());
            }
            err
        };

        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let mut messages = Vec::new();
        if !req.system_prompt.is_empty() {
            messages.push(json!({"role": "system", "content": req.system_prompt}));
        }
        messages.push(json!({"role": "user", "content": req.prompt}));

        let body = json!({
            "model": self.config.model,
            "messages": messages,
        });

        let mut builder = self
            .client
            .post(url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body);
        if let Some(key) = self.api_key() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        debug!(agent = %req.agent, stage = ?req.stage, "prompt call started");

        let response = builder.send().await.map_err(|err| {
            if err.is_timeout() {
                attach_stage(error::timeout(format!("prompt call timed out: {err}")))
            } else {
                attach_stage(error::transport(format!("prompt call failed: {err}")))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let err = if status == StatusCode::TOO_MANY_REQUESTS {
                error::rate_limited(format!("backend rate limited: {detail}"))
            } else {
                error::transport(format!("backend returned {status}: {detail}"))
            };
            return Err(attach_stage(err));
        }

        let payload: Value = response.json().await.map_err(|err| {
            attach_stage(error::transport(format!("malformed backend response: {err}")))
        })?;

        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let tool_calls: Vec<String> = payload["choices"][0]["message"]["tool_calls"]
            .as_array()
            .map(|calls| {
                calls
                    .iter()
                    .filter_map(|call| call["function"]["name"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let input_tokens = payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0);
        let output_tokens = payload["usage"]["completion_tokens"].as_u64().unwrap_or(0);
        let total_tokens = payload["usage"]["total_tokens"]
            .as_u64()
            .unwrap_or(input_tokens + output_tokens);

        Ok(PromptReply {
            response: text,
            usage: UsageStats {
                cost_usd: self.cost_for(input_tokens, output_tokens),
                num_turns: 1,
                input_tokens,
                output_tokens,
                total_tokens,
                tool_calls,
            },
        })
    }
}
