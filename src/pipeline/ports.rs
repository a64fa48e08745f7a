//! Port into the opaque prompt-execution capability.

use async_trait::async_trait;

use crate::pipeline::{error::PromptError, types::UsageStats};

/// One prompt-execution call. `stage` qualifies the call for staged runs;
/// single-shot calls and the Judge stage leave it unset.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub agent: String,
    pub system_prompt: String,
    pub prompt: String,
    pub stage: Option<String>,
}

impl PromptRequest {
    pub fn new(agent: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            system_prompt: String::new(),
            prompt: prompt.into(),
            stage: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct PromptReply {
    pub response: String,
    pub usage: UsageStats,
}

#[async_trait]
pub trait PromptRunnerPort: Send + Sync {
    async fn execute(&self, req: PromptRequest) -> Result<PromptReply, PromptError>;
}
