//! Concurrent multi-agent fan-out.
//!
//! One tokio task per requested agent, all awaited before returning. A task
//! failure of any shape (pipeline failure, panic, abort) is converted into
//! that agent's result value; siblings never notice. The returned map holds
//! exactly one entry per requested agent.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use tracing::{info, warn};

use crate::{
    pipeline::{
        error::{PromptError, PromptErrorKind},
        ports::{PromptRequest, PromptRunnerPort},
        prompts::build_base_prompt,
        staged::StagedPipeline,
        types::{AgentExecutionResult, STAGE_SINGLE, UsageStats},
    },
    registry::AgentCatalog,
};

/// One immutable execution request.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub issue: u64,
    pub agents: Vec<String>,
    pub context: String,
    pub comment_count: u32,
}

impl ExecutionRequest {
    pub fn new(issue: u64, agents: Vec<String>, context: impl Into<String>, comment_count: u32) -> Self {
        Self {
            issue,
            agents,
            context: context.into(),
            comment_count,
        }
    }
}

pub struct FanOutExecutor {
    runner: Arc<dyn PromptRunnerPort>,
    catalog: Arc<AgentCatalog>,
    multistage_enabled: bool,
}

impl FanOutExecutor {
    pub fn new(runner: Arc<dyn PromptRunnerPort>, catalog: Arc<AgentCatalog>) -> Self {
        Self {
            runner,
            catalog,
            multistage_enabled: true,
        }
    }

    /// Global kill-switch for staged execution; agents fall back to the
    /// single-shot path when disabled.
    pub fn with_multistage(mut self, enabled: bool) -> Self {
        self.multistage_enabled = enabled;
        self
    }

    /// Run every requested agent against the thread and collect one result
    /// per agent. Completion order is irrelevant; no agent's failure affects
    /// another's entry.
    pub async fn run_all(&self, req: &ExecutionRequest) -> BTreeMap<String, AgentExecutionResult> {
        let mut handles = Vec::new();
        let mut launched = BTreeSet::new();

        for agent in &req.agents {
            if !launched.insert(agent.clone()) {
                continue;
            }

            let base = build_base_prompt(req.issue, agent, &req.context, req.comment_count);
            let spec = self.catalog.get(agent);
            let system_prompt = spec.map(|s| s.prompt.clone()).unwrap_or_default();
            let staged = self.multistage_enabled && spec.map(|s| s.multistage).unwrap_or(false);
            let runner = Arc::clone(&self.runner);
            let name = agent.clone();

            info!(agent = %name, issue = req.issue, staged, "launching agent");
            let handle = tokio::spawn(async move {
                if staged {
                    StagedPipeline::new(runner, name)
                        .with_system_prompt(system_prompt)
                        .run(&base)
                        .await
                } else {
                    single_shot(runner, name, system_prompt, base).await
                }
            });
            handles.push((agent.clone(), handle));
        }

        let mut results = BTreeMap::new();
        for (agent, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => {
                    warn!(agent = %agent, error = %err, "agent task did not complete");
                    AgentExecutionResult::failure(
                        PromptError::new(
                            PromptErrorKind::Internal,
                            format!("agent task did not complete: {err}"),
                        ),
                        STAGE_SINGLE,
                        vec![STAGE_SINGLE.to_string()],
                        UsageStats::default(),
                    )
                }
            };
            results.insert(agent, result);
        }
        results
    }
}

async fn single_shot(
    runner: Arc<dyn PromptRunnerPort>,
    agent: String,
    system_prompt: String,
    base_prompt: String,
) -> AgentExecutionResult {
    let req = PromptRequest::new(agent, base_prompt).with_system_prompt(system_prompt);
    match runner.execute(req).await {
        Ok(reply) => AgentExecutionResult::success(
            reply.response,
            vec![STAGE_SINGLE.to_string()],
            reply.usage,
        ),
        Err(err) => AgentExecutionResult::failure(
            err,
            STAGE_SINGLE,
            vec![STAGE_SINGLE.to_string()],
            UsageStats::default(),
        ),
    }
}
