//! Staged execution state machine.
//!
//! One agent is driven through `Researcher → Analyst → Skeptic → Synthesizer
//! → Judge`. Two gates shape the run:
//!
//! - After Researcher, the structured payload must carry a nonempty evidence
//!   list. An execution failure there fails the whole run (research is a
//!   required dependency), but a merely invalid payload degrades to a single
//!   re-issue of the original base prompt (`FallbackSingleStage`) whose
//!   result is terminal either way.
//! - After Judge, the output must cite at least one source. An empty source
//!   list earns exactly one retry with an amended prompt; the retry's output
//!   is terminal even if it is still uncited.
//!
//! Execution failures at any other stage also fail the run with the stage
//! name recorded. Usage counters from every call, including failed ones,
//! accumulate into the terminal result.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    pipeline::{
        error::PromptError,
        ports::{PromptReply, PromptRequest, PromptRunnerPort},
        prompts::{self, StageNote},
        types::{
            AgentExecutionResult, STAGE_FALLBACK, STAGE_JUDGE, STAGE_JUDGE_RETRY, STAGE_RESEARCHER,
            StageResult, UsageStats, default_intermediate_stages,
        },
    },
    response::block::{ParsedBlock, collect_source_urls, parse_review_block},
};

const FALLBACK_NOTE: &str =
    "[guardrail] staged research returned insufficient evidence; answering in a single pass.";

const NOTE_DIGEST_BUDGET: usize = 280;

pub struct StagedPipeline {
    runner: Arc<dyn PromptRunnerPort>,
    agent: String,
    system_prompt: String,
    intermediates: Vec<String>,
}

impl StagedPipeline {
    pub fn new(runner: Arc<dyn PromptRunnerPort>, agent: impl Into<String>) -> Self {
        Self {
            runner,
            agent: agent.into(),
            system_prompt: String::new(),
            intermediates: default_intermediate_stages(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_intermediates(mut self, stages: Vec<String>) -> Self {
        self.intermediates = stages;
        self
    }

    async fn call(&self, prompt: String, stage: Option<&str>) -> Result<PromptReply, PromptError> {
        let mut req = PromptRequest::new(self.agent.clone(), prompt)
            .with_system_prompt(self.system_prompt.as_str());
        if let Some(stage) = stage {
            req = req.with_stage(stage);
        }
        self.runner.execute(req).await
    }

    /// Run the state machine against `base_prompt`.
    pub async fn run(&self, base_prompt: &str) -> AgentExecutionResult {
        let mut usage = UsageStats::default();
        let mut stages: Vec<String> = Vec::new();
        let mut completed: Vec<StageResult> = Vec::new();

        // Researcher is a required dependency: an execution failure here
        // fails the run before anything else starts.
        stages.push(STAGE_RESEARCHER.to_string());
        let researcher = match self
            .call(
                prompts::researcher_prompt(base_prompt),
                Some(STAGE_RESEARCHER),
            )
            .await
        {
            Ok(reply) => stage_result(STAGE_RESEARCHER, reply),
            Err(err) => {
                warn!(agent = %self.agent, stage = STAGE_RESEARCHER, error = %err, "stage failed");
                return AgentExecutionResult::failure(err, STAGE_RESEARCHER, stages, usage);
            }
        };
        usage.absorb(&researcher.usage);

        let evidence_ok = matches!(
            &researcher.block,
            ParsedBlock::Structured(block) if block.has_evidence()
        );
        if !evidence_ok {
            debug!(agent = %self.agent, "researcher payload has no evidence, degrading");
            stages.push(STAGE_FALLBACK.to_string());
            return match self.call(base_prompt.to_string(), None).await {
                Ok(reply) => {
                    usage.absorb(&reply.usage);
                    let response = format!("{FALLBACK_NOTE}\n\n{}", reply.response);
                    AgentExecutionResult::success(response, stages, usage)
                }
                Err(err) => {
                    warn!(agent = %self.agent, stage = STAGE_FALLBACK, error = %err, "fallback failed");
                    AgentExecutionResult::failure(err, STAGE_FALLBACK, stages, usage)
                }
            };
        }
        completed.push(researcher);

        for stage in &self.intermediates {
            stages.push(stage.clone());
            let notes = stage_notes(&completed);
            let reply = match self
                .call(
                    prompts::intermediate_prompt(base_prompt, stage, &notes),
                    Some(stage.as_str()),
                )
                .await
            {
                Ok(reply) => reply,
                Err(err) => {
                    warn!(agent = %self.agent, stage = %stage, error = %err, "stage failed");
                    return AgentExecutionResult::failure(err, stage, stages, usage);
                }
            };
            usage.absorb(&reply.usage);
            completed.push(stage_result(stage, reply));
        }

        // The Judge call carries no stage annotation: its output is the final
        // user-facing text and may follow either the structured or the
        // narrative contract.
        stages.push(STAGE_JUDGE.to_string());
        let notes = stage_notes(&completed);
        let mut verdict = match self
            .call(prompts::judge_prompt(base_prompt, &notes), None)
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(agent = %self.agent, stage = STAGE_JUDGE, error = %err, "stage failed");
                return AgentExecutionResult::failure(err, STAGE_JUDGE, stages, usage);
            }
        };
        usage.absorb(&verdict.usage);

        if collect_source_urls(&verdict.response).is_empty() {
            debug!(agent = %self.agent, "judge returned no sources, retrying once");
            stages.push(STAGE_JUDGE_RETRY.to_string());
            verdict = match self
                .call(prompts::judge_retry_prompt(base_prompt, &notes), None)
                .await
            {
                Ok(reply) => {
                    usage.absorb(&reply.usage);
                    reply
                }
                Err(err) => {
                    warn!(agent = %self.agent, stage = STAGE_JUDGE_RETRY, error = %err, "retry failed");
                    return AgentExecutionResult::failure(err, STAGE_JUDGE, stages, usage);
                }
            };
            // The gate is advisory on the retry: whatever came back is final.
        }

        AgentExecutionResult::success(verdict.response, stages, usage)
    }
}

fn stage_result(stage: &str, reply: PromptReply) -> StageResult {
    let block = parse_review_block(&reply.response);
    StageResult {
        stage: stage.to_string(),
        ok: true,
        response: reply.response,
        block,
        usage: reply.usage,
    }
}

fn stage_notes(completed: &[StageResult]) -> Vec<StageNote> {
    completed
        .iter()
        .map(|result| {
            let summary = match &result.block {
                ParsedBlock::Structured(block) if !block.summary.is_empty() => {
                    block.summary.clone()
                }
                _ => {
                    let collapsed = result
                        .response
                        .split_whitespace()
                        .collect::<Vec<_>>()
                        .join(" ");
                    collapsed.chars().take(NOTE_DIGEST_BUDGET).collect()
                }
            };
            StageNote {
                stage: result.stage.clone(),
                summary,
            }
        })
        .collect()
}
