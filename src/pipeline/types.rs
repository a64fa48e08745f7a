//! Pipeline result types.

use serde::{Deserialize, Serialize};

use crate::{
    pipeline::error::{PromptError, PromptErrorKind},
    response::block::ParsedBlock,
};

pub const STAGE_RESEARCHER: &str = "Researcher";
pub const STAGE_JUDGE: &str = "Judge";
pub const STAGE_JUDGE_RETRY: &str = "JudgeRetry";
pub const STAGE_FALLBACK: &str = "FallbackSingleStage";
pub const STAGE_SINGLE: &str = "Single";

/// The intermediate stages run between Researcher and Judge.
pub fn default_intermediate_stages() -> Vec<String> {
    vec![
        "Analyst".to_string(),
        "Skeptic".to_string(),
        "Synthesizer".to_string(),
    ]
}

/// Resource counters accumulated across prompt-execution calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub cost_usd: f64,
    pub num_turns: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub tool_calls: Vec<String>,
}

impl UsageStats {
    /// Fold another call's counters into this one.
    pub fn absorb(&mut self, other: &UsageStats) {
        self.cost_usd += other.cost_usd;
        self.num_turns += other.num_turns;
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
        self.tool_calls.extend(other.tool_calls.iter().cloned());
    }
}

/// One stage's outcome, consumed by the next stage or the aggregator.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: String,
    pub ok: bool,
    pub response: String,
    pub block: ParsedBlock,
    pub usage: UsageStats,
}

/// The terminal outcome for one agent within one execution request.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentExecutionResult {
    pub ok: bool,
    pub response: String,
    pub failed_stage: Option<String>,
    pub error_kind: Option<PromptErrorKind>,
    pub error_message: Option<String>,
    /// Stage names traversed, in order.
    pub stages: Vec<String>,
    pub usage: UsageStats,
}

impl AgentExecutionResult {
    pub fn success(response: String, stages: Vec<String>, usage: UsageStats) -> Self {
        Self {
            ok: true,
            response,
            failed_stage: None,
            error_kind: None,
            error_message: None,
            stages,
            usage,
        }
    }

    pub fn failure(
        error: PromptError,
        failed_stage: &str,
        stages: Vec<String>,
        mut usage: UsageStats,
    ) -> Self {
        usage.absorb(&error.usage);
        Self {
            ok: false,
            response: format!("[guardrail] {}", error.message),
            failed_stage: Some(failed_stage.to_string()),
            error_kind: Some(error.kind),
            error_message: Some(error.message),
            stages,
            usage,
        }
    }

    /// Compact operator-facing summary for a failed run.
    pub fn failure_summary(&self) -> String {
        let kind = self
            .error_kind
            .map(PromptErrorKind::as_str)
            .unwrap_or("unknown");
        let stage = self.failed_stage.as_deref().unwrap_or("unknown");
        format!(
            "[guardrail] agent execution failed ({kind}): {}\nfailed_stage: {stage}",
            self.error_message.as_deref().unwrap_or("no detail"),
        )
    }
}
