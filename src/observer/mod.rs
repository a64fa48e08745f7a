pub mod parsers;

pub use parsers::{ObserverDecision, default_trigger_comment, parse_observer_decision};

use std::sync::Arc;

use crate::{
    pipeline::{
        error::PromptError,
        ports::{PromptRequest, PromptRunnerPort},
    },
    registry::AgentCatalog,
};

const OBSERVER_AGENT: &str = "observer";

/// Single-shot analysis agent that decides whether a thread needs another
/// agent's attention, and which one.
pub struct Observer {
    runner: Arc<dyn PromptRunnerPort>,
    catalog: Arc<AgentCatalog>,
}

impl Observer {
    pub fn new(runner: Arc<dyn PromptRunnerPort>, catalog: Arc<AgentCatalog>) -> Self {
        Self { runner, catalog }
    }

    /// Analyze one thread and parse the trigger decision out of the reply.
    pub async fn analyze(
        &self,
        issue: u64,
        title: &str,
        context: &str,
        comments: &str,
    ) -> Result<ObserverDecision, PromptError> {
        let system_prompt = self
            .catalog
            .get(OBSERVER_AGENT)
            .map(|spec| spec.prompt.clone())
            .unwrap_or_default();

        let prompt = observer_prompt(issue, title, context, comments, &self.catalog);
        let reply = self
            .runner
            .execute(
                PromptRequest::new(OBSERVER_AGENT, prompt).with_system_prompt(system_prompt),
            )
            .await?;

        Ok(parse_observer_decision(&reply.response))
    }
}

fn observer_prompt(
    issue: u64,
    title: &str,
    context: &str,
    comments: &str,
    catalog: &AgentCatalog,
) -> String {
    let mut prompt = format!(
        "Analyze issue #{issue} and decide whether one of the registered agents \
         should be triggered.\n\n**Title**: {title}\n\n**Body**:\n{context}\n"
    );
    if !comments.is_empty() {
        prompt.push_str(&format!("\n**Comments**:\n{comments}\n"));
    }
    prompt.push_str(&format!(
        "\nAvailable agents:\n\n{}\n\
         Reply with a fenced yaml block containing `should_trigger` (bool), \
         `agent`, `comment`, `reason`, and `analysis`.",
        agent_matrix_markdown(catalog)
    ));
    prompt
}

/// A markdown table of agents, consumed by the observer prompt and the
/// `list-agents` command.
pub fn agent_matrix_markdown(catalog: &AgentCatalog) -> String {
    let mut lines = vec![
        "| Agent | Description | Trigger Conditions |".to_string(),
        "| --- | --- | --- |".to_string(),
    ];
    for (name, spec) in catalog.iter() {
        let conditions = match &spec.trigger_conditions {
            Some(conditions) if !conditions.is_empty() => conditions.join(", "),
            _ => "auto-detect".to_string(),
        };
        lines.push(format!("| {name} | {} | {conditions} |", spec.description));
    }
    lines.join("\n")
}
