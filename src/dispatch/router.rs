//! Trigger routing.
//!
//! Built-in agents belong to a fixed, code-defined set and go through
//! workflow dispatch; anything else is an externally registered agent and
//! goes through repository dispatch with the thread context attached. Both
//! paths are fire-and-forget: a failed call comes back as `triggered: false`
//! and a WARN log, never as an error and never retried.

use std::sync::Arc;

use tracing::{info, warn};

use crate::dispatch::ports::{DispatchMechanism, DispatchOutcome, TriggerPort};

/// The fixed set of system-provided agent names.
pub const BUILTIN_AGENTS: [&str; 9] = [
    "moderator",
    "reviewer_a",
    "reviewer_b",
    "summarizer",
    "echo",
    "observer",
    "arxiv_observer",
    "pubmed_observer",
    "video_manim",
];

pub fn is_builtin_agent(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    let lowered = name.to_ascii_lowercase();
    BUILTIN_AGENTS.contains(&lowered.as_str())
}

pub struct DispatchRouter {
    trigger: Arc<dyn TriggerPort>,
}

impl DispatchRouter {
    pub fn new(trigger: Arc<dyn TriggerPort>) -> Self {
        Self { trigger }
    }

    /// Trigger `agent` against the thread, picking the mechanism from the
    /// agent's classification.
    pub async fn dispatch(
        &self,
        agent: &str,
        issue: u64,
        title: &str,
        body: &str,
    ) -> DispatchOutcome {
        let (mechanism, attempt) = if is_builtin_agent(agent) {
            (
                DispatchMechanism::Workflow,
                self.trigger.run_workflow(agent, issue).await,
            )
        } else {
            (
                DispatchMechanism::Repository,
                self.trigger
                    .repository_dispatch(agent, issue, title, body)
                    .await,
            )
        };

        let triggered = match attempt {
            Ok(()) => {
                info!(agent = %agent, issue, mechanism = ?mechanism, "agent triggered");
                true
            }
            Err(err) => {
                warn!(agent = %agent, issue, mechanism = ?mechanism, error = %err, "trigger failed");
                false
            }
        };

        DispatchOutcome {
            target: agent.to_string(),
            mechanism,
            triggered,
        }
    }
}
