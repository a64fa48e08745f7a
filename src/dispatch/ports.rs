//! Port into the external trigger mechanisms.

use async_trait::async_trait;

use crate::dispatch::error::DispatchError;

/// How a dispatch was (or would be) carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMechanism {
    /// Built-in agent, triggered through workflow dispatch.
    Workflow,
    /// Externally registered agent, triggered through repository dispatch
    /// carrying the thread title/body.
    Repository,
}

/// Result of one dispatch attempt. The router never retries; retry policy,
/// if any, belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub target: String,
    pub mechanism: DispatchMechanism,
    pub triggered: bool,
}

#[async_trait]
pub trait TriggerPort: Send + Sync {
    /// Trigger a built-in agent via workflow dispatch.
    async fn run_workflow(&self, agent: &str, issue: u64) -> Result<(), DispatchError>;

    /// Trigger a user agent via repository dispatch, carrying enough context
    /// that the remote run does not have to re-fetch the thread.
    async fn repository_dispatch(
        &self,
        agent: &str,
        issue: u64,
        title: &str,
        body: &str,
    ) -> Result<(), DispatchError>;
}
