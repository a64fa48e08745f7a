//! Test doubles for the prompt-execution port.

use std::{future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;

use crate::pipeline::{
    error::PromptError,
    ports::{PromptReply, PromptRequest, PromptRunnerPort},
};

type RunnerFuture = Pin<Box<dyn Future<Output = Result<PromptReply, PromptError>> + Send>>;

/// A closure standing in for the prompt-execution capability.
pub type RunnerHook = Arc<dyn Fn(PromptRequest) -> RunnerFuture + Send + Sync>;

pub fn boxed<T>(
    future: impl Future<Output = T> + Send + 'static,
) -> Pin<Box<dyn Future<Output = T> + Send>>
where
    T: Send + 'static,
{
    Box::pin(future)
}

/// Port implementation backed by a [`RunnerHook`].
pub struct HookRunner {
    hook: RunnerHook,
}

impl HookRunner {
    pub fn new(hook: RunnerHook) -> Self {
        Self { hook }
    }

    pub fn shared(hook: RunnerHook) -> Arc<Self> {
        Arc::new(Self::new(hook))
    }
}

#[async_trait]
impl PromptRunnerPort for HookRunner {
    async fn execute(&self, req: PromptRequest) -> Result<PromptReply, PromptError> {
        (self.hook)(req).await
    }
}
