//! Prompt-execution failures.
//!
//! Execution failures are typed by kind so the pipeline can tell a timeout
//! from a transport fault, and carry whatever usage the failed call managed
//! to accrue so the terminal accounting stays honest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pipeline::types::UsageStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptErrorKind {
    Timeout,
    Transport,
    RateLimited,
    Interrupted,
    Internal,
}

impl PromptErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Transport => "transport",
            Self::RateLimited => "rate_limited",
            Self::Interrupted => "interrupted",
            Self::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptError {
    pub kind: PromptErrorKind,
    pub message: String,
    pub stage: Option<String>,
    pub usage: UsageStats,
}

impl PromptError {
    pub fn new(kind: PromptErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            stage: None,
            usage: UsageStats::default(),
        }
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_usage(mut self, usage: UsageStats) -> Self {
        self.usage = usage;
        self
    }
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PromptError {}

pub fn timeout(message: impl Into<String>) -> PromptError {
    PromptError::new(PromptErrorKind::Timeout, message)
}

pub fn transport(message: impl Into<String>) -> PromptError {
    PromptError::new(PromptErrorKind::Transport, message)
}

pub fn rate_limited(message: impl Into<String>) -> PromptError {
    PromptError::new(PromptErrorKind::RateLimited, message)
}

pub fn internal(message: impl Into<String>) -> PromptError {
    PromptError::new(PromptErrorKind::Internal, message)
}
