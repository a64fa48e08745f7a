pub mod error;
pub mod executor;
pub mod ports;
pub mod prompts;
pub mod staged;
pub mod testing;
pub mod types;

pub use error::{PromptError, PromptErrorKind};
pub use executor::{ExecutionRequest, FanOutExecutor};
pub use ports::{PromptReply, PromptRequest, PromptRunnerPort};
pub use staged::StagedPipeline;
pub use types::{
    AgentExecutionResult, STAGE_FALLBACK, STAGE_JUDGE, STAGE_JUDGE_RETRY, STAGE_RESEARCHER,
    STAGE_SINGLE, StageResult, UsageStats, default_intermediate_stages,
};
