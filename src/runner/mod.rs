pub mod http;

pub use http::{HttpPromptRunner, RunnerConfig};
