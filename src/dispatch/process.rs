//! `gh`-backed trigger adapter.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::{io::AsyncWriteExt, process::Command};

use crate::dispatch::{
    error::{DispatchError, command_failed, spawn_failed},
    ports::TriggerPort,
};

const WORKFLOW_FILE: &str = "agent.yml";
const DISPATCH_EVENT_TYPE: &str = "agent-dispatch";

/// Triggers agents through the `gh` CLI, which carries its own
/// authentication from the environment.
pub struct GhTrigger {
    repository: String,
    workflow_file: String,
}

impl GhTrigger {
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            workflow_file: WORKFLOW_FILE.to_string(),
        }
    }

    pub fn with_workflow_file(mut self, workflow_file: impl Into<String>) -> Self {
        self.workflow_file = workflow_file.into();
        self
    }
}

#[async_trait]
impl TriggerPort for GhTrigger {
    async fn run_workflow(&self, agent: &str, issue: u64) -> Result<(), DispatchError> {
        let mut args = vec![
            "workflow".to_string(),
            "run".to_string(),
            self.workflow_file.clone(),
        ];
        if !self.repository.is_empty() {
            args.push("--repo".to_string());
            args.push(self.repository.clone());
        }
        args.push("-f".to_string());
        args.push(format!("agent={}", agent.to_ascii_lowercase()));
        args.push("-f".to_string());
        args.push(format!("issue_number={issue}"));

        let output = Command::new("gh")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| spawn_failed(format!("failed to run gh workflow: {err}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(command_failed(format!(
                "gh workflow run exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }

    async fn repository_dispatch(
        &self,
        agent: &str,
        issue: u64,
        title: &str,
        body: &str,
    ) -> Result<(), DispatchError> {
        if self.repository.is_empty() {
            return Err(spawn_failed(
                "no repository configured for repository dispatch",
            ));
        }

        let payload = json!({
            "event_type": DISPATCH_EVENT_TYPE,
            "client_payload": {
                "agent": agent,
                "issue_number": issue,
                "issue_title": title,
                "issue_body": body,
            }
        });

        let mut child = Command::new("gh")
            .args([
                "api",
                &format!("repos/{}/dispatches", self.repository),
                "--input",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| spawn_failed(format!("failed to run gh api: {err}")))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(payload.to_string().as_bytes())
                .await
                .map_err(|err| spawn_failed(format!("failed to write dispatch payload: {err}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| spawn_failed(format!("failed to await gh api: {err}")))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(command_failed(format!(
                "gh api dispatches exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}
