//! Issue-tracker surface, backed by the `gh` CLI.
//!
//! Reads return typed results; writes are fire-and-forget booleans like the
//! dispatch layer: a failed post is logged, not raised. Comment bodies pass
//! through the length budget and the controlled mention footer before they
//! leave the process.

use std::{fmt, process::Stdio};

use serde_json::Value;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{error, info};

use crate::{
    mention::{
        extract::{extract_mentions, mention_names},
        policy::{MentionPolicy, filter_mentions},
    },
    response::truncate::{MAX_COMMENT_LENGTH, truncate_text},
};

/// Footer line under which mentions are allowed to stay `@`-spelled. Only
/// this controlled footer is ever parsed back for mentions; plain-text `@`
/// elsewhere in a body never re-triggers anyone.
const FOOTER_PREFIX: &str = "相关人员:";

/// Only the summarizer may close a thread, and only by explicit marker.
const CLOSE_MARKER: &str = "[CLOSE]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceErrorKind {
    Spawn,
    CommandFailed,
    Malformed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub kind: SurfaceErrorKind,
    pub message: String,
}

impl SurfaceError {
    fn new(kind: SurfaceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SurfaceError {}

#[derive(Debug, Clone, Default)]
pub struct IssueInfo {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub comments: String,
    pub comment_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    Add,
    Remove,
}

pub struct GhIssueSurface {
    repository: Option<String>,
    policy: MentionPolicy,
    footer_max_mentions: usize,
}

impl GhIssueSurface {
    pub fn new(policy: MentionPolicy, footer_max_mentions: usize) -> Self {
        Self {
            repository: None,
            policy,
            footer_max_mentions,
        }
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    fn repo_args(&self) -> Vec<String> {
        match &self.repository {
            Some(repo) => vec!["--repo".to_string(), repo.clone()],
            None => Vec::new(),
        }
    }

    /// Fetch an issue's metadata and its comments as joined text.
    pub async fn issue_info(&self, issue: u64) -> Result<IssueInfo, SurfaceError> {
        let mut args = vec![
            "issue".to_string(),
            "view".to_string(),
            issue.to_string(),
            "--json".to_string(),
            "number,title,body,labels,comments".to_string(),
        ];
        args.extend(self.repo_args());

        let output = Command::new("gh")
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| {
                SurfaceError::new(SurfaceErrorKind::Spawn, format!("failed to run gh: {err}"))
            })?;

        if !output.status.success() {
            return Err(SurfaceError::new(
                SurfaceErrorKind::CommandFailed,
                format!(
                    "gh issue view exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let value: Value = serde_json::from_slice(&output.stdout).map_err(|err| {
            SurfaceError::new(
                SurfaceErrorKind::Malformed,
                format!("gh issue view returned malformed json: {err}"),
            )
        })?;

        let comments: Vec<String> = value["comments"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry["body"].as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(IssueInfo {
            number: value["number"].as_u64().unwrap_or(issue),
            title: value["title"].as_str().unwrap_or_default().to_string(),
            body: value["body"].as_str().unwrap_or_default().to_string(),
            labels: value["labels"]
                .as_array()
                .map(|labels| {
                    labels
                        .iter()
                        .filter_map(|label| label["name"].as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            comment_count: comments.len() as u32,
            comments: comments.join("\n\n---\n\n"),
        })
    }

    /// Post a comment, rebuilding the controlled mention footer and applying
    /// the length budget. Explicit `mentions` bypass body parsing entirely.
    pub async fn post_comment(
        &self,
        issue: u64,
        body: &str,
        mentions: Option<&[String]>,
    ) -> bool {
        let stripped = strip_controlled_footer(body);

        let candidates: Vec<String> = match mentions {
            Some(explicit) => explicit.to_vec(),
            None => controlled_footer_mentions(body),
        };

        let mut footer_mentions = Vec::new();
        if !candidates.is_empty() {
            let joined = candidates
                .iter()
                .map(|name| format!("@{name}"))
                .collect::<Vec<_>>()
                .join(" ");
            let decision = filter_mentions(extract_mentions(&joined), &self.policy, Some(issue));
            footer_mentions = decision
                .allowed_names()
                .into_iter()
                .take(self.footer_max_mentions)
                .collect();
        }

        let mut full = stripped;
        if !footer_mentions.is_empty() {
            let spelled = footer_mentions
                .iter()
                .map(|name| format!("@{name}"))
                .collect::<Vec<_>>()
                .join(" ");
            full = format!("{}\n\n---\n{FOOTER_PREFIX} {spelled}", full.trim_end());
        }

        let truncated = truncate_text(&full, MAX_COMMENT_LENGTH);
        self.send_comment(issue, &truncated).await
    }

    async fn send_comment(&self, issue: u64, body: &str) -> bool {
        let mut args = vec![
            "issue".to_string(),
            "comment".to_string(),
            issue.to_string(),
            "--body-file".to_string(),
            "-".to_string(),
        ];
        args.extend(self.repo_args());

        let child = Command::new("gh")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(err) => {
                error!(issue, error = %err, "failed to run gh issue comment");
                return false;
            }
        };

        if let Some(stdin) = child.stdin.as_mut() {
            if let Err(err) = stdin.write_all(body.as_bytes()).await {
                error!(issue, error = %err, "failed to write comment body");
                return false;
            }
        }

        match child.wait_with_output().await {
            Ok(output) if output.status.success() => {
                info!(issue, "comment posted");
                true
            }
            Ok(output) => {
                error!(
                    issue,
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "gh issue comment failed"
                );
                false
            }
            Err(err) => {
                error!(issue, error = %err, "failed to await gh issue comment");
                false
            }
        }
    }

    pub async fn close_issue(&self, issue: u64) -> bool {
        let mut args = vec![
            "issue".to_string(),
            "close".to_string(),
            issue.to_string(),
            "--reason".to_string(),
            "completed".to_string(),
        ];
        args.extend(self.repo_args());
        self.run_bool("gh issue close", &args, issue).await
    }

    pub async fn update_label(&self, issue: u64, label: &str, action: LabelAction) -> bool {
        let flag = match action {
            LabelAction::Add => "--add-label",
            LabelAction::Remove => "--remove-label",
        };
        let mut args = vec![
            "issue".to_string(),
            "edit".to_string(),
            issue.to_string(),
            flag.to_string(),
            label.to_string(),
        ];
        args.extend(self.repo_args());
        self.run_bool("gh issue edit", &args, issue).await
    }

    async fn run_bool(&self, what: &str, args: &[String], issue: u64) -> bool {
        match Command::new("gh")
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
        {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                error!(
                    issue,
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "{what} failed"
                );
                false
            }
            Err(err) => {
                error!(issue, error = %err, "failed to run {what}");
                false
            }
        }
    }
}

/// Whether a response asks for the thread to be closed. Restricted to the
/// summarizer so a stray marker in another agent's text cannot close threads.
pub fn should_auto_close(response: &str, agent: &str) -> bool {
    agent == "summarizer" && !response.is_empty() && response.contains(CLOSE_MARKER)
}

/// Drop controlled footer lines (and an orphaned `---` separator directly
/// above them) from a body.
fn strip_controlled_footer(body: &str) -> String {
    let mut lines: Vec<&str> = body
        .lines()
        .filter(|line| !line.trim_start().starts_with(FOOTER_PREFIX))
        .collect();
    while let Some(last) = lines.last() {
        let trimmed = last.trim();
        if trimmed.is_empty() || trimmed == "---" {
            lines.pop();
        } else {
            break;
        }
    }
    lines.join("\n")
}

/// Mentions spelled on controlled footer lines only.
fn controlled_footer_mentions(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| line.trim_start().starts_with(FOOTER_PREFIX))
        .flat_map(|line| mention_names(line))
        .collect()
}
