//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "moot", about = "Collaborative issue-thread review agents", version)]
pub struct Cli {
    /// Path to a json5 config file. Defaults to `moot.json5` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the named agents against an issue in parallel.
    Execute(ExecuteArgs),
    /// Run the full review panel against an issue.
    Review(ThreadArgs),
    /// Run the observer and report its trigger decision.
    Observe(ThreadArgs),
    /// List every registered agent.
    ListAgents,
}

#[derive(Debug, Args)]
pub struct ThreadArgs {
    /// Issue number.
    #[arg(long)]
    pub issue: u64,

    /// Issue body text. Fetched from the tracker when omitted.
    #[arg(long, default_value = "")]
    pub context: String,

    /// Issue title.
    #[arg(long, default_value = "")]
    pub title: String,

    /// Concatenated historical comments.
    #[arg(long, default_value = "")]
    pub comments: String,

    /// Number of historical comments.
    #[arg(long, default_value_t = 0)]
    pub comment_count: u32,

    /// Relay results back to the issue thread.
    #[arg(long)]
    pub post: bool,
}

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub thread: ThreadArgs,

    /// Space- or comma-separated agent names.
    #[arg(long)]
    pub agents: String,
}
